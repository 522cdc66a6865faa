mod provider;
mod storage;

pub use provider::{ProgressEvent, SyncStatus, fetch_symbol_data};
pub use storage::{AnnotationStorage, CandleStorage, SqliteStore};
