mod constants;
mod debug;
mod persistence;
pub mod plot;

pub use constants::{
    ANALYSIS_LOOKBACK, BASE_INTERVAL_MS, DEFAULT_SYMBOLS, DEMO_CANDLE_COUNT, HIT_THRESHOLD_PX,
    LOCAL_USER, SAVE_DEBOUNCE_MS,
};
pub use debug::DF;
pub use persistence::PERSISTENCE;
