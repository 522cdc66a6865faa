mod time_utils;

pub use time_utils::{TimeUtils, epoch_ms_to_date_string, now_timestamp_ms};
