//! Application-wide constants.

use crate::utils::TimeUtils;

/// Candle interval the chart and analysis engines run on.
pub const BASE_INTERVAL_MS: i64 = TimeUtils::MS_IN_H;

/// How many candles the Gann/Ney engines look back over.
pub const ANALYSIS_LOOKBACK: usize = 200;

/// Candles generated for the offline demo series.
pub const DEMO_CANDLE_COUNT: usize = 500;

/// Pixel radius within which a click "grabs" a trend line.
pub const HIT_THRESHOLD_PX: f32 = 8.0;

/// Quiet period after the last store mutation before annotations are written out.
/// A burst of edits inside this window produces exactly one save.
pub const SAVE_DEBOUNCE_MS: u64 = 1_000;

/// Single-seat desktop app: annotations are still keyed per user in storage
/// so the schema survives a future multi-user backend.
pub const LOCAL_USER: &str = "local";

/// Watchlist seeded on first run.
pub const DEFAULT_SYMBOLS: &[&str] = &["BTCUSDT", "ETHUSDT", "SOLUSDT"];
