use crate::config::ANALYSIS_LOOKBACK;
use crate::domain::OhlcvSeries;

/// Volume-weighted momentum over the trailing lookback window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeyReport {
    /// Sum of per-bar returns weighted by each bar's share of window volume,
    /// in percent. Positive = accumulation pushing price up.
    pub score: f64,
    /// Plain close-over-close change across the window, in percent.
    pub momentum_pct: f64,
    /// Last bar's volume over the window average.
    pub relative_volume: f64,
    pub window: usize,
}

pub fn ney_report(series: &OhlcvSeries) -> Option<NeyReport> {
    ney_report_with_window(series, ANALYSIS_LOOKBACK)
}

/// Needs at least `window + 1` candles so every bar in the window has a
/// predecessor for its return.
pub fn ney_report_with_window(series: &OhlcvSeries, window: usize) -> Option<NeyReport> {
    if window == 0 || series.len() < window + 1 {
        return None;
    }
    let candles = &series.candles[series.len() - (window + 1)..];

    let total_volume: f64 = candles[1..].iter().map(|c| c.volume).sum();
    if total_volume <= 0.0 {
        return None;
    }

    let mut score = 0.0;
    for pair in candles.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        if prev.close_price <= 0.0 {
            return None;
        }
        let bar_return = (cur.close_price - prev.close_price) / prev.close_price;
        score += bar_return * (cur.volume / total_volume);
    }

    let first_close = candles[0].close_price;
    let last = &candles[candles.len() - 1];
    let momentum_pct = (last.close_price - first_close) / first_close * 100.0;
    let relative_volume = last.volume / (total_volume / window as f64);

    Some(NeyReport {
        score: score * 100.0,
        momentum_pct,
        relative_volume,
        window,
    })
}
