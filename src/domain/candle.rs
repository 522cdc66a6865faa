#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub timestamp_ms: i64,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(
        timestamp_ms: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Candle {
            timestamp_ms,
            open_price: open,
            high_price: high,
            low_price: low,
            close_price: close,
            volume,
        }
    }

    pub fn is_bullish(&self) -> bool {
        self.close_price >= self.open_price
    }
}

/// One symbol's loaded candle history at a fixed interval, sorted by time.
///
/// The chart's x-domain is the candle index; time↔index lookups go through
/// binary search on `timestamps`.
#[derive(Debug, Clone, Default)]
pub struct OhlcvSeries {
    pub symbol: String,
    pub interval_ms: i64,
    pub candles: Vec<Candle>,
}

impl OhlcvSeries {
    pub fn new(symbol: String, interval_ms: i64, mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.timestamp_ms);
        Self {
            symbol,
            interval_ms,
            candles,
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn first_time(&self) -> Option<i64> {
        self.candles.first().map(|c| c.timestamp_ms)
    }

    pub fn last_time(&self) -> Option<i64> {
        self.candles.last().map(|c| c.timestamp_ms)
    }

    pub fn latest_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close_price)
    }

    /// Fractional index of a timestamp within the series, interpolating
    /// between neighbouring bars. `None` when the time is outside the
    /// loaded range.
    pub fn index_of_time(&self, time_ms: i64) -> Option<f64> {
        let first = self.first_time()?;
        let last = self.last_time()?;
        if time_ms < first || time_ms > last {
            return None;
        }
        match self
            .candles
            .binary_search_by_key(&time_ms, |c| c.timestamp_ms)
        {
            Ok(i) => Some(i as f64),
            Err(i) => {
                // Between bar i-1 and bar i.
                let t0 = self.candles[i - 1].timestamp_ms;
                let t1 = self.candles[i].timestamp_ms;
                let frac = (time_ms - t0) as f64 / (t1 - t0) as f64;
                Some((i - 1) as f64 + frac)
            }
        }
    }

    /// Timestamp at a fractional index. `None` outside `0..len`.
    pub fn time_at_index(&self, index: f64) -> Option<i64> {
        if self.is_empty() || index < 0.0 || index > (self.len() - 1) as f64 {
            return None;
        }
        let i = index.floor() as usize;
        if i + 1 >= self.len() {
            return Some(self.candles[i].timestamp_ms);
        }
        let t0 = self.candles[i].timestamp_ms;
        let t1 = self.candles[i + 1].timestamp_ms;
        Some(t0 + ((t1 - t0) as f64 * index.fract()) as i64)
    }

    /// Timestamp of the loaded bar closest to a fractional index, clamped to
    /// the series ends. Used for the click fallback when an exact
    /// index→time mapping is unavailable.
    pub fn nearest_bar_time(&self, index: f64) -> Option<i64> {
        if self.is_empty() {
            return None;
        }
        let i = index.round().clamp(0.0, (self.len() - 1) as f64) as usize;
        Some(self.candles[i].timestamp_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> OhlcvSeries {
        let candles = (0..5)
            .map(|i| Candle::new(1_000 + i * 100, 1.0, 2.0, 0.5, 1.5, 10.0))
            .collect();
        OhlcvSeries::new("TEST".into(), 100, candles)
    }

    #[test]
    fn index_of_time_is_exact_on_bar_boundaries() {
        let s = series();
        assert_eq!(s.index_of_time(1_000), Some(0.0));
        assert_eq!(s.index_of_time(1_400), Some(4.0));
    }

    #[test]
    fn index_of_time_interpolates_between_bars() {
        let s = series();
        assert_eq!(s.index_of_time(1_150), Some(1.5));
    }

    #[test]
    fn index_of_time_rejects_out_of_range() {
        let s = series();
        assert_eq!(s.index_of_time(999), None);
        assert_eq!(s.index_of_time(1_401), None);
    }

    #[test]
    fn time_and_index_round_trip() {
        let s = series();
        let idx = s.index_of_time(1_250).unwrap();
        assert_eq!(s.time_at_index(idx), Some(1_250));
    }

    #[test]
    fn nearest_bar_time_clamps_to_series_ends() {
        let s = series();
        assert_eq!(s.nearest_bar_time(-3.0), Some(1_000));
        assert_eq!(s.nearest_bar_time(99.0), Some(1_400));
        assert_eq!(s.nearest_bar_time(2.4), Some(1_200));
    }
}
