use crate::domain::OhlcvSeries;

/// One ring step on the square of nine. A full rotation around the square
/// moves the square root of price by 2, so a 360-degree cardinal cross is a
/// root increment of 0.5 per 90 degrees.
const ROOT_STEP: f64 = 0.25;
const LEVELS_PER_SIDE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GannLevel {
    pub price: f64,
    /// Signed distance from the latest close, in root steps.
    pub steps: i32,
}

/// Square-of-nine snapshot around the latest close.
#[derive(Debug, Clone, PartialEq)]
pub struct GannReport {
    pub anchor_price: f64,
    pub levels: Vec<GannLevel>,
    /// 0.0 = the close sits exactly on a level, 1.0 = dead centre between
    /// two levels. Lower means the market is hugging Gann structure.
    pub proximity: f64,
}

/// Projects square-of-nine support/resistance around the most recent close.
/// Levels are `(sqrt(close) + k * ROOT_STEP)^2` for k in
/// `-LEVELS_PER_SIDE..=LEVELS_PER_SIDE`, skipping any that would go
/// non-positive.
pub fn gann_report(series: &OhlcvSeries) -> Option<GannReport> {
    let close = series.latest_close()?;
    if close <= 0.0 || !close.is_finite() {
        return None;
    }

    let root = close.sqrt();
    let levels: Vec<GannLevel> = (-(LEVELS_PER_SIDE as i32)..=LEVELS_PER_SIDE as i32)
        .filter_map(|k| {
            let r = root + k as f64 * ROOT_STEP;
            (r > 0.0).then(|| GannLevel {
                price: r * r,
                steps: k,
            })
        })
        .collect();

    // Distance from the nearest level, normalized to half a step of root
    // space so the score is scale-free.
    let frac = (root / ROOT_STEP).fract();
    let off_center = frac.min(1.0 - frac);
    let proximity = off_center * 2.0;

    Some(GannReport {
        anchor_price: close,
        levels,
        proximity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Candle;

    fn series_closing_at(close: f64) -> OhlcvSeries {
        let candles = vec![Candle::new(0, close, close, close, close, 1.0)];
        OhlcvSeries::new("TEST".into(), 1_000, candles)
    }

    #[test]
    fn levels_are_symmetric_in_root_space() {
        let report = gann_report(&series_closing_at(100.0)).unwrap();
        assert_eq!(report.levels.len(), 2 * LEVELS_PER_SIDE + 1);

        // Center level is the close itself.
        let center = report.levels[LEVELS_PER_SIDE];
        assert_eq!(center.steps, 0);
        assert!((center.price - 100.0).abs() < 1e-9);

        // Root distance from center grows by ROOT_STEP per step.
        for level in &report.levels {
            let expected_root = 10.0 + level.steps as f64 * ROOT_STEP;
            assert!((level.price.sqrt() - expected_root).abs() < 1e-9);
        }
    }

    #[test]
    fn proximity_is_zero_on_a_level_and_peaks_between() {
        // sqrt(100) = 10.0 = 40 * ROOT_STEP, exactly on a level.
        let on_level = gann_report(&series_closing_at(100.0)).unwrap();
        assert!(on_level.proximity < 1e-9);

        // root = 10.125, halfway between two levels.
        let between = gann_report(&series_closing_at(10.125f64.powi(2))).unwrap();
        assert!((between.proximity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_empty_and_non_positive_series() {
        let empty = OhlcvSeries::new("TEST".into(), 1_000, Vec::new());
        assert!(gann_report(&empty).is_none());
        assert!(gann_report(&series_closing_at(-5.0)).is_none());
    }
}
