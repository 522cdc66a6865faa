use eframe::egui::Rect;

use crate::domain::OhlcvSeries;

/// Time↔pixel and price↔pixel queries against the chart as it is rendered
/// right now.
///
/// `None` means "this point cannot currently be represented" (a time outside
/// the loaded history, a price scrolled out of view). Callers skip the shape
/// or abort the interaction step that produced it; nobody substitutes a
/// default.
pub trait ChartTransform {
    fn time_to_x(&self, time_ms: i64) -> Option<f32>;
    fn price_to_y(&self, price: f64) -> Option<f32>;
    fn x_to_time(&self, x: f32) -> Option<i64>;
    fn y_to_price(&self, y: f32) -> Option<f64>;

    /// Time of the loaded bar nearest to pixel X, clamped to the series
    /// ends. Lets a click slightly off the first/last bar still register.
    fn nearest_time_for_x(&self, x: f32) -> Option<i64>;
}

/// Production transform: the plot's visible bounds + screen frame captured
/// for the current frame, with time↔index mapping through the loaded series
/// (the chart's x-domain is the candle index).
pub struct PlotAdapter<'a> {
    series: &'a OhlcvSeries,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    frame: Rect,
}

impl<'a> PlotAdapter<'a> {
    pub fn new(
        series: &'a OhlcvSeries,
        x_bounds: (f64, f64),
        y_bounds: (f64, f64),
        frame: Rect,
    ) -> Self {
        Self {
            series,
            x_min: x_bounds.0,
            x_max: x_bounds.1,
            y_min: y_bounds.0,
            y_max: y_bounds.1,
            frame,
        }
    }

    fn index_to_screen_x(&self, index: f64) -> Option<f32> {
        let span = self.x_max - self.x_min;
        if span <= f64::EPSILON {
            return None;
        }
        let x = self.frame.left() as f64 + (index - self.x_min) / span * self.frame.width() as f64;
        let x = x as f32;
        if x < self.frame.left() || x > self.frame.right() {
            return None;
        }
        Some(x)
    }

    fn screen_x_to_index(&self, x: f32) -> Option<f64> {
        if x < self.frame.left() || x > self.frame.right() || self.frame.width() <= 0.0 {
            return None;
        }
        let frac = (x - self.frame.left()) as f64 / self.frame.width() as f64;
        Some(self.x_min + frac * (self.x_max - self.x_min))
    }
}

impl ChartTransform for PlotAdapter<'_> {
    fn time_to_x(&self, time_ms: i64) -> Option<f32> {
        let index = self.series.index_of_time(time_ms)?;
        self.index_to_screen_x(index)
    }

    fn price_to_y(&self, price: f64) -> Option<f32> {
        let span = self.y_max - self.y_min;
        if span <= f64::EPSILON || price < self.y_min || price > self.y_max {
            return None;
        }
        let frac = (self.y_max - price) / span; // screen Y grows downward
        Some(self.frame.top() + frac as f32 * self.frame.height())
    }

    fn x_to_time(&self, x: f32) -> Option<i64> {
        let index = self.screen_x_to_index(x)?;
        self.series.time_at_index(index)
    }

    fn y_to_price(&self, y: f32) -> Option<f64> {
        if y < self.frame.top() || y > self.frame.bottom() || self.frame.height() <= 0.0 {
            return None;
        }
        let frac = (y - self.frame.top()) as f64 / self.frame.height() as f64;
        Some(self.y_max - frac * (self.y_max - self.y_min))
    }

    fn nearest_time_for_x(&self, x: f32) -> Option<i64> {
        let index = self.screen_x_to_index(x)?;
        self.series.nearest_bar_time(index)
    }
}

/// Fixed linear time/price mapping for headless tests: no plot, no series,
/// exact inverses inside the viewport, `None` outside it.
#[cfg(test)]
pub(crate) struct LinearTransform {
    pub width: f32,
    pub height: f32,
    pub t0: i64,
    pub ms_per_px: i64,
    pub top_price: f64,
    pub price_per_px: f64,
}

#[cfg(test)]
impl LinearTransform {
    /// 1000x1000 viewport, 1 ms and 0.1 price units per pixel, prices
    /// 0..100 with 100.0 at the top edge.
    pub fn standard() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
            t0: 0,
            ms_per_px: 1,
            top_price: 100.0,
            price_per_px: 0.1,
        }
    }
}

#[cfg(test)]
impl ChartTransform for LinearTransform {
    fn time_to_x(&self, time_ms: i64) -> Option<f32> {
        let x = ((time_ms - self.t0) / self.ms_per_px) as f32;
        (0.0..=self.width).contains(&x).then_some(x)
    }

    fn price_to_y(&self, price: f64) -> Option<f32> {
        let y = ((self.top_price - price) / self.price_per_px) as f32;
        (0.0..=self.height).contains(&y).then_some(y)
    }

    fn x_to_time(&self, x: f32) -> Option<i64> {
        (0.0..=self.width)
            .contains(&x)
            .then(|| self.t0 + x as i64 * self.ms_per_px)
    }

    fn y_to_price(&self, y: f32) -> Option<f64> {
        (0.0..=self.height)
            .contains(&y)
            .then(|| self.top_price - y as f64 * self.price_per_px)
    }

    fn nearest_time_for_x(&self, x: f32) -> Option<i64> {
        let clamped = x.clamp(0.0, self.width);
        Some(self.t0 + clamped as i64 * self.ms_per_px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Candle;
    use eframe::egui::{Pos2, Rect};

    fn series() -> OhlcvSeries {
        let candles = (0..10)
            .map(|i| Candle::new(i * 1_000, 1.0, 2.0, 0.5, 1.5, 10.0))
            .collect();
        OhlcvSeries::new("TEST".into(), 1_000, candles)
    }

    fn frame() -> Rect {
        Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(900.0, 450.0))
    }

    #[test]
    fn time_round_trips_through_pixels() {
        let s = series();
        // Visible: indices 0..9, prices 0..100.
        let tf = PlotAdapter::new(&s, (0.0, 9.0), (0.0, 100.0), frame());
        let x = tf.time_to_x(4_000).expect("bar 4 is visible");
        let t = tf.x_to_time(x).expect("pixel maps back");
        assert!((t - 4_000).abs() <= 5); // sub-pixel rounding only
    }

    #[test]
    fn price_axis_is_inverted_on_screen() {
        let s = series();
        let tf = PlotAdapter::new(&s, (0.0, 9.0), (0.0, 100.0), frame());
        let top = tf.price_to_y(100.0).unwrap();
        let bottom = tf.price_to_y(0.0).unwrap();
        assert!(top < bottom);
        assert_eq!(tf.y_to_price(top).unwrap().round(), 100.0);
    }

    #[test]
    fn times_outside_loaded_history_do_not_project() {
        let s = series();
        let tf = PlotAdapter::new(&s, (0.0, 9.0), (0.0, 100.0), frame());
        assert_eq!(tf.time_to_x(-1), None);
        assert_eq!(tf.time_to_x(9_001), None);
    }

    #[test]
    fn prices_outside_view_do_not_project() {
        let s = series();
        let tf = PlotAdapter::new(&s, (0.0, 9.0), (40.0, 60.0), frame());
        assert_eq!(tf.price_to_y(39.0), None);
        assert_eq!(tf.price_to_y(61.0), None);
        assert!(tf.price_to_y(50.0).is_some());
    }

    #[test]
    fn nearest_time_clamps_to_series_ends() {
        let s = series();
        // View pans past the left edge of the data: indices -5..4.
        let tf = PlotAdapter::new(&s, (-5.0, 4.0), (0.0, 100.0), frame());
        // A pixel over the empty region left of bar 0 still resolves.
        assert_eq!(tf.nearest_time_for_x(10.0), Some(0));
        assert_eq!(tf.x_to_time(10.0), None);
    }
}
