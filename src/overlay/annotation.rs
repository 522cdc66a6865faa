use eframe::egui::Color32;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use uuid::Uuid;

use crate::config::plot::PLOT_CONFIG;

/// A (time, price) point defining part of an annotation's geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub time_ms: i64,
    pub price: f64,
}

impl Anchor {
    pub fn new(time_ms: i64, price: f64) -> Self {
        Self { time_ms, price }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationKind {
    #[strum(serialize = "Trend Line")]
    TrendLine,
    #[strum(serialize = "Horizontal Line")]
    HorizontalLine,
    #[strum(serialize = "Fibonacci")]
    Fibonacci,
}

impl AnnotationKind {
    /// Anchors a committed shape of this kind must carry. A horizontal level
    /// has no second degree of freedom worth capturing, so it commits off a
    /// single click.
    pub fn required_anchors(&self) -> usize {
        match self {
            AnnotationKind::HorizontalLine => 1,
            AnnotationKind::TrendLine | AnnotationKind::Fibonacci => 2,
        }
    }

    pub fn default_color(&self) -> Color32 {
        match self {
            AnnotationKind::TrendLine => PLOT_CONFIG.trend_line_color,
            AnnotationKind::HorizontalLine => PLOT_CONFIG.horizontal_line_color,
            AnnotationKind::Fibonacci => PLOT_CONFIG.fibonacci_color,
        }
    }
}

/// A committed, persisted shape. Immutable once committed: anchors are never
/// edited in place, the whole collection is only ever replaced by hydration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: Uuid,
    pub kind: AnnotationKind,
    pub anchors: Vec<Anchor>,
    pub color: Color32,
}

impl Annotation {
    /// Build a committed annotation. Caller guarantees the anchor count; the
    /// store re-checks via [`Annotation::is_well_formed`] before accepting.
    pub fn new(kind: AnnotationKind, anchors: Vec<Anchor>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            anchors,
            color: kind.default_color(),
        }
    }

    /// A partially-specified shape must never reach the committed
    /// collection; this is the gate hydration filters through as well.
    pub fn is_well_formed(&self) -> bool {
        self.anchors.len() == self.kind.required_anchors()
            && self.anchors.iter().all(|a| a.price.is_finite())
    }
}

/// The six retracement ratios, top to bottom.
pub const FIB_LEVELS: [f64; 6] = [0.0, 0.236, 0.382, 0.5, 0.618, 1.0];

/// Derived guide prices for a two-anchor Fibonacci shape: for each ratio,
/// `low + (high - low) * (1 - ratio)` over the min/max of the anchor prices.
/// Returns `(ratio, price)` pairs.
pub fn fibonacci_levels(a: &Anchor, b: &Anchor) -> [(f64, f64); 6] {
    let low = a.price.min(b.price);
    let high = a.price.max(b.price);
    let range = high - low;
    FIB_LEVELS.map(|level| (level, low + range * (1.0 - level)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_anchor_counts_per_kind() {
        assert_eq!(AnnotationKind::HorizontalLine.required_anchors(), 1);
        assert_eq!(AnnotationKind::TrendLine.required_anchors(), 2);
        assert_eq!(AnnotationKind::Fibonacci.required_anchors(), 2);
    }

    #[test]
    fn well_formedness_tracks_anchor_count() {
        let one = Annotation::new(AnnotationKind::HorizontalLine, vec![Anchor::new(0, 42.0)]);
        assert!(one.is_well_formed());

        let short = Annotation::new(AnnotationKind::TrendLine, vec![Anchor::new(0, 42.0)]);
        assert!(!short.is_well_formed());
    }

    #[test]
    fn commits_are_never_deduplicated() {
        let anchors = vec![Anchor::new(100, 50.0), Anchor::new(200, 60.0)];
        let a = Annotation::new(AnnotationKind::TrendLine, anchors.clone());
        let b = Annotation::new(AnnotationKind::TrendLine, anchors);
        assert_ne!(a.id, b.id);
        assert_eq!(a.anchors, b.anchors);
    }

    #[test]
    fn fibonacci_levels_span_anchor_range_in_either_order() {
        let lo = Anchor::new(0, 10.0);
        let hi = Anchor::new(1, 20.0);
        for (a, b) in [(&lo, &hi), (&hi, &lo)] {
            let levels = fibonacci_levels(a, b);
            assert_eq!(levels[0], (0.0, 20.0)); // 0% sits at the high
            assert_eq!(levels[5], (1.0, 10.0)); // 100% sits at the low
            assert!((levels[3].1 - 15.0).abs() < 1e-9); // 50%
            assert!((levels[1].1 - (10.0 + 10.0 * (1.0 - 0.236))).abs() < 1e-9);
        }
    }

    #[test]
    fn annotation_round_trips_through_json() {
        let ann = Annotation::new(
            AnnotationKind::Fibonacci,
            vec![Anchor::new(100, 50.0), Anchor::new(200, 60.0)],
        );
        let json = serde_json::to_string(&ann).unwrap();
        assert!(json.contains("\"fibonacci\""));
        let back: Annotation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ann);
    }
}
