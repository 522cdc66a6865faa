//! Interactive drawing overlay: trend lines, horizontal levels and Fibonacci
//! retracements anchored in (time, price) space on top of the candlestick
//! chart.
//!
//! Ownership is a straight line: pointer/keyboard events feed the
//! [`Interaction`] state machine, which mutates the [`DrawingStore`]; the
//! render layer reads the store plus a [`ChartTransform`] every frame; the
//! [`PersistenceBridge`] watches the store's revision counter and syncs it
//! to durable storage per user and symbol.

mod annotation;
mod coords;
mod interaction;
mod persist;
mod render;
mod store;

pub use annotation::{Anchor, Annotation, AnnotationKind, FIB_LEVELS, fibonacci_levels};
pub use coords::{ChartTransform, PlotAdapter};
pub use hit_test::hit_test;
pub use interaction::{DrawTool, Interaction, ToolState};
pub use persist::PersistenceBridge;
pub use render::OverlayLayer;
pub use store::DrawingStore;
