mod gann;
mod ney;

pub use gann::{GannLevel, GannReport, gann_report};
pub use ney::{NeyReport, ney_report};
