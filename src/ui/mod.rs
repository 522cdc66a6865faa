pub mod plot_layers;
pub mod toolbar;
pub mod ui_panels;
pub mod ui_plot_view;
pub mod ui_text;
pub mod utils;
pub mod watchlist;

pub use plot_layers::PlotVisibility;
pub use ui_plot_view::PlotView;
pub use watchlist::WatchlistState;
