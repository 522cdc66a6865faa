use std::sync::LazyLock;

pub struct UiText {
    // --- Loading screen ---
    pub ls_title: String,
    pub ls_syncing: String,
    pub ls_failed: String,
    pub ls_main: String,

    // --- Plot ---
    pub plot_x_axis: String,
    pub plot_y_axis: String,
    pub cp_no_data: String,

    // --- Toolbar ---
    pub tb_clear_all: String,
    pub tb_clear_all_hover: String,
    pub tb_candles: String,
    pub tb_price_line: String,
    pub tb_annotations: String,

    // --- Watchlist ---
    pub wl_heading: String,
    pub wl_add_hint: String,
    pub wl_history_heading: String,
    pub wl_remove_hover: String,

    // --- Analysis panel ---
    pub an_heading: String,
    pub an_gann_heading: String,
    pub an_gann_proximity: String,
    pub an_ney_heading: String,
    pub an_ney_score: String,
    pub an_ney_momentum: String,
    pub an_ney_rel_volume: String,
    pub an_insufficient: String,

    // --- Status bar ---
    pub sb_tool_prefix: String,
    pub sb_annotation_count: String,
}

// THE SINGLETON
pub static UI_TEXT: LazyLock<UiText> = LazyLock::new(|| UiText {
    ls_title: "TRENDMARK INITIALIZATION".to_string(),
    ls_syncing: "Syncing".to_string(),
    ls_failed: "FAILED".to_string(),
    ls_main: "klines from Binance Public API. First run can take a moment; \
              cached symbols load instantly afterwards."
        .to_string(),

    plot_x_axis: "Time".to_string(),
    plot_y_axis: "Price".to_string(),
    cp_no_data: "No candle data for this symbol.".to_string(),

    tb_clear_all: "Clear All".to_string(),
    tb_clear_all_hover: "Remove every drawing on this chart".to_string(),
    tb_candles: "Candles".to_string(),
    tb_price_line: "Last Price".to_string(),
    tb_annotations: "Drawings".to_string(),

    wl_heading: "Watchlist".to_string(),
    wl_add_hint: "Add symbol (e.g. BTCUSDT)".to_string(),
    wl_history_heading: "Recently Viewed".to_string(),
    wl_remove_hover: "Remove from watchlist".to_string(),

    an_heading: "Analysis".to_string(),
    an_gann_heading: "Gann Levels".to_string(),
    an_gann_proximity: "Level proximity".to_string(),
    an_ney_heading: "Ney Momentum".to_string(),
    an_ney_score: "VW score".to_string(),
    an_ney_momentum: "Momentum".to_string(),
    an_ney_rel_volume: "Rel. volume".to_string(),
    an_insufficient: "Not enough history.".to_string(),

    sb_tool_prefix: "Tool".to_string(),
    sb_annotation_count: "drawings".to_string(),
});
