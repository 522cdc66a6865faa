//! Plot and overlay visualization configuration.

use eframe::egui::Color32;

pub struct PlotConfig {
    // --- CANDLESTICKS ---
    pub candle_bullish_color: Color32,
    pub candle_bearish_color: Color32,
    pub candle_width_pct: f64, // 0.0 to 1.0 (relative to one time step)
    pub candle_wick_width: f32, // Pixels

    // --- PRICE LINE ---
    pub current_price_color: Color32,
    pub current_price_line_width: f32,

    // --- DRAWING OVERLAY ---
    /// Default stroke per annotation kind.
    pub trend_line_color: Color32,
    pub horizontal_line_color: Color32,
    pub fibonacci_color: Color32,

    pub annotation_line_width: f32,
    /// Stroke used when an annotation is the current selection.
    pub selected_line_width: f32,
    pub selected_color: Color32,

    /// Ghost preview (dashed segment between anchor one and the pointer).
    pub ghost_color: Color32,
    pub ghost_dash_length: f32,

    /// Crosshair shown while a drawing tool is armed.
    pub crosshair_color: Color32,
    pub crosshair_width: f32,

    /// Radius of the endpoint markers on committed trend lines.
    pub anchor_marker_radius: f32,

    // --- AXES / FRAME ---
    pub plot_y_padding_pct: f64, // Padding above/below the visible price range

    // --- SEMANTIC COLORS ---
    pub color_bullish_text: Color32,
    pub color_bearish_text: Color32,
    pub color_text_neutral: Color32,
    pub color_text_subdued: Color32,
    pub color_warning: Color32,
}

pub const PLOT_CONFIG: PlotConfig = PlotConfig {
    candle_bullish_color: Color32::from_rgb(38, 166, 154), // TradingView Green
    candle_bearish_color: Color32::from_rgb(239, 83, 80),  // TradingView Red
    candle_width_pct: 0.8, // 80% width leaves a small gap between candles
    candle_wick_width: 1.0,

    current_price_color: Color32::from_rgb(255, 215, 0), // Gold
    current_price_line_width: 2.0,

    // Overlay strokes: each kind gets its own default so a chart full of
    // mixed annotations still reads at a glance.
    trend_line_color: Color32::from_rgb(0, 191, 255), // Deep Sky Blue
    horizontal_line_color: Color32::from_rgb(255, 165, 0), // Orange
    fibonacci_color: Color32::from_rgb(148, 0, 211),  // Violet

    annotation_line_width: 1.5,
    selected_line_width: 3.0,
    selected_color: Color32::WHITE,

    ghost_color: Color32::from_rgb(180, 180, 180),
    ghost_dash_length: 8.0,

    crosshair_color: Color32::from_gray(200),
    crosshair_width: 1.0,

    anchor_marker_radius: 4.0,

    plot_y_padding_pct: 0.04,

    color_bullish_text: Color32::from_rgb(100, 255, 100),
    color_bearish_text: Color32::from_rgb(255, 80, 80),
    color_text_neutral: Color32::LIGHT_GRAY,
    color_text_subdued: Color32::GRAY,
    color_warning: Color32::from_rgb(255, 215, 0),
};
