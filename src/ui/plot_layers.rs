use eframe::egui::Color32;
use egui_plot::{HLine, Line, LineStyle, PlotPoints, PlotUi, Polygon};
use serde::{Deserialize, Serialize};

use crate::config::plot::PLOT_CONFIG;
use crate::domain::OhlcvSeries;

/// Layer visibility toggles, persisted with the UI prefs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlotVisibility {
    pub candles: bool,
    pub price_line: bool,
    pub annotations: bool,
}

impl Default for PlotVisibility {
    fn default() -> Self {
        Self {
            candles: true,
            price_line: true,
            annotations: true,
        }
    }
}

/// Context passed to every layer during rendering.
/// This prevents argument explosion.
pub struct LayerContext<'a> {
    pub series: &'a OhlcvSeries,
    pub current_price: Option<f64>,
    pub visibility: &'a PlotVisibility,
}

/// A standardized layer in the plot stack.
pub trait PlotLayer {
    fn render(&self, ui: &mut PlotUi, ctx: &LayerContext);
}

// ============================================================================
// CANDLESTICK LAYER
// ============================================================================
pub struct CandlestickLayer;

impl PlotLayer for CandlestickLayer {
    fn render(&self, plot_ui: &mut PlotUi, ctx: &LayerContext) {
        if ctx.series.is_empty() {
            return;
        }

        // Only touch candles inside the visible x-window; off-screen bars
        // cost paint time for nothing.
        let bounds = plot_ui.plot_bounds();
        let first = (*bounds.range_x().start()).floor().max(0.0) as usize;
        let last = ((*bounds.range_x().end()).ceil() as usize + 1).min(ctx.series.len());

        for (i, candle) in ctx.series.candles[first..last].iter().enumerate() {
            let x = (first + i) as f64;
            let color = if candle.is_bullish() {
                PLOT_CONFIG.candle_bullish_color
            } else {
                PLOT_CONFIG.candle_bearish_color
            };

            draw_wick_line(plot_ui, x, candle.high_price, candle.low_price, color);

            let body_top_raw = candle.open_price.max(candle.close_price);
            let body_bot = candle.open_price.min(candle.close_price);
            // Doji check
            let body_top = if (body_top_raw - body_bot).abs() < f64::EPSILON {
                body_bot * 1.0001
            } else {
                body_top_raw
            };
            draw_body_rect(plot_ui, x, body_top, body_bot, color);
        }
    }
}

#[inline]
fn draw_wick_line(ui: &mut PlotUi, x: f64, top: f64, bottom: f64, color: Color32) {
    ui.line(
        Line::new("", PlotPoints::new(vec![[x, bottom], [x, top]]))
            .color(color)
            .width(PLOT_CONFIG.candle_wick_width),
    );
}

#[inline]
fn draw_body_rect(ui: &mut PlotUi, x: f64, top: f64, bottom: f64, color: Color32) {
    let half_w = PLOT_CONFIG.candle_width_pct / 2.0;
    let pts = vec![
        [x - half_w, bottom],
        [x + half_w, bottom],
        [x + half_w, top],
        [x - half_w, top],
    ];

    ui.polygon(
        Polygon::new("", PlotPoints::new(pts))
            .fill_color(color)
            .stroke(eframe::egui::Stroke::NONE),
    );
}

// ============================================================================
// PRICE LINE LAYER
// ============================================================================
pub struct PriceLineLayer;

impl PlotLayer for PriceLineLayer {
    fn render(&self, plot_ui: &mut PlotUi, ctx: &LayerContext) {
        if let Some(price) = ctx.current_price {
            plot_ui.hline(
                HLine::new("Last Price", price)
                    .color(PLOT_CONFIG.current_price_color)
                    .width(PLOT_CONFIG.current_price_line_width)
                    .style(LineStyle::dashed_loose()),
            );
        }
    }
}
