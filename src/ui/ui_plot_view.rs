use eframe::egui::Ui;
use egui_plot::{Axis, AxisHints, HPlacement, Plot, PlotBounds, VPlacement};

use crate::config::plot::PLOT_CONFIG;
use crate::domain::OhlcvSeries;
use crate::overlay::{DrawingStore, Interaction, OverlayLayer, PlotAdapter};
use crate::ui::plot_layers::{
    CandlestickLayer, LayerContext, PlotLayer, PlotVisibility, PriceLineLayer,
};
use crate::ui::ui_text::UI_TEXT;
use crate::ui::utils::format_price;
use crate::utils::epoch_ms_to_date_string;

/// The central candlestick chart plus the drawing overlay.
///
/// Pan/zoom state lives inside egui's plot memory; this struct only tracks
/// which symbol the view was last framed for so a symbol switch re-centres
/// the camera exactly once.
#[derive(Default)]
pub struct PlotView {
    framed_symbol: Option<String>,
}

// Helper to build the Time Axis: x is the candle index, labels come from the
// bar timestamps.
fn create_time_axis(series: &OhlcvSeries) -> AxisHints<'static> {
    let timestamps: Vec<i64> = series.candles.iter().map(|c| c.timestamp_ms).collect();

    AxisHints::new(Axis::X)
        .label(UI_TEXT.plot_x_axis.clone())
        .formatter(move |mark, _range| {
            let idx = mark.value.round();
            if idx < 0.0 || idx >= timestamps.len() as f64 {
                return String::new();
            }
            epoch_ms_to_date_string(timestamps[idx as usize])
        })
        .placement(VPlacement::Bottom)
}

fn create_y_axis(symbol: &str) -> AxisHints<'static> {
    let label = format!("{}  {}", symbol, UI_TEXT.plot_y_axis);
    AxisHints::new_y()
        .label(label)
        .formatter(|mark, _range| format_price(mark.value))
        .placement(HPlacement::Right)
}

impl PlotView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_plot(
        &mut self,
        ui: &mut Ui,
        series: &OhlcvSeries,
        store: &mut DrawingStore,
        interaction: &mut Interaction,
        visibility: &PlotVisibility,
    ) {
        if series.is_empty() {
            ui.centered_and_justified(|ui| ui.label(UI_TEXT.cp_no_data.clone()));
            return;
        }

        let frame_fresh = self.framed_symbol.as_deref() != Some(series.symbol.as_str());
        let tool_armed = interaction.tool_armed();

        let plot = Plot::new("chart_plot")
            .custom_x_axes(vec![create_time_axis(series)])
            .custom_y_axes(vec![create_y_axis(&series.symbol)])
            // The overlay paints its own crosshair while a tool is armed;
            // suppress the plot's native hover label for the duration.
            .label_formatter(move |name, value| {
                if tool_armed || !name.is_empty() {
                    String::new()
                } else {
                    format_price(value.y)
                }
            })
            .allow_scroll(false)
            .allow_drag(!tool_armed)
            .allow_zoom(true)
            .allow_double_click_reset(false);

        let plot_response = plot.show(ui, |plot_ui| {
            if frame_fresh {
                plot_ui.set_plot_bounds(initial_bounds(series));
            }

            let ctx = LayerContext {
                series,
                current_price: series.latest_close(),
                visibility,
            };

            let overlay = OverlayLayer {
                store: &*store,
                interaction: &*interaction,
            };
            let mut layers: Vec<&dyn PlotLayer> = Vec::with_capacity(3);
            if visibility.candles {
                layers.push(&CandlestickLayer);
            }
            if visibility.price_line {
                layers.push(&PriceLineLayer);
            }
            if visibility.annotations {
                layers.push(&overlay);
            }

            for layer in layers {
                layer.render(plot_ui, &ctx);
            }

            plot_ui.plot_bounds()
        });
        if frame_fresh {
            self.framed_symbol = Some(series.symbol.clone());
        }

        // Pointer wiring: clicks and moves feed the interaction machine
        // through the same transform the overlay just rendered with.
        let bounds = plot_response.inner;
        let response = &plot_response.response;
        let tf = PlotAdapter::new(
            series,
            (*bounds.range_x().start(), *bounds.range_x().end()),
            (*bounds.range_y().start(), *bounds.range_y().end()),
            response.rect,
        );

        match response.hover_pos() {
            Some(pos) => {
                interaction.pointer_moved(&tf, pos.x, pos.y);
                if response.clicked() {
                    interaction.click(store, &tf, pos.x, pos.y);
                }
            }
            None => interaction.pointer_exited(),
        }
    }
}

/// Full x-range plus the price extent of the series, padded vertically.
fn initial_bounds(series: &OhlcvSeries) -> PlotBounds {
    let mut y_min = f64::MAX;
    let mut y_max = f64::MIN;
    for c in &series.candles {
        y_min = y_min.min(c.low_price);
        y_max = y_max.max(c.high_price);
    }
    let pad = (y_max - y_min) * PLOT_CONFIG.plot_y_padding_pct;
    PlotBounds::from_min_max(
        [-1.0, y_min - pad],
        [series.len() as f64, y_max + pad],
    )
}
