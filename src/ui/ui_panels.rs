use eframe::egui::{Grid, RichText, Ui};

use crate::analysis::{gann_report, ney_report};
use crate::config::plot::PLOT_CONFIG;
use crate::domain::OhlcvSeries;
use crate::overlay::{DrawingStore, Interaction};
use crate::ui::ui_text::UI_TEXT;
use crate::ui::utils::format_price;

/// Gann + Ney readouts for the active symbol.
pub fn show_analysis_panel(ui: &mut Ui, series: &OhlcvSeries) {
    ui.heading(UI_TEXT.an_heading.clone());
    ui.separator();

    ui.label(RichText::new(UI_TEXT.an_gann_heading.clone()).strong());
    match gann_report(series) {
        Some(report) => {
            Grid::new("gann_levels").striped(true).show(ui, |ui| {
                for level in report.levels.iter().rev() {
                    let color = if level.steps == 0 {
                        PLOT_CONFIG.color_text_neutral
                    } else if level.steps > 0 {
                        PLOT_CONFIG.color_bearish_text // resistance above
                    } else {
                        PLOT_CONFIG.color_bullish_text // support below
                    };
                    ui.label(RichText::new(format!("{:+}", level.steps)).color(color));
                    ui.label(RichText::new(format_price(level.price)).color(color));
                    ui.end_row();
                }
            });
            ui.label(format!(
                "{}: {:.0}%",
                UI_TEXT.an_gann_proximity,
                report.proximity * 100.0
            ));
        }
        None => {
            ui.label(UI_TEXT.an_insufficient.clone());
        }
    }

    ui.separator();

    ui.label(RichText::new(UI_TEXT.an_ney_heading.clone()).strong());
    match ney_report(series) {
        Some(report) => {
            let score_color = if report.score >= 0.0 {
                PLOT_CONFIG.color_bullish_text
            } else {
                PLOT_CONFIG.color_bearish_text
            };
            Grid::new("ney_report").show(ui, |ui| {
                ui.label(UI_TEXT.an_ney_score.clone());
                ui.label(RichText::new(format!("{:+.2}%", report.score)).color(score_color));
                ui.end_row();
                ui.label(UI_TEXT.an_ney_momentum.clone());
                ui.label(format!("{:+.2}%", report.momentum_pct));
                ui.end_row();
                ui.label(UI_TEXT.an_ney_rel_volume.clone());
                ui.label(format!("{:.2}x", report.relative_volume));
                ui.end_row();
            });
        }
        None => {
            ui.label(UI_TEXT.an_insufficient.clone());
        }
    }
}

/// Bottom status bar: active tool, drawing count and transient notices.
pub fn show_status_bar(
    ui: &mut Ui,
    interaction: &Interaction,
    store: &DrawingStore,
    notices: &[String],
) {
    ui.horizontal(|ui| {
        ui.label(format!(
            "{}: {}",
            UI_TEXT.sb_tool_prefix,
            interaction.active_tool()
        ));
        ui.separator();
        ui.label(format!("{} {}", store.len(), UI_TEXT.sb_annotation_count));

        if let Some(notice) = notices.last() {
            ui.separator();
            ui.label(RichText::new(notice).color(PLOT_CONFIG.color_warning));
        }
    });
}
