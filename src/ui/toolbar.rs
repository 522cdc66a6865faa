use eframe::egui::Ui;
use strum::IntoEnumIterator;

use crate::overlay::{DrawTool, DrawingStore, Interaction};
use crate::ui::plot_layers::PlotVisibility;
use crate::ui::ui_text::UI_TEXT;

/// Drawing toolbar: tool buttons, clear-all and layer toggles.
pub fn show_toolbar(
    ui: &mut Ui,
    interaction: &mut Interaction,
    store: &mut DrawingStore,
    visibility: &mut PlotVisibility,
) {
    ui.horizontal(|ui| {
        let active = interaction.active_tool();
        for tool in DrawTool::iter() {
            if ui
                .selectable_label(active == tool, tool.to_string())
                .clicked()
            {
                interaction.select_tool(store, tool);
            }
        }

        ui.separator();

        if ui
            .button(UI_TEXT.tb_clear_all.clone())
            .on_hover_text(UI_TEXT.tb_clear_all_hover.clone())
            .clicked()
        {
            store.clear();
        }

        ui.separator();

        ui.checkbox(&mut visibility.candles, UI_TEXT.tb_candles.clone());
        ui.checkbox(&mut visibility.price_line, UI_TEXT.tb_price_line.clone());
        ui.checkbox(&mut visibility.annotations, UI_TEXT.tb_annotations.clone());
    });
}
