use eframe::egui::{RichText, TextEdit, Ui};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_SYMBOLS;
use crate::config::plot::PLOT_CONFIG;
use crate::ui::ui_text::UI_TEXT;

const HISTORY_CAP: usize = 8;

/// Watchlist + recently-viewed history, persisted with the UI prefs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistState {
    pub symbols: Vec<String>,
    pub history: Vec<String>,
    #[serde(skip)]
    pub pending_entry: String,
}

impl Default for WatchlistState {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            history: Vec::new(),
            pending_entry: String::new(),
        }
    }
}

impl WatchlistState {
    /// Moves a symbol to the front of the recently-viewed list.
    pub fn record_visit(&mut self, symbol: &str) {
        self.history.retain(|s| s != symbol);
        self.history.insert(0, symbol.to_string());
        self.history.truncate(HISTORY_CAP);
    }

    fn add_pending(&mut self) -> Option<String> {
        let symbol = self.pending_entry.trim().to_uppercase();
        self.pending_entry.clear();
        if symbol.is_empty() || self.symbols.contains(&symbol) {
            return None;
        }
        self.symbols.push(symbol.clone());
        Some(symbol)
    }
}

/// Renders the side panel; returns the symbol the user asked to switch to.
pub fn show_watchlist(ui: &mut Ui, state: &mut WatchlistState, active: &str) -> Option<String> {
    let mut switch_to = None;

    ui.heading(UI_TEXT.wl_heading.clone());

    let entry = ui.add(
        TextEdit::singleline(&mut state.pending_entry).hint_text(UI_TEXT.wl_add_hint.clone()),
    );
    if entry.lost_focus() && ui.input(|i| i.key_pressed(eframe::egui::Key::Enter)) {
        switch_to = state.add_pending();
    }

    ui.separator();

    let mut remove_at = None;
    for (i, symbol) in state.symbols.iter().enumerate() {
        ui.horizontal(|ui| {
            if ui
                .selectable_label(symbol == active, symbol.as_str())
                .clicked()
            {
                switch_to = Some(symbol.clone());
            }
            if ui
                .small_button(RichText::new("x").color(PLOT_CONFIG.color_text_subdued))
                .on_hover_text(UI_TEXT.wl_remove_hover.clone())
                .clicked()
            {
                remove_at = Some(i);
            }
        });
    }
    if let Some(i) = remove_at {
        // Removing the active symbol keeps the chart as-is; only the list
        // entry goes away.
        state.symbols.remove(i);
    }

    if !state.history.is_empty() {
        ui.separator();
        ui.label(
            RichText::new(UI_TEXT.wl_history_heading.clone())
                .color(PLOT_CONFIG.color_text_subdued),
        );
        for symbol in state.history.clone() {
            if symbol != active && ui.link(&symbol).clicked() {
                switch_to = Some(symbol);
            }
        }
    }

    switch_to
}
