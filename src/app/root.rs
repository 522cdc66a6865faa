use {
    eframe::{
        Frame, Storage,
        egui::{CentralPanel, Context, Key, ProgressBar, RichText, SidePanel, TopBottomPanel},
    },
    serde::{Deserialize, Serialize},
    std::{
        collections::HashMap,
        mem,
        sync::{Arc, mpsc, mpsc::Receiver},
        thread,
    },
    tokio::runtime::Runtime,
};

use crate::{
    Cli,
    app::{AppState, LoadingState},
    config::{LOCAL_USER, PERSISTENCE, plot::PLOT_CONFIG},
    data::{ProgressEvent, SqliteStore, SyncStatus, fetch_symbol_data},
    domain::OhlcvSeries,
    overlay::{DrawTool, DrawingStore, Interaction, PersistenceBridge},
    ui::{
        PlotView, PlotVisibility, WatchlistState,
        toolbar::show_toolbar,
        ui_panels::{show_analysis_panel, show_status_bar},
        ui_text::UI_TEXT,
        utils::setup_custom_visuals,
        watchlist::show_watchlist,
    },
};

type BootstrapPayload = anyhow::Result<(HashMap<String, OhlcvSeries>, Arc<SqliteStore>)>;

#[derive(Deserialize, Serialize)]
#[serde(default)]
pub struct App {
    pub(crate) watchlist: WatchlistState,
    pub(crate) plot_visibility: PlotVisibility,
    pub(crate) active_symbol: String,

    #[serde(skip)]
    prefer_api: bool,
    #[serde(skip)]
    state: AppState,
    #[serde(skip)]
    series: HashMap<String, OhlcvSeries>,
    #[serde(skip)]
    store: DrawingStore,
    #[serde(skip)]
    interaction: Interaction,
    #[serde(skip)]
    plot_view: PlotView,
    #[serde(skip)]
    bridge: Option<PersistenceBridge>,
    #[serde(skip)]
    storage: Option<Arc<SqliteStore>>,
    #[serde(skip)]
    notices: Vec<String>,
    #[serde(skip)]
    progress_rx: Option<Receiver<ProgressEvent>>,
    #[serde(skip)]
    data_rx: Option<Receiver<BootstrapPayload>>,
    #[serde(skip)]
    symbol_rx: Option<Receiver<(String, OhlcvSeries)>>,
    #[serde(skip)]
    symbol_tx: Option<mpsc::Sender<(String, OhlcvSeries)>>,
}

impl Default for App {
    fn default() -> Self {
        let watchlist = WatchlistState::default();
        let active_symbol = watchlist.symbols[0].clone();
        Self {
            store: DrawingStore::new(&active_symbol),
            watchlist,
            active_symbol,
            plot_visibility: PlotVisibility::default(),
            prefer_api: false,
            state: AppState::default(),
            series: HashMap::new(),
            interaction: Interaction::default(),
            plot_view: PlotView::new(),
            bridge: None,
            storage: None,
            notices: Vec::new(),
            progress_rx: None,
            data_rx: None,
            symbol_rx: None,
            symbol_tx: None,
        }
    }
}

impl App {
    pub(crate) fn new(cc: &eframe::CreationContext<'_>, args: Cli) -> Self {
        let mut app: App = if let Some(storage) = cc.storage {
            eframe::get_value(storage, eframe::APP_KEY).unwrap_or_default()
        } else {
            Self::default()
        };

        app.prefer_api = args.prefer_api;
        app.state = AppState::Loading(LoadingState::default());
        if let Some(symbol) = args.symbol.clone() {
            let symbol = symbol.to_uppercase();
            if !app.watchlist.symbols.contains(&symbol) {
                app.watchlist.symbols.push(symbol.clone());
            }
            app.active_symbol = symbol;
        }

        let (data_tx, data_rx) = mpsc::channel();
        let (prog_tx, prog_rx) = mpsc::channel();
        let (symbol_tx, symbol_rx) = mpsc::channel();
        app.data_rx = Some(data_rx);
        app.progress_rx = Some(prog_rx);
        app.symbol_rx = Some(symbol_rx);
        app.symbol_tx = Some(symbol_tx);

        let symbols = app.watchlist.symbols.clone();
        thread::spawn(move || {
            let rt = match Runtime::new() {
                Ok(rt) => rt,
                Err(err) => {
                    let _ = data_tx.send(Err(err.into()));
                    return;
                }
            };
            rt.block_on(async move {
                let payload = match SqliteStore::open(PERSISTENCE.db.db_path).await {
                    Ok(store) => {
                        let store = Arc::new(store);
                        let series =
                            fetch_symbol_data(&symbols, &args, &store, Some(prog_tx)).await;
                        Ok((series, store))
                    }
                    Err(err) => Err(err),
                };
                let _ = data_tx.send(payload);
            });
        });

        app
    }

    fn tick_loading(&mut self, ctx: &Context, mut state: LoadingState) -> AppState {
        if let Some(rx) = &self.progress_rx {
            while let Ok(event) = rx.try_recv() {
                state.symbols.insert(event.index, (event.symbol, event.status));
            }
            state.completed = state
                .symbols
                .values()
                .filter(|(_, s)| matches!(s, SyncStatus::Completed(_)))
                .count();
            state.failed = state
                .symbols
                .values()
                .filter(|(_, s)| matches!(s, SyncStatus::Failed(_)))
                .count();
        }

        let payload = self.data_rx.as_ref().and_then(|rx| rx.try_recv().ok());
        match payload {
            Some(Ok((series, storage))) => {
                self.finish_bootstrap(series, storage);
                return AppState::Running;
            }
            Some(Err(err)) => {
                log::error!("Bootstrap failed: {err:#}");
                self.notices.push(format!("Startup failed: {err}"));
                self.data_rx = None;
            }
            None => {}
        }

        self.render_loading_screen(ctx, &state);
        ctx.request_repaint();
        AppState::Loading(state)
    }

    fn render_loading_screen(&self, ctx: &Context, state: &LoadingState) {
        CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(80.0);
                ui.heading(UI_TEXT.ls_title.clone());
                ui.add_space(10.0);
                ui.label(format!("{} {}", UI_TEXT.ls_syncing, UI_TEXT.ls_main));
                ui.add_space(20.0);

                let total = self.watchlist.symbols.len().max(1);
                let progress = (state.completed + state.failed) as f32 / total as f32;
                ui.add(
                    ProgressBar::new(progress)
                        .text(format!("{} / {}", state.completed + state.failed, total)),
                );

                ui.add_space(20.0);
                for (symbol, status) in state.symbols.values() {
                    let line = match status {
                        SyncStatus::Pending => {
                            RichText::new(format!("{symbol} ..."))
                                .color(PLOT_CONFIG.color_text_subdued)
                        }
                        SyncStatus::Completed(n) => {
                            RichText::new(format!("{symbol}  {n} candles"))
                                .color(PLOT_CONFIG.color_bullish_text)
                        }
                        SyncStatus::Failed(err) => {
                            RichText::new(format!("{symbol}  {} ({err})", UI_TEXT.ls_failed))
                                .color(PLOT_CONFIG.color_bearish_text)
                        }
                    };
                    ui.label(line);
                }

                if let Some(notice) = self.notices.last() {
                    ui.add_space(20.0);
                    ui.label(RichText::new(notice).color(PLOT_CONFIG.color_warning));
                }
            });
        });
    }

    fn finish_bootstrap(&mut self, series: HashMap<String, OhlcvSeries>, storage: Arc<SqliteStore>) {
        self.series = series;

        // A persisted active symbol whose data failed to load falls back to
        // the first symbol that did.
        if !self.series.contains_key(&self.active_symbol) {
            if let Some(symbol) = self
                .watchlist
                .symbols
                .iter()
                .find(|s| self.series.contains_key(*s))
            {
                self.active_symbol = symbol.clone();
            }
        }

        let mut bridge = PersistenceBridge::new(storage.clone(), LOCAL_USER);
        self.store = DrawingStore::new(&self.active_symbol);
        bridge.begin_symbol(&self.active_symbol);
        self.bridge = Some(bridge);
        self.storage = Some(storage);
        self.watchlist.record_visit(&self.active_symbol);
    }

    fn tick_running(&mut self, ctx: &Context) {
        self.drain_symbol_fetches();
        self.handle_global_shortcuts(ctx);

        if let Some(bridge) = &mut self.bridge {
            bridge.tick(&mut self.store, &mut self.notices);
        }

        TopBottomPanel::top("toolbar").show(ctx, |ui| {
            show_toolbar(
                ui,
                &mut self.interaction,
                &mut self.store,
                &mut self.plot_visibility,
            );
        });

        let mut switch_to = None;
        SidePanel::left("watchlist")
            .default_width(160.0)
            .show(ctx, |ui| {
                switch_to = show_watchlist(ui, &mut self.watchlist, &self.active_symbol);
            });
        if let Some(symbol) = switch_to {
            self.switch_symbol(symbol);
        }

        SidePanel::right("analysis")
            .default_width(220.0)
            .show(ctx, |ui| {
                if let Some(series) = self.series.get(&self.active_symbol) {
                    show_analysis_panel(ui, series);
                } else {
                    ui.label(UI_TEXT.cp_no_data.clone());
                }
            });

        TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            show_status_bar(ui, &self.interaction, &self.store, &self.notices);
        });

        CentralPanel::default().show(ctx, |ui| {
            match self.series.get(&self.active_symbol) {
                Some(series) => {
                    self.plot_view.show_plot(
                        ui,
                        series,
                        &mut self.store,
                        &mut self.interaction,
                        &self.plot_visibility,
                    );
                }
                None => {
                    ui.centered_and_justified(|ui| ui.label(UI_TEXT.cp_no_data.clone()));
                }
            }
        });

        // Keep ticking while a save or hydration may be outstanding.
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }

    pub(crate) fn switch_symbol(&mut self, symbol: String) {
        if symbol == self.active_symbol {
            return;
        }

        // Pending edits for the old symbol go out before the store is torn
        // down; the save payload carries the old symbol.
        if let Some(bridge) = &mut self.bridge {
            bridge.flush(&self.store);
        }
        self.interaction.escape(&mut self.store);
        self.store = DrawingStore::new(&symbol);
        if let Some(bridge) = &mut self.bridge {
            bridge.begin_symbol(&symbol);
        }
        self.watchlist.record_visit(&symbol);

        if !self.series.contains_key(&symbol) {
            self.request_symbol_fetch(&symbol);
        }
        self.active_symbol = symbol;
    }

    /// Background fetch for a symbol added to the watchlist after startup.
    fn request_symbol_fetch(&self, symbol: &str) {
        let (Some(storage), Some(tx)) = (self.storage.clone(), self.symbol_tx.clone()) else {
            return;
        };
        let symbol = symbol.to_string();
        let args = Cli {
            prefer_api: self.prefer_api,
            symbol: None,
        };
        thread::spawn(move || {
            let rt = match Runtime::new() {
                Ok(rt) => rt,
                Err(err) => {
                    log::error!("Symbol fetch worker failed to start: {err}");
                    return;
                }
            };
            rt.block_on(async move {
                let mut fetched =
                    fetch_symbol_data(std::slice::from_ref(&symbol), &args, &storage, None).await;
                if let Some(series) = fetched.remove(&symbol) {
                    let _ = tx.send((symbol, series));
                }
            });
        });
    }

    fn drain_symbol_fetches(&mut self) {
        if let Some(rx) = &self.symbol_rx {
            while let Ok((symbol, series)) = rx.try_recv() {
                self.series.insert(symbol, series);
            }
        }
    }

    pub(crate) fn handle_global_shortcuts(&mut self, ctx: &Context) {
        if ctx.wants_keyboard_input() {
            // If the user is typing in a text box, don't trigger global hotkeys.
            return;
        }

        ctx.input(|i| {
            if i.key_pressed(Key::Escape) {
                self.interaction.escape(&mut self.store);
            }
            if i.key_pressed(Key::Delete) || i.key_pressed(Key::Backspace) {
                self.interaction.delete_selected(&mut self.store);
            }
            if i.key_pressed(Key::T) {
                self.interaction.select_tool(&mut self.store, DrawTool::TrendLine);
            }
            if i.key_pressed(Key::H) {
                self.interaction.select_tool(&mut self.store, DrawTool::HorizontalLine);
            }
            if i.key_pressed(Key::F) {
                self.interaction.select_tool(&mut self.store, DrawTool::Fibonacci);
            }
            if i.key_pressed(Key::S) {
                self.interaction.select_tool(&mut self.store, DrawTool::Select);
            }
            if i.key_pressed(Key::Num1) {
                self.plot_visibility.candles = !self.plot_visibility.candles;
            }
            if i.key_pressed(Key::Num2) {
                self.plot_visibility.price_line = !self.plot_visibility.price_line;
            }
            if i.key_pressed(Key::Num3) {
                self.plot_visibility.annotations = !self.plot_visibility.annotations;
            }
        });
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        setup_custom_visuals(ctx);
        let current = mem::take(&mut self.state);
        self.state = match current {
            AppState::Loading(s) => self.tick_loading(ctx, s),
            AppState::Running => {
                self.tick_running(ctx);
                AppState::Running
            }
        };
    }

    fn save(&mut self, storage: &mut dyn Storage) {
        // Drawings waiting on the debounce timer go out with the UI state.
        if let Some(bridge) = &mut self.bridge {
            bridge.flush(&self.store);
        }
        eframe::set_value(storage, eframe::APP_KEY, self);
    }
}
