use std::collections::BTreeMap;

use crate::data::SyncStatus;

pub(crate) enum AppState {
    Loading(LoadingState),
    Running,
}

impl Default for AppState {
    fn default() -> Self {
        AppState::Loading(LoadingState::default())
    }
}

/// Per-symbol sync progress shown on the loading screen.
#[derive(Default, Clone)]
pub(crate) struct LoadingState {
    pub(crate) symbols: BTreeMap<usize, (String, SyncStatus)>,
    pub(crate) completed: usize,
    pub(crate) failed: usize,
}
