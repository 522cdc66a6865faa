//! File persistence configuration.

/// Configuration for the SQLite market/annotation store.
pub struct DbPersistenceConfig {
    /// Path of the SQLite database file.
    pub db_path: &'static str,
}

/// Configuration for Application State Persistence.
pub struct AppPersistenceConfig {
    /// Path for saving/loading application UI state.
    pub state_path: &'static str,
}

/// The Master Persistence Configuration.
pub struct PersistenceConfig {
    pub db: DbPersistenceConfig,
    pub app: AppPersistenceConfig,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    db: DbPersistenceConfig {
        db_path: "trendmark.db",
    },
    app: AppPersistenceConfig {
        state_path: ".states.json",
    },
};
