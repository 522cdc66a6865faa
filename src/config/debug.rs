//! Debug logging flags.
//!
//! Gates for noisy log paths. All off for normal runs; flip individually
//! while chasing a specific subsystem.

pub struct DebugFlags {
    pub log_interaction: bool,
    pub log_persistence: bool,
    pub log_hit_test: bool,
    pub log_provider: bool,
    pub log_selection: bool,
}

pub const DF: DebugFlags = DebugFlags {
    log_interaction: false,
    log_persistence: false,
    log_hit_test: false,
    log_provider: false,
    log_selection: false,
};
