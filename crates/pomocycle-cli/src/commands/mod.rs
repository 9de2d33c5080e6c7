pub mod config;
pub mod cycle;
pub mod run;
pub mod state;
pub mod status;

use pomocycle_core::{Config, SnapshotStore, TimerEngine};

/// The engine a session would start with: the saved one when present,
/// otherwise a fresh cycle from the configured defaults.
pub fn initial_engine(
    config: &Config,
    store: Option<&SnapshotStore>,
    seed: Option<u64>,
) -> TimerEngine {
    if let Some(snapshot) = store.and_then(SnapshotStore::load) {
        return TimerEngine::restore(snapshot);
    }
    match seed {
        Some(seed) => TimerEngine::with_seed(config.cycle, seed),
        None => TimerEngine::new(config.cycle),
    }
}
