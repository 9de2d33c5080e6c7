mod config;
mod snapshot;

pub use config::{AutosaveConfig, Config, NotificationsConfig};
pub use snapshot::{PersistedSnapshot, SnapshotStore, SNAPSHOT_FILE};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns the per-user data directory, creating it if needed.
///
/// `<config dir>/pomocycle`, or `pomocycle-dev` when `POMOCYCLE_ENV=dev`.
/// `POMOCYCLE_DATA_DIR` overrides the location entirely.
///
/// # Errors
/// Returns an error if no config directory can be determined or if
/// creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("POMOCYCLE_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base = dirs::config_dir()
                .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
                .ok_or_else(|| StorageError::DataDir("no config directory for this user".into()))?;
            let env = std::env::var("POMOCYCLE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base.join("pomocycle-dev")
            } else {
                base.join("pomocycle")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
