//! JSON snapshot of the whole timer: settings, cycle, phase and countdown.
//!
//! Written with write-then-rename so a crash mid-write never leaves a torn
//! file behind. Reading never fails from the caller's point of view: a
//! missing file is a fresh start and a corrupt one is logged and ignored.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::StorageError;
use crate::settings::CycleSettings;
use crate::timer::{Cycle, TimerPhase};

pub const SNAPSHOT_FILE: &str = "session_state.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    pub configuration: CycleSettings,
    pub cycle: Cycle,
    pub timer_phase: TimerPhase,
    pub seconds_remaining: u64,
    pub last_saved: DateTime<Utc>,
}

impl PersistedSnapshot {
    /// A restored process cannot know how long it was away, so a running
    /// countdown comes back paused.
    pub fn coerce_running(mut self) -> Self {
        if self.timer_phase == TimerPhase::Running {
            self.timer_phase = TimerPhase::Paused;
        }
        self
    }
}

/// Reads and writes the snapshot file at a fixed path.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Store at `<data dir>/session_state.json`.
    pub fn open() -> Result<Self, StorageError> {
        Ok(Self::at(data_dir()?.join(SNAPSHOT_FILE)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the snapshot on disk atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding, writing the temp file, or the final
    /// rename fails. The previous snapshot is left intact in that case.
    pub fn save(&self, snapshot: &PersistedSnapshot) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        let write_err = |source| StorageError::WriteFailed {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp).map_err(write_err)?;
            file.write_all(json.as_bytes()).map_err(write_err)?;
            file.sync_all().map_err(write_err)?;
        }
        fs::rename(&tmp, &self.path).map_err(write_err)?;

        tracing::debug!(path = %self.path.display(), "snapshot saved");
        Ok(())
    }

    /// Strict load used by [`load`](Self::load).
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn try_load(&self) -> Result<Option<PersistedSnapshot>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::ReadFailed {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let snapshot: PersistedSnapshot =
            serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        Ok(Some(snapshot.coerce_running()))
    }

    /// Load the snapshot, treating every failure as "nothing saved".
    pub fn load(&self) -> Option<PersistedSnapshot> {
        match self.try_load() {
            Ok(Some(snapshot)) => {
                tracing::info!(
                    path = %self.path.display(),
                    phase = %snapshot.timer_phase,
                    last_saved = %snapshot.last_saved,
                    "snapshot restored"
                );
                Some(snapshot)
            }
            Ok(None) => {
                tracing::debug!(path = %self.path.display(), "no snapshot, starting fresh");
                None
            }
            Err(e) => {
                tracing::warn!("ignoring saved state: {e}");
                None
            }
        }
    }

    /// Delete the snapshot. A missing file is not an error.
    pub fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::WriteFailed {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
