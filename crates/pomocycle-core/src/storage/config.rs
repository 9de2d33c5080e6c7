//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Default cycle settings for a fresh start
//! - Notification preferences
//! - Autosave cadence
//!
//! Configuration is stored at `<data dir>/config.toml`. Cycle settings saved
//! in the session snapshot take precedence over the `[cycle]` table.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;
use crate::settings::CycleSettings;

pub const CONFIG_FILE: &str = "config.toml";

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Bell and OS notification on completion. The in-terminal banner is
    /// always shown.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Raise an OS-level desktop notification (only when `enabled`).
    #[serde(default = "default_true")]
    pub desktop: bool,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u32,
}

/// Autosave configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveConfig {
    #[serde(default = "default_autosave_secs")]
    pub interval_secs: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cycle: CycleSettings,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub autosave: AutosaveConfig,
}

fn default_true() -> bool {
    true
}
fn default_timeout_ms() -> u32 {
    5000
}
fn default_autosave_secs() -> u64 {
    30
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            desktop: true,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_autosave_secs(),
        }
    }
}

impl AutosaveConfig {
    /// Interval as a duration, never shorter than one second.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => value
                    .parse::<bool>()
                    .map(serde_json::Value::Bool)
                    .map_err(|_| {
                        ConfigError::invalid(key, format!("cannot parse '{value}' as bool"))
                    })?,
                serde_json::Value::Number(_) => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| {
                        let message = format!("cannot parse '{value}' as a whole number");
                        ConfigError::invalid(key, message)
                    })?,
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    return Err(ConfigError::invalid(key, "is a table, not a value"));
                }
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Path of the config file inside the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from(CONFIG_FILE),
            message: e.to_string(),
        })?;
        Ok(dir.join(CONFIG_FILE))
    }

    /// Load from disk, writing the defaults when no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(path)?;
            return Ok(cfg);
        }
        Self::read_from(path)
    }

    /// Like [`load_from`](Self::load_from) but never writes: a missing file
    /// reads as the defaults.
    pub fn read_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let mut cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.cycle = cfg.cycle.sanitized();
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Read-only counterpart of [`load_or_default`](Self::load_or_default)
    /// for commands that only inspect state.
    pub fn read_or_default() -> Self {
        Self::path()
            .and_then(|path| Self::read_from(&path))
            .unwrap_or_else(|e| {
                tracing::warn!("using default configuration: {e}");
                Self::default()
            })
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("using default configuration: {e}");
            Self::default()
        })
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let save_err = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_err(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_err(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// Cycle fields go through the same validation as a settings update, so
    /// `cycle.sessionCount = 0` is refused.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// or is out of range.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        if let Some(field) = key.strip_prefix("cycle.") {
            let update =
                crate::settings::SettingsUpdate::from(&self.cycle).with_field(field, value)?;
            let mut cycle = self.cycle;
            if let Some(err) = cycle.apply(&update).into_iter().next() {
                return Err(err);
            }
            self.cycle = cycle;
            return Ok(());
        }

        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self =
            serde_json::from_value(json).map_err(|e| ConfigError::invalid(key, e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn read_from_does_not_create_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let cfg = Config::read_from(&path).unwrap();
        assert_eq!(cfg.cycle.session_count, 6);
        assert!(!path.exists());

        Config::load_from(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.cycle, CycleSettings::default());
        assert!(parsed.notifications.enabled);
        assert_eq!(parsed.autosave.interval_secs, 30);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("notifications.desktop").as_deref(), Some("true"));
        assert_eq!(cfg.get("cycle.sessionCount").as_deref(), Some("6"));
        assert!(cfg.get("notifications.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_bool_and_number() {
        let mut cfg = Config::default();
        cfg.set("notifications.desktop", "false").unwrap();
        cfg.set("autosave.interval_secs", "10").unwrap();
        assert!(!cfg.notifications.desktop);
        assert_eq!(cfg.autosave.interval(), Duration::from_secs(10));
    }

    #[test]
    fn set_cycle_field_is_validated() {
        let mut cfg = Config::default();
        cfg.set("cycle.maxSurprises", "0").unwrap();
        assert_eq!(cfg.cycle.max_surprises, 0);

        assert!(cfg.set("cycle.sessionCount", "0").is_err());
        assert_eq!(cfg.cycle.session_count, 6);
        assert!(cfg.set("cycle.sessionCount", "six").is_err());
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_type() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("notifications.volume", "3"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(cfg.set("notifications.enabled", "maybe").is_err());
        assert!(cfg.set("notifications", "x").is_err());
    }

    #[test]
    fn load_from_creates_defaults_then_reads_them_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.cycle.session_count, 6);

        let mut changed = cfg.clone();
        changed.set("cycle.workMinutes", "50").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().cycle.work_minutes, 50);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[cycle]\nsessionCount = 3\nshortBreakMinutes = 0\n").unwrap();
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.cycle.session_count, 3);
        // Out-of-range value on disk falls back to the default.
        assert_eq!(cfg.cycle.short_break_minutes, 5);
        assert_eq!(cfg.autosave.interval_secs, 30);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "cycle = [").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::ParseFailed(_))));
    }
}
