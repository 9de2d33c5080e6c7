//! Cycle parameters and the settings-update validation rules.
//!
//! [`CycleSettings`] is an immutable snapshot read whenever a cycle is built.
//! It only changes through [`CycleSettings::apply`], which validates every
//! field of a [`SettingsUpdate`] on its own and keeps the previous value for
//! each field that is rejected.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound on work slots per cycle.
pub const MAX_SESSION_COUNT: u32 = 100;
/// Upper bound on any single slot length, in minutes.
pub const MAX_SLOT_MINUTES: u32 = 24 * 60;

/// Field keys accepted by [`SettingsUpdate::with_field`].
pub const FIELD_KEYS: [&str; 7] = [
    "sessionCount",
    "workMinutes",
    "shortBreakMinutes",
    "longBreakMinutes",
    "longBreakFrequency",
    "maxSurprises",
    "surpriseMinutes",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSettings {
    #[serde(default = "default_session_count")]
    pub session_count: u32,
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,
    #[serde(default = "default_short_break")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break")]
    pub long_break_minutes: u32,
    /// Desired number of long breaks per cycle. Zero disables them.
    #[serde(default = "default_long_break_frequency")]
    pub long_break_frequency: u32,
    /// Zero disables surprise slots.
    #[serde(default = "default_max_surprises")]
    pub max_surprises: u32,
    #[serde(default = "default_surprise_minutes")]
    pub surprise_minutes: u32,
}

fn default_session_count() -> u32 {
    6
}
fn default_work_minutes() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_long_break_frequency() -> u32 {
    1
}
fn default_max_surprises() -> u32 {
    3
}
fn default_surprise_minutes() -> u32 {
    2
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            session_count: default_session_count(),
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break(),
            long_break_minutes: default_long_break(),
            long_break_frequency: default_long_break_frequency(),
            max_surprises: default_max_surprises(),
            surprise_minutes: default_surprise_minutes(),
        }
    }
}

/// A full replacement for [`CycleSettings`] as entered by the user.
///
/// Values are signed so that out-of-range input can reach validation and be
/// rejected there instead of failing earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub session_count: i64,
    pub work_minutes: i64,
    pub short_break_minutes: i64,
    pub long_break_minutes: i64,
    pub long_break_frequency: i64,
    pub max_surprises: i64,
    pub surprise_minutes: i64,
}

impl From<&CycleSettings> for SettingsUpdate {
    fn from(s: &CycleSettings) -> Self {
        Self {
            session_count: s.session_count.into(),
            work_minutes: s.work_minutes.into(),
            short_break_minutes: s.short_break_minutes.into(),
            long_break_minutes: s.long_break_minutes.into(),
            long_break_frequency: s.long_break_frequency.into(),
            max_surprises: s.max_surprises.into(),
            surprise_minutes: s.surprise_minutes.into(),
        }
    }
}

impl SettingsUpdate {
    /// Replace one field from text input.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is not a settings field or `value` is not an
    /// integer. Range checks happen later in [`CycleSettings::apply`].
    pub fn with_field(mut self, key: &str, value: &str) -> Result<Self, ConfigError> {
        let slot = match key {
            "sessionCount" => &mut self.session_count,
            "workMinutes" => &mut self.work_minutes,
            "shortBreakMinutes" => &mut self.short_break_minutes,
            "longBreakMinutes" => &mut self.long_break_minutes,
            "longBreakFrequency" => &mut self.long_break_frequency,
            "maxSurprises" => &mut self.max_surprises,
            "surpriseMinutes" => &mut self.surprise_minutes,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        *slot = value
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::invalid(key, format!("'{value}' is not a whole number")))?;
        Ok(self)
    }
}

impl CycleSettings {
    /// Apply `update` field by field.
    ///
    /// Accepted fields are written; rejected fields keep their prior value and
    /// are returned as errors. Never fails as a whole.
    pub fn apply(&mut self, update: &SettingsUpdate) -> Vec<ConfigError> {
        let mut rejected = Vec::new();

        accept(
            &mut self.session_count,
            update.session_count,
            "sessionCount",
            1,
            MAX_SESSION_COUNT,
            &mut rejected,
        );
        accept(
            &mut self.work_minutes,
            update.work_minutes,
            "workMinutes",
            1,
            MAX_SLOT_MINUTES,
            &mut rejected,
        );
        accept(
            &mut self.short_break_minutes,
            update.short_break_minutes,
            "shortBreakMinutes",
            1,
            MAX_SLOT_MINUTES,
            &mut rejected,
        );
        accept(
            &mut self.long_break_minutes,
            update.long_break_minutes,
            "longBreakMinutes",
            1,
            MAX_SLOT_MINUTES,
            &mut rejected,
        );
        accept(
            &mut self.long_break_frequency,
            update.long_break_frequency,
            "longBreakFrequency",
            0,
            MAX_SESSION_COUNT,
            &mut rejected,
        );
        accept(
            &mut self.max_surprises,
            update.max_surprises,
            "maxSurprises",
            0,
            MAX_SESSION_COUNT,
            &mut rejected,
        );
        accept(
            &mut self.surprise_minutes,
            update.surprise_minutes,
            "surpriseMinutes",
            1,
            MAX_SLOT_MINUTES,
            &mut rejected,
        );

        for err in &rejected {
            tracing::warn!("settings field rejected: {err}");
        }
        rejected
    }

    /// Same rules as [`apply`](Self::apply) applied to a value loaded from
    /// disk: anything out of range falls back to the default for that field.
    pub fn sanitized(self) -> Self {
        let mut clean = Self::default();
        clean.apply(&SettingsUpdate::from(&self));
        clean
    }
}

fn accept(
    field: &mut u32,
    proposed: i64,
    key: &str,
    min: u32,
    max: u32,
    rejected: &mut Vec<ConfigError>,
) {
    if proposed < i64::from(min) {
        let message = if min == 0 {
            format!("{proposed} must not be negative")
        } else {
            format!("{proposed} must be positive")
        };
        rejected.push(ConfigError::invalid(key, message));
    } else if proposed > i64::from(max) {
        let message = format!("{proposed} exceeds the limit of {max}");
        rejected.push(ConfigError::invalid(key, message));
    } else {
        *field = proposed as u32;
    }
}
