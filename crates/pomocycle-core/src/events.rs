use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::settings::CycleSettings;
use crate::timer::SlotKind;

/// Every state change in the engine produces an Event.
/// Commands that do not apply to the current phase produce none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        slot_index: usize,
        kind: SlotKind,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    TimerTicked {
        seconds_remaining: u64,
    },
    /// Countdown reached zero. Raised once per finished slot.
    SessionCompleted {
        slot_index: usize,
        kind: SlotKind,
        alert: Alert,
        at: DateTime<Utc>,
    },
    TimerReset {
        slot_index: usize,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    /// Cursor moved on; `completed` is false for a skip.
    SlotAdvanced {
        from_index: usize,
        to_index: usize,
        completed: bool,
        at: DateTime<Utc>,
    },
    /// The active cycle was replaced by a freshly built one.
    CycleRebuilt {
        slot_count: usize,
        surprise_slots: u32,
        at: DateTime<Utc>,
    },
    SettingsApplied {
        settings: CycleSettings,
        rejected: Vec<String>,
        at: DateTime<Utc>,
    },
}

/// Completion notice routed to the desktop and the in-app banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Event {
    pub fn alert(&self) -> Option<&Alert> {
        match self {
            Event::SessionCompleted { alert, .. } => Some(alert),
            _ => None,
        }
    }
}
