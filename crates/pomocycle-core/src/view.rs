//! Read-only picture of the engine pushed to the front end after each change.

use serde::{Deserialize, Serialize};

use crate::timer::{SessionSlot, TimerPhase};

/// How many completed / upcoming slots a view carries.
pub const LIST_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerView {
    pub phase: TimerPhase,
    pub seconds_remaining: u64,
    /// `seconds_remaining` as `MM:SS`.
    pub display: String,
    pub current: Option<SessionSlot>,
    pub current_index: usize,
    pub slot_count: usize,
    /// Most recent completed slots, oldest first.
    pub recent_completed: Vec<SessionSlot>,
    pub upcoming: Vec<SessionSlot>,
    pub work_completed: u32,
    pub work_total: u32,
    pub is_last_slot: bool,
}

impl TimerView {
    /// Headline for the current slot, e.g. `Work Session 2 (25 min)`.
    pub fn headline(&self) -> String {
        match &self.current {
            Some(slot) => format!("{} ({})", slot.label(), slot.duration_label()),
            None => "All Sessions Complete!".to_string(),
        }
    }
}

/// Formats seconds as zero-padded `MM:SS`. Minutes are not wrapped into hours.
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
