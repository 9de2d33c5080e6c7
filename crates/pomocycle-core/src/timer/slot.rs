use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Work,
    ShortBreak,
    LongBreak,
    Surprise,
}

impl SlotKind {
    pub fn is_break(self) -> bool {
        matches!(self, SlotKind::ShortBreak | SlotKind::LongBreak)
    }
}

/// One scheduled interval in a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSlot {
    pub kind: SlotKind,
    pub duration_seconds: u64,
    /// Set only when the slot ran to the end; skipped slots stay `false`.
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub is_current: bool,
    /// 1-based position among work slots. `None` for every other kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_sequence_number: Option<u32>,
}

impl SessionSlot {
    pub fn work(sequence: u32, minutes: u32) -> Self {
        Self::with_kind(SlotKind::Work, minutes, Some(sequence))
    }

    pub fn short_break(minutes: u32) -> Self {
        Self::with_kind(SlotKind::ShortBreak, minutes, None)
    }

    pub fn long_break(minutes: u32) -> Self {
        Self::with_kind(SlotKind::LongBreak, minutes, None)
    }

    pub fn surprise(minutes: u32) -> Self {
        Self::with_kind(SlotKind::Surprise, minutes, None)
    }

    fn with_kind(kind: SlotKind, minutes: u32, work_sequence_number: Option<u32>) -> Self {
        Self {
            kind,
            duration_seconds: u64::from(minutes).saturating_mul(60),
            completed: false,
            is_current: false,
            work_sequence_number,
        }
    }

    /// Human-readable name shown in lists and alerts.
    pub fn label(&self) -> String {
        match self.kind {
            SlotKind::Work => match self.work_sequence_number {
                Some(n) => format!("Work Session {n}"),
                None => "Work Session".to_string(),
            },
            SlotKind::ShortBreak => "Short Break".to_string(),
            SlotKind::LongBreak => "Long Break".to_string(),
            SlotKind::Surprise => "Surprise Task!".to_string(),
        }
    }

    pub fn duration_label(&self) -> String {
        format!("{} min", self.duration_seconds / 60)
    }
}
