//! The ordered slot list for one run-through and the cursor over it.
//!
//! A `Cycle` is produced by [`CycleBuilder`](super::CycleBuilder) and then only
//! moved forward with [`Cycle::advance`]. When `advance` reports exhaustion the
//! owner replaces the whole cycle with a freshly built one.

use serde::{Deserialize, Serialize};

use super::slot::{SessionSlot, SlotKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cycle {
    pub slots: Vec<SessionSlot>,
    /// Position of the current slot. Equals `slots.len()` once exhausted.
    pub current_index: usize,
    pub total_work_slots: u32,
    pub surprise_slots_placed: u32,
    pub max_surprise_slots: u32,
}

impl Cycle {
    pub(crate) fn from_slots(mut slots: Vec<SessionSlot>, max_surprise_slots: u32) -> Self {
        if let Some(first) = slots.first_mut() {
            first.is_current = true;
        }
        let total_work_slots = count_kind(&slots, SlotKind::Work);
        let surprise_slots_placed = count_kind(&slots, SlotKind::Surprise);
        Self {
            slots,
            current_index: 0,
            total_work_slots,
            surprise_slots_placed,
            max_surprise_slots,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn current_slot(&self) -> Option<&SessionSlot> {
        self.slots.get(self.current_index)
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_index >= self.slots.len()
    }

    /// True when the current slot is the final one of the cycle.
    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.slots.len()
    }

    pub fn completed_slots(&self) -> Vec<&SessionSlot> {
        self.slots.iter().filter(|s| s.completed).collect()
    }

    /// Slots strictly after the current one that are not completed.
    pub fn upcoming_slots(&self) -> Vec<&SessionSlot> {
        self.slots
            .iter()
            .skip(self.current_index.saturating_add(1))
            .filter(|s| !s.completed)
            .collect()
    }

    pub fn completed_work_slots(&self) -> u32 {
        self.slots
            .iter()
            .filter(|s| s.completed && s.kind == SlotKind::Work)
            .count() as u32
    }

    /// Checks the structural invariants a restored cycle must satisfy before
    /// it can be driven again.
    pub fn is_consistent(&self) -> bool {
        if self.slots.is_empty() || self.current_index >= self.slots.len() {
            return false;
        }
        let current_flags = self.slots.iter().filter(|s| s.is_current).count();
        if current_flags != 1 || !self.slots[self.current_index].is_current {
            return false;
        }
        if self.slots.iter().any(|s| s.duration_seconds == 0) {
            return false;
        }
        let starts_and_ends_with_work = [self.slots.first(), self.slots.last()]
            .into_iter()
            .all(|s| s.is_some_and(|s| s.kind == SlotKind::Work));
        if !starts_and_ends_with_work {
            return false;
        }
        if self.total_work_slots != count_kind(&self.slots, SlotKind::Work)
            || self.surprise_slots_placed != count_kind(&self.slots, SlotKind::Surprise)
        {
            return false;
        }
        let mut expected = 1;
        for slot in &self.slots {
            match (slot.kind, slot.work_sequence_number) {
                (SlotKind::Work, Some(n)) if n == expected => expected += 1,
                (SlotKind::Work, _) => return false,
                (_, Some(_)) => return false,
                _ => {}
            }
        }
        true
    }

    // ── Cursor ───────────────────────────────────────────────────────

    /// Leaves the current slot and moves to the next one.
    ///
    /// `mark_completed` distinguishes finishing a slot from skipping it.
    /// Returns `false` when no slot remains; the caller must rebuild.
    pub fn advance(&mut self, mark_completed: bool) -> bool {
        let Some(slot) = self.slots.get_mut(self.current_index) else {
            return false;
        };
        slot.completed = mark_completed;
        slot.is_current = false;
        self.current_index += 1;

        match self.slots.get_mut(self.current_index) {
            Some(next) => {
                next.is_current = true;
                true
            }
            None => false,
        }
    }
}

fn count_kind(slots: &[SessionSlot], kind: SlotKind) -> u32 {
    slots.iter().filter(|s| s.kind == kind).count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_slot_cycle() -> Cycle {
        Cycle::from_slots(
            vec![
                SessionSlot::work(1, 25),
                SessionSlot::short_break(5),
                SessionSlot::work(2, 25),
            ],
            0,
        )
    }

    #[test]
    fn first_slot_is_current() {
        let cycle = three_slot_cycle();
        assert_eq!(cycle.current_index, 0);
        assert!(cycle.slots[0].is_current);
        assert_eq!(cycle.current_slot().map(|s| s.kind), Some(SlotKind::Work));
        assert_eq!(cycle.total_work_slots, 2);
        assert!(cycle.is_consistent());
    }

    #[test]
    fn advance_marks_completion_and_moves_current() {
        let mut cycle = three_slot_cycle();
        assert!(cycle.advance(true));
        assert!(cycle.slots[0].completed);
        assert!(!cycle.slots[0].is_current);
        assert!(cycle.slots[1].is_current);
        assert_eq!(cycle.current_index, 1);
    }

    #[test]
    fn skipped_slot_is_not_completed() {
        let mut cycle = three_slot_cycle();
        assert!(cycle.advance(false));
        assert!(!cycle.slots[0].completed);
        assert!(cycle.completed_slots().is_empty());
    }

    #[test]
    fn advancing_past_last_slot_exhausts() {
        let mut cycle = three_slot_cycle();
        assert!(cycle.advance(true));
        assert!(cycle.advance(true));
        assert!(cycle.is_last());
        assert!(!cycle.advance(true));
        assert!(cycle.is_exhausted());
        assert!(cycle.current_slot().is_none());
        assert!(cycle.slots.iter().all(|s| !s.is_current));
        // Further calls are harmless.
        assert!(!cycle.advance(true));
        assert_eq!(cycle.current_index, 3);
    }

    #[test]
    fn completed_and_upcoming_lists() {
        let mut cycle = three_slot_cycle();
        assert_eq!(cycle.upcoming_slots().len(), 2);

        cycle.advance(true);
        assert_eq!(cycle.completed_slots().len(), 1);
        let upcoming = cycle.upcoming_slots();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].work_sequence_number, Some(2));
        assert_eq!(cycle.completed_work_slots(), 1);
    }

    #[test]
    fn inconsistent_cycles_are_detected() {
        let mut cycle = three_slot_cycle();
        cycle.slots[2].is_current = true;
        assert!(!cycle.is_consistent());

        let mut cycle = three_slot_cycle();
        cycle.current_index = 7;
        assert!(!cycle.is_consistent());

        let mut cycle = three_slot_cycle();
        cycle.slots[2].work_sequence_number = Some(5);
        assert!(!cycle.is_consistent());

        assert!(!Cycle::from_slots(Vec::new(), 0).is_consistent());
    }

    #[test]
    fn cycle_must_start_and_end_with_work() {
        let ends_in_break = Cycle::from_slots(
            vec![SessionSlot::work(1, 25), SessionSlot::short_break(5)],
            0,
        );
        assert!(!ends_in_break.is_consistent());

        let starts_with_break = Cycle::from_slots(
            vec![SessionSlot::short_break(5), SessionSlot::work(1, 25)],
            0,
        );
        assert!(!starts_with_break.is_consistent());
    }

    #[test]
    fn counters_must_match_slots() {
        let mut cycle = three_slot_cycle();
        cycle.total_work_slots = 9;
        assert!(!cycle.is_consistent());

        let mut cycle = three_slot_cycle();
        cycle.surprise_slots_placed = 1;
        assert!(!cycle.is_consistent());
    }
}
