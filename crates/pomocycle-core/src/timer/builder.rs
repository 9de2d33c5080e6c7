//! Expands [`CycleSettings`] into an ordered list of slots.
//!
//! The skeleton is deterministic: work, then `session_count - 1` pairs of
//! break + work, with long breaks spread evenly across the break positions.
//! Surprise slots are the only random part; each pair gets one with
//! probability [`SURPRISE_CHANCE`] until `max_surprises` have been placed.
//!
//! Randomness comes from the caller so tests can pin it down.

use rand::Rng;

use super::cycle::Cycle;
use super::slot::SessionSlot;
use crate::settings::CycleSettings;

/// Probability of a surprise slot ahead of each break.
pub const SURPRISE_CHANCE: f64 = 0.5;

pub struct CycleBuilder<'a> {
    settings: &'a CycleSettings,
}

impl<'a> CycleBuilder<'a> {
    pub fn new(settings: &'a CycleSettings) -> Self {
        Self { settings }
    }

    /// Break numbers (1-based, the i-th break between work slots) that get a
    /// long break instead of a short one.
    pub fn long_break_positions(&self) -> Vec<u32> {
        let sessions = self.settings.session_count;
        let mut wanted = self.settings.long_break_frequency;
        if wanted == 0 || sessions < 2 {
            return Vec::new();
        }
        if wanted >= sessions {
            wanted = sessions - 1;
        }

        let interval = f64::from(sessions) / f64::from(wanted + 1);
        (1..=wanted)
            .map(|i| (f64::from(i) * interval).round() as u32)
            .filter(|&pos| pos > 0 && pos < sessions)
            .collect()
    }

    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Cycle {
        let s = self.settings;
        let long_breaks = self.long_break_positions();
        let pairs = s.session_count.saturating_sub(1) as usize;
        let mut slots = Vec::with_capacity(1 + pairs * 3);
        let mut surprises = 0;

        slots.push(SessionSlot::work(1, s.work_minutes));

        for i in 1..s.session_count {
            if surprises < s.max_surprises && rng.gen_bool(SURPRISE_CHANCE) {
                slots.push(SessionSlot::surprise(s.surprise_minutes));
                surprises += 1;
            }

            if long_breaks.contains(&i) {
                slots.push(SessionSlot::long_break(s.long_break_minutes));
            } else {
                slots.push(SessionSlot::short_break(s.short_break_minutes));
            }

            slots.push(SessionSlot::work(i + 1, s.work_minutes));
        }

        let cycle = Cycle::from_slots(slots, s.max_surprises);
        tracing::debug!(
            slots = cycle.len(),
            work = cycle.total_work_slots,
            surprises = cycle.surprise_slots_placed,
            long_breaks = long_breaks.len(),
            "cycle built"
        );
        cycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::slot::SlotKind;
    use proptest::prelude::*;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    fn settings(sessions: u32, frequency: u32, surprises: u32) -> CycleSettings {
        CycleSettings {
            session_count: sessions,
            work_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            long_break_frequency: frequency,
            max_surprises: surprises,
            surprise_minutes: 2,
        }
    }

    /// Always draws below every probability threshold.
    fn always() -> StepRng {
        StepRng::new(0, 0)
    }

    /// Always draws above every probability threshold.
    fn never() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn kinds(cycle: &Cycle) -> Vec<SlotKind> {
        cycle.slots.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn two_sessions_without_extras() {
        let s = CycleSettings {
            short_break_minutes: 1,
            long_break_minutes: 2,
            ..settings(2, 0, 0)
        };
        let cycle = CycleBuilder::new(&s).build(&mut always());
        assert_eq!(
            kinds(&cycle),
            vec![SlotKind::Work, SlotKind::ShortBreak, SlotKind::Work]
        );
        assert_eq!(cycle.slots[0].work_sequence_number, Some(1));
        assert_eq!(cycle.slots[1].duration_seconds, 60);
        assert_eq!(cycle.slots[2].work_sequence_number, Some(2));
    }

    #[test]
    fn single_session_is_one_work_slot() {
        let cycle = CycleBuilder::new(&settings(1, 3, 3)).build(&mut always());
        assert_eq!(kinds(&cycle), vec![SlotKind::Work]);
        assert!(cycle.slots[0].is_current);
    }

    #[test]
    fn long_break_counts() {
        let cases = [(6, 0, 0), (6, 1, 1), (6, 2, 2), (8, 3, 3), (10, 4, 4), (4, 5, 3)];
        for (sessions, frequency, expected) in cases {
            let s = settings(sessions, frequency, 0);
            assert_eq!(
                CycleBuilder::new(&s).long_break_positions().len(),
                expected,
                "sessions={sessions} frequency={frequency}"
            );
        }
    }

    #[test]
    fn long_break_positions_are_rounded() {
        assert_eq!(CycleBuilder::new(&settings(6, 1, 0)).long_break_positions(), vec![3]);
        assert_eq!(CycleBuilder::new(&settings(6, 2, 0)).long_break_positions(), vec![2, 4]);
        assert_eq!(CycleBuilder::new(&settings(10, 3, 0)).long_break_positions(), vec![3, 5, 8]);
        assert_eq!(CycleBuilder::new(&settings(4, 9, 0)).long_break_positions(), vec![1, 2, 3]);
    }

    #[test]
    fn middle_long_break_lands_on_third_break() {
        let cycle = CycleBuilder::new(&settings(6, 1, 0)).build(&mut never());
        let breaks: Vec<SlotKind> = cycle
            .slots
            .iter()
            .map(|s| s.kind)
            .filter(|k| k.is_break())
            .collect();
        assert_eq!(
            breaks,
            vec![
                SlotKind::ShortBreak,
                SlotKind::ShortBreak,
                SlotKind::LongBreak,
                SlotKind::ShortBreak,
                SlotKind::ShortBreak,
            ]
        );
    }

    #[test]
    fn surprise_goes_before_the_break() {
        let cycle = CycleBuilder::new(&settings(3, 0, 1)).build(&mut always());
        assert_eq!(
            kinds(&cycle),
            vec![
                SlotKind::Work,
                SlotKind::Surprise,
                SlotKind::ShortBreak,
                SlotKind::Work,
                SlotKind::ShortBreak,
                SlotKind::Work,
            ]
        );
        assert_eq!(cycle.surprise_slots_placed, 1);
        assert_eq!(cycle.max_surprise_slots, 1);
    }

    #[test]
    fn surprises_stop_at_the_maximum() {
        let cycle = CycleBuilder::new(&settings(8, 0, 3)).build(&mut always());
        assert_eq!(cycle.surprise_slots_placed, 3);
    }

    #[test]
    fn zero_max_disables_surprises() {
        let cycle = CycleBuilder::new(&settings(8, 0, 0)).build(&mut always());
        assert_eq!(cycle.surprise_slots_placed, 0);
    }

    #[test]
    fn no_draw_no_surprise() {
        let cycle = CycleBuilder::new(&settings(8, 0, 5)).build(&mut never());
        assert_eq!(cycle.surprise_slots_placed, 0);
        assert_eq!(cycle.len(), 15);
    }

    proptest! {
        #[test]
        fn built_cycles_hold_their_invariants(
            sessions in 1u32..=40,
            frequency in 0u32..=12,
            surprises in 0u32..=10,
            seed in any::<u64>(),
        ) {
            let s = settings(sessions, frequency, surprises);
            let mut rng = Mcg128Xsl64::seed_from_u64(seed);
            let cycle = CycleBuilder::new(&s).build(&mut rng);

            prop_assert_eq!(cycle.slots.first().map(|s| s.kind), Some(SlotKind::Work));
            prop_assert_eq!(cycle.slots.last().map(|s| s.kind), Some(SlotKind::Work));

            let numbers: Vec<u32> = cycle
                .slots
                .iter()
                .filter(|s| s.kind == SlotKind::Work)
                .filter_map(|s| s.work_sequence_number)
                .collect();
            prop_assert_eq!(numbers, (1..=sessions).collect::<Vec<_>>());
            prop_assert!(cycle
                .slots
                .iter()
                .all(|s| (s.kind == SlotKind::Work) == s.work_sequence_number.is_some()));

            let long = cycle.slots.iter().filter(|s| s.kind == SlotKind::LongBreak).count() as u32;
            let breaks = cycle.slots.iter().filter(|s| s.kind.is_break()).count() as u32;
            prop_assert_eq!(breaks, sessions - 1);
            prop_assert!(long <= frequency.min(sessions - 1));
            prop_assert!(long <= breaks);

            let placed = cycle.slots.iter().filter(|s| s.kind == SlotKind::Surprise).count() as u32;
            prop_assert!(placed <= surprises);
            prop_assert_eq!(placed, cycle.surprise_slots_placed);

            prop_assert_eq!(cycle.current_index, 0);
            prop_assert_eq!(cycle.slots.iter().filter(|s| s.is_current).count(), 1);
            prop_assert!(cycle.is_consistent());
        }
    }
}
