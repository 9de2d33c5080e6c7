//! Integration tests for a full pass through a cycle, across a restart.

use pomocycle_core::storage::SNAPSHOT_FILE;
use pomocycle_core::{
    Command, CycleSettings, SlotKind, SnapshotStore, TimerEngine, TimerPhase,
};
use tempfile::TempDir;

fn settings() -> CycleSettings {
    CycleSettings {
        session_count: 4,
        work_minutes: 1,
        short_break_minutes: 1,
        long_break_minutes: 2,
        long_break_frequency: 1,
        max_surprises: 2,
        surprise_minutes: 1,
    }
}

/// Run the current slot to completion and move on.
fn finish_current(engine: &mut TimerEngine) {
    engine.handle(Command::Start);
    while engine.phase() == TimerPhase::Running {
        engine.tick();
    }
    assert_eq!(engine.phase(), TimerPhase::Finished);
    engine.handle(Command::Next);
}

#[test]
fn test_full_cycle_then_rebuild() {
    let mut engine = TimerEngine::with_seed(settings(), 42);
    let slot_count = engine.cycle().unwrap().len();

    let kinds: Vec<SlotKind> = engine.cycle().unwrap().slots.iter().map(|s| s.kind).collect();
    assert_eq!(kinds.iter().filter(|k| **k == SlotKind::LongBreak).count(), 1);

    for _ in 0..slot_count - 1 {
        finish_current(&mut engine);
    }
    let cycle = engine.cycle().unwrap();
    assert!(cycle.is_last());
    assert_eq!(cycle.completed_slots().len(), slot_count - 1);

    // Finishing the last slot rolls over into a fresh cycle.
    finish_current(&mut engine);
    let cycle = engine.cycle().unwrap();
    assert_eq!(cycle.current_index, 0);
    assert!(cycle.completed_slots().is_empty());
    assert_eq!(engine.phase(), TimerPhase::Ready);
    assert_eq!(engine.seconds_remaining(), 60);
}

#[test]
fn test_restart_mid_countdown_resumes_paused() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::at(dir.path().join(SNAPSHOT_FILE));

    let mut engine = TimerEngine::with_seed(settings(), 9);
    finish_current(&mut engine);
    engine.handle(Command::Skip);
    engine.handle(Command::Start);
    for _ in 0..10 {
        engine.tick();
    }
    assert_eq!(engine.phase(), TimerPhase::Running);
    store.save(&engine.snapshot().unwrap()).unwrap();

    let snapshot = store.load().unwrap();
    let mut restored = TimerEngine::restore(snapshot);
    assert_eq!(restored.phase(), TimerPhase::Paused);
    assert_eq!(restored.seconds_remaining(), engine.seconds_remaining());

    let before = engine.cycle().unwrap();
    let after = restored.cycle().unwrap();
    assert_eq!(after.current_index, before.current_index);
    assert_eq!(after.slots, before.slots);
    assert!(after.slots[0].completed);
    assert!(!after.slots[1].completed);

    // Ticks do nothing until the user resumes.
    assert!(restored.tick().is_none());
    restored.handle(Command::Start);
    restored.tick();
    assert_eq!(restored.seconds_remaining(), engine.seconds_remaining() - 1);
}

#[test]
fn test_settings_survive_restart() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::at(dir.path().join(SNAPSHOT_FILE));

    let mut engine = TimerEngine::with_seed(settings(), 5);
    let update = pomocycle_core::SettingsUpdate::from(engine.settings())
        .with_field("sessionCount", "7")
        .unwrap();
    engine.update_settings(&update);
    store.save(&engine.snapshot().unwrap()).unwrap();

    let restored = TimerEngine::restore(store.load().unwrap());
    assert_eq!(restored.settings().session_count, 7);
    assert_eq!(restored.cycle().unwrap().total_work_slots, 7);
}

#[test]
fn test_unusable_snapshot_falls_back_to_fresh_cycle() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::at(dir.path().join(SNAPSHOT_FILE));

    let mut snapshot = TimerEngine::with_seed(settings(), 5).snapshot().unwrap();
    snapshot.cycle.slots.clear();
    store.save(&snapshot).unwrap();

    let mut engine = TimerEngine::restore(store.load().unwrap());
    assert!(engine.handle(Command::Start).is_none());
    assert!(engine.ensure_cycle().is_some());
    assert_eq!(engine.cycle().unwrap().total_work_slots, 4);
    assert!(engine.handle(Command::Start).is_some());
}
