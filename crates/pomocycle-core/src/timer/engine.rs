//! Timer engine implementation.
//!
//! The timer engine is a tick-driven state machine. It does not use internal
//! threads or read the clock: the owner delivers one `tick()` per elapsed
//! second (see [`crate::worker`]).
//!
//! ## State Transitions
//!
//! ```text
//! Ready --start--> Running --pause--> Paused --start--> Running
//! Running --tick(0)--> Finished --next--> Ready
//! Ready | Paused --skip--> Ready
//! any --reset--> Ready
//! ```
//!
//! Commands that do not apply to the current phase are ignored and return
//! `None`; nothing here ever fails.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(CycleSettings::default());
//! engine.start();
//! // Once per second:
//! if let Some(Event::SessionCompleted { alert, .. }) = engine.tick() { /* notify */ }
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use super::builder::CycleBuilder;
use super::cycle::Cycle;
use super::slot::SessionSlot;
use crate::events::{Alert, Event};
use crate::settings::{CycleSettings, SettingsUpdate};
use crate::storage::PersistedSnapshot;
use crate::view::{format_time, TimerView, LIST_LIMIT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Ready,
    Running,
    Paused,
    Finished,
}

impl fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimerPhase::Ready => "ready",
            TimerPhase::Running => "running",
            TimerPhase::Paused => "paused",
            TimerPhase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// User command accepted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Start,
    Pause,
    Reset,
    Skip,
    Next,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Command::Start),
            "pause" => Ok(Command::Pause),
            "reset" => Ok(Command::Reset),
            "skip" => Ok(Command::Skip),
            "next" => Ok(Command::Next),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

/// Core timer engine. Owns the active cycle exclusively.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    settings: CycleSettings,
    cycle: Option<Cycle>,
    phase: TimerPhase,
    seconds_remaining: u64,
    rng: Mcg128Xsl64,
}

impl TimerEngine {
    /// Create an engine with a freshly built cycle, seeded from OS entropy.
    pub fn new(settings: CycleSettings) -> Self {
        Self::with_rng(settings, Mcg128Xsl64::from_entropy())
    }

    /// Create an engine whose surprise placement is reproducible.
    pub fn with_seed(settings: CycleSettings, seed: u64) -> Self {
        Self::with_rng(settings, Mcg128Xsl64::seed_from_u64(seed))
    }

    pub fn with_rng(settings: CycleSettings, rng: Mcg128Xsl64) -> Self {
        let mut engine = Self {
            settings,
            cycle: None,
            phase: TimerPhase::Ready,
            seconds_remaining: 0,
            rng,
        };
        engine.install_new_cycle();
        engine.seconds_remaining = engine.current_duration();
        engine
    }

    /// Rebuild an engine from a loaded snapshot.
    ///
    /// A cycle that fails its consistency checks is dropped; the engine then
    /// ignores commands until [`ensure_cycle`](Self::ensure_cycle) runs.
    pub fn restore(snapshot: PersistedSnapshot) -> Self {
        Self::restore_with_rng(snapshot, Mcg128Xsl64::from_entropy())
    }

    pub fn restore_with_rng(snapshot: PersistedSnapshot, rng: Mcg128Xsl64) -> Self {
        let PersistedSnapshot {
            configuration,
            cycle,
            timer_phase,
            seconds_remaining,
            ..
        } = snapshot;

        let cycle = if cycle.is_consistent() {
            Some(cycle)
        } else {
            tracing::warn!(
                slots = cycle.len(),
                current_index = cycle.current_index,
                "restored cycle is inconsistent, discarding it"
            );
            None
        };

        let (phase, seconds_remaining) = match (&cycle, timer_phase) {
            (None, _) => (TimerPhase::Ready, 0),
            (Some(_), TimerPhase::Running) => (TimerPhase::Paused, seconds_remaining),
            (Some(_), TimerPhase::Finished) => (TimerPhase::Finished, 0),
            (Some(_), phase) => (phase, seconds_remaining),
        };

        Self {
            settings: configuration.sanitized(),
            cycle,
            phase,
            seconds_remaining,
            rng,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn seconds_remaining(&self) -> u64 {
        self.seconds_remaining
    }

    pub fn settings(&self) -> &CycleSettings {
        &self.settings
    }

    pub fn cycle(&self) -> Option<&Cycle> {
        self.cycle.as_ref()
    }

    pub fn current_slot(&self) -> Option<&SessionSlot> {
        self.cycle.as_ref()?.current_slot()
    }

    fn current_duration(&self) -> u64 {
        self.current_slot().map(|s| s.duration_seconds).unwrap_or(0)
    }

    /// Build the combined on-disk snapshot. `None` while no cycle exists.
    pub fn snapshot(&self) -> Option<PersistedSnapshot> {
        Some(PersistedSnapshot {
            configuration: self.settings,
            cycle: self.cycle.clone()?,
            timer_phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            last_saved: Utc::now(),
        })
    }

    pub fn view(&self) -> TimerView {
        let mut view = TimerView {
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            display: format_time(self.seconds_remaining),
            current: self.current_slot().cloned(),
            current_index: 0,
            slot_count: 0,
            recent_completed: Vec::new(),
            upcoming: Vec::new(),
            work_completed: 0,
            work_total: 0,
            is_last_slot: false,
        };

        if let Some(cycle) = &self.cycle {
            let completed = cycle.completed_slots();
            let skip = completed.len().saturating_sub(LIST_LIMIT);
            view.current_index = cycle.current_index;
            view.slot_count = cycle.len();
            view.recent_completed = completed.into_iter().skip(skip).cloned().collect();
            view.upcoming = cycle
                .upcoming_slots()
                .into_iter()
                .take(LIST_LIMIT)
                .cloned()
                .collect();
            view.work_completed = cycle.completed_work_slots();
            view.work_total = cycle.total_work_slots;
            view.is_last_slot = cycle.is_last();
        }
        view
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Dispatch a user command. Returns `None` when it does not apply.
    pub fn handle(&mut self, command: Command) -> Option<Event> {
        let event = match command {
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::Reset => self.reset(),
            Command::Skip => self.skip(),
            Command::Next => self.next(),
        };
        if event.is_none() {
            tracing::debug!(?command, phase = %self.phase, "command ignored");
        }
        event
    }

    pub fn start(&mut self) -> Option<Event> {
        let slot = self.current_slot()?;
        let kind = slot.kind;
        let duration = slot.duration_seconds;
        let slot_index = self.cycle.as_ref()?.current_index;

        match self.phase {
            TimerPhase::Ready => {
                if self.seconds_remaining == 0 {
                    self.seconds_remaining = duration;
                }
                self.phase = TimerPhase::Running;
                Some(Event::TimerStarted {
                    slot_index,
                    kind,
                    seconds_remaining: self.seconds_remaining,
                    at: Utc::now(),
                })
            }
            TimerPhase::Paused => {
                self.phase = TimerPhase::Running;
                Some(Event::TimerResumed {
                    seconds_remaining: self.seconds_remaining,
                    at: Utc::now(),
                })
            }
            // Finished needs an explicit `next`.
            TimerPhase::Running | TimerPhase::Finished => None,
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.cycle.as_ref()?;
        match self.phase {
            TimerPhase::Running => {
                self.phase = TimerPhase::Paused;
                Some(Event::TimerPaused {
                    seconds_remaining: self.seconds_remaining,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Restart the current slot from its full duration.
    pub fn reset(&mut self) -> Option<Event> {
        let slot_index = self.cycle.as_ref()?.current_index;
        let duration = self.current_slot()?.duration_seconds;
        self.phase = TimerPhase::Ready;
        self.seconds_remaining = duration;
        Some(Event::TimerReset {
            slot_index,
            seconds_remaining: duration,
            at: Utc::now(),
        })
    }

    /// Leave the current slot without completing it.
    pub fn skip(&mut self) -> Option<Event> {
        match self.phase {
            TimerPhase::Ready | TimerPhase::Paused => self.move_on(false),
            _ => None,
        }
    }

    /// Leave a finished slot, counting it as completed.
    pub fn next(&mut self) -> Option<Event> {
        match self.phase {
            TimerPhase::Finished => self.move_on(true),
            _ => None,
        }
    }

    /// Call once per elapsed second.
    ///
    /// Returns `Some(Event::SessionCompleted)` exactly once, on the tick that
    /// reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        if self.phase != TimerPhase::Running {
            return None;
        }
        self.cycle.as_ref()?;

        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining > 0 {
            return Some(Event::TimerTicked {
                seconds_remaining: self.seconds_remaining,
            });
        }

        self.phase = TimerPhase::Finished;
        let cycle = self.cycle.as_ref()?;
        let slot = cycle.current_slot()?;
        let alert = completion_alert(cycle);
        tracing::info!(slot = %slot.label(), "session completed");
        Some(Event::SessionCompleted {
            slot_index: cycle.current_index,
            kind: slot.kind,
            alert,
            at: Utc::now(),
        })
    }

    /// Replace the settings and rebuild the cycle straight away.
    pub fn update_settings(&mut self, update: &SettingsUpdate) -> Event {
        let rejected = self.settings.apply(update);
        self.install_new_cycle();

        match self.phase {
            TimerPhase::Ready => self.seconds_remaining = self.current_duration(),
            // The finished slot no longer exists in the new cycle.
            TimerPhase::Finished => {
                self.phase = TimerPhase::Ready;
                self.seconds_remaining = self.current_duration();
            }
            TimerPhase::Running | TimerPhase::Paused => {}
        }

        Event::SettingsApplied {
            settings: self.settings,
            rejected: rejected.iter().map(ToString::to_string).collect(),
            at: Utc::now(),
        }
    }

    /// Build a cycle if none is active, leaving the timer Ready on its first
    /// slot. Returns `None` when a cycle was already present.
    pub fn ensure_cycle(&mut self) -> Option<Event> {
        if self.cycle.is_some() {
            return None;
        }
        let event = self.install_new_cycle();
        self.phase = TimerPhase::Ready;
        self.seconds_remaining = self.current_duration();
        Some(event)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn move_on(&mut self, completed: bool) -> Option<Event> {
        let cycle = self.cycle.as_mut()?;
        let from_index = cycle.current_index;
        let event = if cycle.advance(completed) {
            Event::SlotAdvanced {
                from_index,
                to_index: cycle.current_index,
                completed,
                at: Utc::now(),
            }
        } else {
            tracing::info!("cycle exhausted, starting a new one");
            self.install_new_cycle()
        };
        self.phase = TimerPhase::Ready;
        self.seconds_remaining = self.current_duration();
        Some(event)
    }

    fn install_new_cycle(&mut self) -> Event {
        let cycle = CycleBuilder::new(&self.settings).build(&mut self.rng);
        let event = Event::CycleRebuilt {
            slot_count: cycle.len(),
            surprise_slots: cycle.surprise_slots_placed,
            at: Utc::now(),
        };
        self.cycle = Some(cycle);
        event
    }
}

fn completion_alert(cycle: &Cycle) -> Alert {
    let finished = cycle
        .current_slot()
        .map(SessionSlot::label)
        .unwrap_or_default();
    match cycle.slots.get(cycle.current_index + 1) {
        Some(next) => Alert {
            title: format!("{finished} complete!"),
            message: format!("Up next: {} ({})", next.label(), next.duration_label()),
        },
        None => Alert {
            title: "Cycle complete!".to_string(),
            message: format!(
                "All {} work sessions are done. Next starts a new cycle.",
                cycle.total_work_slots
            ),
        },
    }
}
