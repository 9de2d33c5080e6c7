//! Single owner of the timer engine.
//!
//! User commands, clock ticks and settings updates all arrive as
//! [`WorkerEvent`]s on one ordered queue and are applied one at a time, so a
//! `pause` that lands between two ticks always takes effect before the next
//! tick is evaluated. After each change the worker pushes a fresh
//! [`TimerView`] to the [`Frontend`]; the front end never touches the engine.
//!
//! Shutdown arrives on a separate channel that is polled first. It triggers
//! a final save and ends the loop without draining the queue.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::events::{Alert, Event};
use crate::settings::SettingsUpdate;
use crate::storage::SnapshotStore;
use crate::timer::{Command, TimerEngine, TimerPhase};
use crate::view::TimerView;

/// Period of the countdown clock.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Command(Command),
    Tick,
    UpdateSettings(SettingsUpdate),
    /// In-order shutdown, processed after everything queued before it.
    Shutdown,
}

/// Receives state pushed by the worker. Implementations must not block.
pub trait Frontend: Send {
    fn render(&mut self, view: &TimerView);

    /// Called once per completed slot, before the matching `render`.
    fn alert(&mut self, alert: &Alert);
}

/// Cloneable sending side of the worker queue.
#[derive(Debug, Clone)]
pub struct WorkerSender {
    tx: mpsc::UnboundedSender<WorkerEvent>,
}

impl WorkerSender {
    /// Queue an event. Returns `false` once the worker has stopped.
    pub fn send(&self, event: WorkerEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn command(&self, command: Command) -> bool {
        self.send(WorkerEvent::Command(command))
    }

    pub fn update_settings(&self, update: SettingsUpdate) -> bool {
        self.send(WorkerEvent::UpdateSettings(update))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Handle returned by [`Worker::new`]: the queue plus the priority shutdown.
#[derive(Debug)]
pub struct WorkerHandle {
    sender: WorkerSender,
    shutdown: Option<oneshot::Sender<()>>,
}

impl WorkerHandle {
    pub fn sender(&self) -> WorkerSender {
        self.sender.clone()
    }

    /// Stop the worker ahead of anything still queued.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub struct Worker<F: Frontend> {
    engine: TimerEngine,
    store: Option<SnapshotStore>,
    frontend: F,
    events: mpsc::UnboundedReceiver<WorkerEvent>,
    shutdown: oneshot::Receiver<()>,
    autosave_every: Duration,
    pending_save: Option<JoinHandle<()>>,
}

impl<F: Frontend> Worker<F> {
    /// Create a worker and the handle that feeds it.
    ///
    /// Without a `store` nothing is persisted.
    pub fn new(
        engine: TimerEngine,
        store: Option<SnapshotStore>,
        frontend: F,
        autosave_every: Duration,
    ) -> (Self, WorkerHandle) {
        let (tx, events) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown) = oneshot::channel();
        let worker = Self {
            engine,
            store,
            frontend,
            events,
            shutdown,
            autosave_every,
            pending_save: None,
        };
        let handle = WorkerHandle {
            sender: WorkerSender { tx },
            shutdown: Some(shutdown_tx),
        };
        (worker, handle)
    }

    /// Run until shutdown or until every sender is gone.
    ///
    /// Returns the engine in its final state, after the final save.
    pub async fn run(mut self) -> TimerEngine {
        if let Some(event) = self.engine.ensure_cycle() {
            tracing::info!(?event, "no usable cycle, built a new one");
        }
        self.frontend.render(&self.engine.view());

        let mut autosave = interval_at(Instant::now() + self.autosave_every, self.autosave_every);
        autosave.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Set once the handle is dropped without signalling.
        let mut shutdown_closed = false;
        loop {
            tokio::select! {
                biased;

                signal = &mut self.shutdown, if !shutdown_closed => {
                    if signal.is_ok() {
                        tracing::debug!("shutdown signal received");
                        break;
                    }
                    shutdown_closed = true;
                }
                maybe = self.events.recv() => {
                    match maybe {
                        Some(WorkerEvent::Shutdown) | None => break,
                        Some(event) => self.apply(event),
                    }
                }
                _ = autosave.tick() => self.autosave(),
            }
        }

        self.finish().await;
        self.engine
    }

    fn apply(&mut self, event: WorkerEvent) {
        let outcome = match event {
            WorkerEvent::Command(command) => self.engine.handle(command),
            WorkerEvent::Tick => self.engine.tick(),
            WorkerEvent::UpdateSettings(update) => Some(self.engine.update_settings(&update)),
            WorkerEvent::Shutdown => None,
        };

        let Some(event) = outcome else {
            return;
        };
        if let Some(alert) = event.alert() {
            self.frontend.alert(alert);
        }
        if matches!(event, Event::SettingsApplied { .. }) {
            // Settings are not otherwise persisted until the next autosave.
            self.spawn_save();
        }
        self.frontend.render(&self.engine.view());
    }

    fn autosave(&mut self) {
        if matches!(self.engine.phase(), TimerPhase::Running | TimerPhase::Paused) {
            self.spawn_save();
        }
    }

    fn spawn_save(&mut self) {
        let Some(store) = self.store.clone() else {
            return;
        };
        if self.pending_save.as_ref().is_some_and(|h| !h.is_finished()) {
            tracing::debug!("previous save still running, skipping");
            return;
        }
        let Some(snapshot) = self.engine.snapshot() else {
            return;
        };
        self.pending_save = Some(tokio::task::spawn_blocking(move || {
            if let Err(e) = store.save(&snapshot) {
                tracing::warn!("autosave failed: {e}");
            }
        }));
    }

    async fn finish(&mut self) {
        if let Some(pending) = self.pending_save.take() {
            let _ = pending.await;
        }
        let (Some(store), Some(snapshot)) = (&self.store, self.engine.snapshot()) else {
            return;
        };
        match store.save(&snapshot) {
            Ok(()) => tracing::info!(path = %store.path().display(), "state saved on shutdown"),
            Err(e) => tracing::warn!("final save failed: {e}"),
        }
    }
}

/// Spawn the periodic clock that feeds [`WorkerEvent::Tick`] into the queue.
///
/// The first tick fires one `period` after the call. The task ends when the
/// worker stops.
pub fn spawn_tick_source(sender: WorkerSender, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut clock = interval_at(Instant::now() + period, period);
        clock.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            clock.tick().await;
            if !sender.send(WorkerEvent::Tick) {
                break;
            }
        }
    })
}
