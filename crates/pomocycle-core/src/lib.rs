//! # Pomocycle Core Library
//!
//! This library provides the core logic for the Pomocycle Pomodoro timer.
//! Front ends (the `pomocycle` CLI, or any GUI) stay thin: they feed
//! commands in and render whatever state the core pushes out.
//!
//! ## Architecture
//!
//! - **Cycle Builder**: expands [`CycleSettings`] into an ordered list of
//!   work, break and surprise slots
//! - **Timer Engine**: a tick-driven state machine that owns the active
//!   cycle and moves its cursor
//! - **Worker**: a single task that applies commands and clock ticks in
//!   arrival order and autosaves
//! - **Storage**: JSON session snapshot and TOML application configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`CycleBuilder`]: Slot list generation
//! - [`Worker`]: Event loop around the engine
//! - [`SnapshotStore`]: Session persistence
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod settings;
pub mod storage;
pub mod timer;
pub mod view;
pub mod worker;

pub use error::{ConfigError, CoreError, StorageError};
pub use events::{Alert, Event};
pub use settings::{CycleSettings, SettingsUpdate};
pub use storage::{Config, PersistedSnapshot, SnapshotStore};
pub use timer::{Command, Cycle, CycleBuilder, SessionSlot, SlotKind, TimerEngine, TimerPhase};
pub use view::{format_time, TimerView};
pub use worker::{spawn_tick_source, Frontend, Worker, WorkerEvent, WorkerHandle, WorkerSender};
