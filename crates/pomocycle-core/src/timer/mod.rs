mod builder;
mod cycle;
mod engine;
mod slot;

pub use builder::{CycleBuilder, SURPRISE_CHANCE};
pub use cycle::Cycle;
pub use engine::{Command, TimerEngine, TimerPhase};
pub use slot::{SessionSlot, SlotKind};
