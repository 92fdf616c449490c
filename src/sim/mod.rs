//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Virtual time in whole milliseconds, advanced only through `tick`/`advance`
//! - Seeded RNG only
//! - Stable iteration order (words oldest first, timers by deadline)
//! - No rendering, audio or platform dependencies

pub mod autopilot;
pub mod catalog;
pub mod clock;
pub mod collision;
pub mod motion;
pub mod schedule;
pub mod spawn;
pub mod state;
pub mod tick;

pub use autopilot::choose_move;
pub use catalog::{WordCatalog, WordDefinition};
pub use collision::{Catch, detect_catches, in_trigger_band};
pub use schedule::{Schedule, TimerKind, TimerToken};
pub use spawn::{SpawnOutcome, spawn_word};
pub use state::{
    FallingWord, FeedbackColor, FloatingFeedback, GamePhase, GameState, Outcome, RoundReport,
    RoundSnapshot, RoundState,
};
pub use tick::{Command, GameEvent, TickInput, advance, handle_command, tick};
