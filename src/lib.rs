//! Vowel Drop - a falling-word phonics game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, motion, collisions, round state)
//! - `session`: Drives a round in real time and dispatches collaborator calls
//! - `persistence`: Document store, score book and progress records
//! - `audio`: Background music and tap sounds
//! - `settings`: Game tuning and audio preferences
//! - `platform`: Browser/native platform abstraction

pub mod audio;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::{Result, VowelDropError};
pub use highscores::HighScores;
pub use session::{Navigator, Screen, Session};
pub use settings::{GameConfig, Settings};

/// Game configuration constants
pub mod consts {
    /// Number of lanes words fall through
    pub const LANE_COUNT: u8 = 3;
    /// Lane the player starts each round in
    pub const START_LANE: u8 = 1;
    /// Round length in seconds
    pub const ROUND_SECONDS: u32 = 60;

    /// Spawn a new word every 900ms
    pub const SPAWN_INTERVAL_MS: u32 = 900;
    /// Advance falling words every 70ms
    pub const MOTION_INTERVAL_MS: u32 = 70;
    /// Round clock resolution
    pub const CLOCK_INTERVAL_MS: u32 = 1000;
    /// Resume countdown step (3-2-1)
    pub const COUNTDOWN_INTERVAL_MS: u32 = 1000;
    pub const COUNTDOWN_FROM: u8 = 3;

    /// Vertical distance a word falls per motion tick
    pub const FALL_STEP: f32 = 16.0;
    /// Height of the play field in layout units
    pub const FIELD_HEIGHT: f32 = 800.0;
    /// Words are pruned once they reach this height
    pub const VISIBLE_BOUND: f32 = FIELD_HEIGHT - 150.0;
    /// Collisions are evaluated below this height
    pub const TRIGGER_TOP: f32 = FIELD_HEIGHT - 250.0;

    /// Points gained for a correct catch (and lost for a wrong one)
    pub const CATCH_REWARD: u32 = 5;
    /// How long a caught word lingers before removal
    pub const HIT_LINGER_MS: u32 = 300;
    /// How long "+5" / "-5" feedback stays on screen
    pub const FEEDBACK_MS: u32 = 600;

    /// Wrong catches above this fraction of right catches earn a practice hint
    pub const PRACTICE_THRESHOLD: f32 = 0.5;

    /// Maximum wall-clock time a single frame may advance the simulation
    pub const MAX_FRAME_MS: f64 = 250.0;
}

/// Milliseconds since the Unix epoch, from the platform clock
pub fn now_ms() -> f64 {
    platform::now_ms()
}
