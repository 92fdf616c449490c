//! Game settings and preferences
//!
//! Persisted as JSON: a file on native, LocalStorage on web.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tuning for a round. Every timing value is in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub lane_count: u8,
    pub start_lane: u8,
    pub round_seconds: u32,

    pub spawn_interval_ms: u32,
    pub motion_interval_ms: u32,
    pub clock_interval_ms: u32,
    pub countdown_interval_ms: u32,
    pub countdown_from: u8,

    pub fall_step: f32,
    /// Words at or beyond this height are pruned
    pub visible_bound: f32,
    /// Words strictly below this height (larger y) can be caught
    pub trigger_top: f32,

    pub reward: u32,
    pub hit_linger_ms: u32,
    pub feedback_ms: u32,

    /// `incorrect > correct * practice_threshold` earns a practice hint
    pub practice_threshold: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            lane_count: LANE_COUNT,
            start_lane: START_LANE,
            round_seconds: ROUND_SECONDS,

            spawn_interval_ms: SPAWN_INTERVAL_MS,
            motion_interval_ms: MOTION_INTERVAL_MS,
            clock_interval_ms: CLOCK_INTERVAL_MS,
            countdown_interval_ms: COUNTDOWN_INTERVAL_MS,
            countdown_from: COUNTDOWN_FROM,

            fall_step: FALL_STEP,
            visible_bound: VISIBLE_BOUND,
            trigger_top: TRIGGER_TOP,

            reward: CATCH_REWARD,
            hit_linger_ms: HIT_LINGER_MS,
            feedback_ms: FEEDBACK_MS,

            practice_threshold: PRACTICE_THRESHOLD,
        }
    }
}

impl GameConfig {
    /// Clamp values that would break round invariants (empty lane range,
    /// zero-length timers, a trigger band outside the visible area).
    pub fn sanitized(mut self) -> Self {
        if self.lane_count == 0 {
            log::warn!("lane_count must be at least 1, using 1");
            self.lane_count = 1;
        }
        if self.start_lane >= self.lane_count {
            log::warn!(
                "start_lane {} out of range, clamping to {}",
                self.start_lane,
                self.lane_count - 1
            );
            self.start_lane = self.lane_count - 1;
        }
        for (name, value) in [
            ("spawn_interval_ms", &mut self.spawn_interval_ms),
            ("motion_interval_ms", &mut self.motion_interval_ms),
            ("clock_interval_ms", &mut self.clock_interval_ms),
            ("countdown_interval_ms", &mut self.countdown_interval_ms),
        ] {
            if *value == 0 {
                log::warn!("{name} must be positive, using 1");
                *value = 1;
            }
        }
        if self.round_seconds == 0 {
            log::warn!("round_seconds must be positive, using {ROUND_SECONDS}");
            self.round_seconds = ROUND_SECONDS;
        }
        if !(self.trigger_top < self.visible_bound) {
            log::warn!(
                "trigger_top {} is not above visible_bound {}, using defaults",
                self.trigger_top,
                self.visible_bound
            );
            self.trigger_top = TRIGGER_TOP;
            self.visible_bound = VISIBLE_BOUND;
        }
        if !(self.fall_step.is_finite() && self.fall_step > 0.0) {
            log::warn!("fall_step {} must be positive, using {FALL_STEP}", self.fall_step);
            self.fall_step = FALL_STEP;
        }
        if !self.practice_threshold.is_finite() || self.practice_threshold < 0.0 {
            log::warn!(
                "practice_threshold {} is invalid, using {PRACTICE_THRESHOLD}",
                self.practice_threshold
            );
            self.practice_threshold = PRACTICE_THRESHOLD;
        }
        self
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Round tuning
    pub game: GameConfig,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Tap sound volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Background music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Mute everything
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),

            master_volume: 1.0,
            sfx_volume: 0.6,
            music_volume: 0.4,
            muted: false,
        }
    }
}

impl Settings {
    /// Environment variable naming a settings file (native only)
    pub const PATH_ENV: &'static str = "VOWEL_DROP_SETTINGS";

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "vowel_drop_settings";

    /// Parse settings from JSON, sanitizing the game config
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.game = settings.game.sanitized();
        Ok(settings)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = crate::platform::web::storage_get(Self::STORAGE_KEY);
        match json.map(|json| Self::from_json(&json)) {
            Some(Ok(settings)) => {
                log::info!("Loaded settings from LocalStorage");
                settings
            }
            Some(Err(e)) => {
                log::warn!("Ignoring unreadable settings: {e}");
                Self::default()
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) -> crate::Result<()> {
        let json = serde_json::to_string(self)?;
        crate::platform::web::storage_set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Load settings from the file named by `VOWEL_DROP_SETTINGS`, falling
    /// back to defaults when unset or unreadable
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::PATH_ENV) else {
            log::info!("Using default settings");
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {path}");
                settings
            }
            Err(e) => {
                log::warn!("Could not load settings from {path}: {e}");
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: impl AsRef<std::path::Path>) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
