//! Round state and core simulation types

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::catalog::{WordCatalog, WordDefinition};
use super::schedule::{Schedule, TimerKind};
use crate::settings::GameConfig;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum GamePhase {
    /// Instructions screen, nothing running
    Instructions,
    /// Active gameplay
    Playing,
    /// Pause menu showing
    Paused,
    /// 3-2-1 before play resumes
    Countdown { remaining: u8 },
    /// Time ran out
    Over,
}

/// A word on its way down a lane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallingWord {
    pub id: u32,
    pub text: String,
    pub is_correct: bool,
    pub lane: u8,
    pub y: f32,
    /// Set once the word has been caught; a hit word never scores again
    pub hit: bool,
}

impl FallingWord {
    pub fn new(id: u32, word: &WordDefinition, lane: u8) -> Self {
        Self {
            id,
            text: word.text.clone(),
            is_correct: word.is_correct,
            lane,
            y: 0.0,
            hit: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackColor {
    Lime,
    Red,
}

impl FeedbackColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackColor::Lime => "lime",
            FeedbackColor::Red => "red",
        }
    }
}

/// "+5" / "-5" floating where a word was caught
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingFeedback {
    pub id: u32,
    pub text: String,
    pub color: FeedbackColor,
    pub lane: u8,
    pub y: f32,
}

/// Per-round scoring state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundState {
    pub score: u32,
    pub time_remaining: u32,
    pub player_lane: u8,
    pub correct_catches: u32,
    pub incorrect_catches: u32,
    /// Catalog indices already dropped in the current cycle
    pub used_word_indices: BTreeSet<usize>,
}

impl RoundState {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            score: 0,
            time_remaining: config.round_seconds,
            player_lane: config.start_lane,
            correct_catches: 0,
            incorrect_catches: 0,
            used_word_indices: BTreeSet::new(),
        }
    }
}

/// End-of-round verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Excellent,
    NeedsPractice,
}

impl Outcome {
    pub fn from_catches(correct: u32, incorrect: u32, threshold: f32) -> Self {
        if incorrect as f32 > correct as f32 * threshold {
            Outcome::NeedsPractice
        } else {
            Outcome::Excellent
        }
    }

    /// Player-facing end-of-round message
    pub fn message(&self, catalog: &WordCatalog) -> String {
        match self {
            Outcome::Excellent => {
                format!("Excellent! Great recognition of {}!", catalog.praise_topic())
            }
            Outcome::NeedsPractice => {
                format!("Needs more practice with {}!", catalog.practice_topic())
            }
        }
    }
}

/// What gets reported once a round finishes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    pub score: u32,
    pub level: String,
    pub correct_catches: u32,
    pub incorrect_catches: u32,
    pub outcome: Outcome,
}

/// Complete game state for one screen's worth of rounds
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub catalog: WordCatalog,
    /// Seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub round: RoundState,
    /// Falling words, oldest first
    pub words: Vec<FallingWord>,
    pub feedback: Vec<FloatingFeedback>,
    /// Outstanding timers
    pub schedule: Schedule,
    /// Guards the single report per completed round
    pub result_reported: bool,
    /// Virtual milliseconds simulated while not paused
    pub elapsed_ms: u64,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game state on the instructions screen
    pub fn new(config: GameConfig, catalog: WordCatalog, seed: u64) -> Self {
        let config = config.sanitized();
        if catalog.is_empty() {
            log::warn!("Catalog for level {} has no words", catalog.level);
        }
        Self {
            round: RoundState::new(&config),
            config,
            catalog,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Instructions,
            words: Vec::new(),
            feedback: Vec::new(),
            schedule: Schedule::new(),
            result_reported: false,
            elapsed_ms: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.phase, GamePhase::Paused | GamePhase::Countdown { .. })
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::Over
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Discard everything from the current round and cancel its timers
    pub fn reset_round(&mut self) {
        self.schedule.clear();
        self.round = RoundState::new(&self.config);
        self.words.clear();
        self.feedback.clear();
        self.result_reported = false;
        self.elapsed_ms = 0;
    }

    /// Arm the periodic activities that run while playing
    pub fn arm_play_timers(&mut self) {
        self.schedule.cancel_periodic();
        self.schedule
            .every(TimerKind::Motion, self.config.motion_interval_ms);
        self.schedule.every(TimerKind::Spawn, self.config.spawn_interval_ms);
        self.schedule.every(TimerKind::Clock, self.config.clock_interval_ms);
    }

    pub fn report(&self) -> RoundReport {
        RoundReport {
            score: self.round.score,
            level: self.catalog.level.clone(),
            correct_catches: self.round.correct_catches,
            incorrect_catches: self.round.incorrect_catches,
            outcome: Outcome::from_catches(
                self.round.correct_catches,
                self.round.incorrect_catches,
                self.config.practice_threshold,
            ),
        }
    }

    /// Serializable view for renderers and HUDs
    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            phase: self.phase,
            level: self.catalog.level.clone(),
            score: self.round.score,
            time_remaining: self.round.time_remaining,
            player_lane: self.round.player_lane,
            lane_count: self.config.lane_count,
            correct_catches: self.round.correct_catches,
            incorrect_catches: self.round.incorrect_catches,
            words: self.words.clone(),
            feedback: self.feedback.clone(),
            practice_message: self
                .is_over()
                .then(|| self.report().outcome.message(&self.catalog)),
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct RoundSnapshot {
    #[serde(flatten)]
    pub phase: GamePhase,
    pub level: String,
    pub score: u32,
    pub time_remaining: u32,
    pub player_lane: u8,
    pub lane_count: u8,
    pub correct_catches: u32,
    pub incorrect_catches: u32,
    pub words: Vec<FallingWord>,
    pub feedback: Vec<FloatingFeedback>,
    pub practice_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_threshold() {
        assert_eq!(Outcome::from_catches(4, 2, 0.5), Outcome::Excellent);
        assert_eq!(Outcome::from_catches(4, 3, 0.5), Outcome::NeedsPractice);
        assert_eq!(Outcome::from_catches(0, 0, 0.5), Outcome::Excellent);
        assert_eq!(Outcome::from_catches(4, 3, 1.0), Outcome::Excellent);
    }

    #[test]
    fn test_outcome_messages() {
        let catalog = WordCatalog::expert();
        assert_eq!(
            Outcome::Excellent.message(&catalog),
            "Excellent! Great recognition of long vowels!"
        );
        assert_eq!(
            Outcome::NeedsPractice.message(&catalog),
            "Needs more practice with LONG E, O, U vowels!"
        );
    }

    #[test]
    fn test_new_state_waits_on_instructions() {
        let state = GameState::new(GameConfig::default(), WordCatalog::expert(), 1);
        assert_eq!(state.phase, GamePhase::Instructions);
        assert_eq!(state.round.time_remaining, 60);
        assert_eq!(state.round.player_lane, 1);
        assert!(state.schedule.is_empty());
    }

    #[test]
    fn test_snapshot_serializes_phase_inline() {
        let mut state = GameState::new(GameConfig::default(), WordCatalog::expert(), 1);
        state.phase = GamePhase::Countdown { remaining: 2 };
        let json = serde_json::to_value(state.snapshot()).expect("serializable");
        assert_eq!(json["phase"], "countdown");
        assert_eq!(json["remaining"], 2);
        assert_eq!(json["practice_message"], serde_json::Value::Null);
    }
}
