//! High score leaderboard system
//!
//! Persisted to LocalStorage (web) or a JSON file (native), tracks top 10
//! rounds.

use serde::{Deserialize, Serialize};

use crate::sim::RoundReport;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's score
    pub score: u32,
    /// Word list level played
    pub level: String,
    /// Target words caught
    pub correct: u32,
    /// Distractors caught
    pub incorrect: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "vowel_drop_highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Index a score would take; ties rank below earlier rounds
    fn slot_for(&self, score: u32) -> usize {
        self.entries.partition_point(|e| e.score >= score)
    }

    /// A round makes the board if it scored and lands inside the top ten
    pub fn qualifies(&self, score: u32) -> bool {
        score > 0 && self.slot_for(score) < MAX_HIGH_SCORES
    }

    /// Record a finished round; returns its 1-based rank if it made the board
    pub fn add(&mut self, report: &RoundReport, timestamp: f64) -> Option<usize> {
        if !self.qualifies(report.score) {
            return None;
        }
        let slot = self.slot_for(report.score);
        self.entries.insert(
            slot,
            HighScoreEntry {
                score: report.score,
                level: report.level.clone(),
                correct: report.correct_catches,
                incorrect: report.incorrect_catches,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(slot + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Best round on the board for one word list
    pub fn best_for_level(&self, level: &str) -> Option<&HighScoreEntry> {
        self.entries.iter().find(|e| e.level == level)
    }

    /// Load high scores from LocalStorage
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        if let Some(json) = crate::platform::web::storage_get(Self::STORAGE_KEY) {
            match serde_json::from_str::<HighScores>(&json) {
                Ok(scores) => {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    return scores;
                }
                Err(e) => log::warn!("Discarding unreadable high scores: {e}"),
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) -> crate::Result<()> {
        let json = serde_json::to_string(self)?;
        crate::platform::web::storage_set(Self::STORAGE_KEY, &json)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }

    /// Load high scores from a JSON file, empty if the file doesn't exist
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let scores: HighScores = serde_json::from_str(&json)?;
                log::info!("Loaded {} high scores", scores.entries.len());
                Ok(scores)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No high scores found, starting fresh");
                Ok(Self::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> crate::Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}
