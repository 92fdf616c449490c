//! Score and progress records
//!
//! Three collections:
//! - `obstacle_game`: one document per finished round, signed in or not
//! - `scores`: per-player module/level results
//! - `userProgress`: one document per player, keyed by module then level

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ResultReporter;
use super::document::{Document, from_document, to_document};
use super::store::DocumentStore;
use crate::sim::RoundReport;

pub const GAME_NAME: &str = "Word Obstacle Game";
pub const ROUNDS_COLLECTION: &str = "obstacle_game";
pub const SCORES_COLLECTION: &str = "scores";
pub const PROGRESS_COLLECTION: &str = "userProgress";

/// Signed-in player identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Player {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            display_name: None,
        }
    }
}

/// A finished round in `obstacle_game`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    #[serde(flatten)]
    pub player: Option<Player>,
    pub game_name: String,
    pub level: String,
    pub score: u32,
    pub timestamp: f64,
}

/// A module/level result in `scores`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    #[serde(skip)]
    pub id: String,
    pub user_id: String,
    pub game_name: String,
    pub module: String,
    pub level: String,
    pub score: u32,
    pub total_questions: u32,
    pub timestamp: f64,
}

/// Progress written by [`ScoreBook::store_game_score`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub last_score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub completed: bool,
    pub last_played: f64,
}

impl ProgressUpdate {
    pub fn new(score: u32, total_questions: u32, now: f64) -> Self {
        Self {
            last_score: score,
            total_questions,
            percentage: percentage(score, total_questions),
            completed: score == total_questions,
            last_played: now,
        }
    }
}

/// Aggregate over a player's `scores`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_games: usize,
    pub total_correct: u64,
    pub total_questions: u64,
    pub overall_percentage: u32,
    pub modules_played: Vec<String>,
    pub last_played: Option<f64>,
}

/// Rounded share of `part` in `whole`, 0 when `whole` is 0
pub fn percentage(part: impl Into<u64>, whole: impl Into<u64>) -> u32 {
    let (part, whole) = (part.into(), whole.into());
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

/// Score bookkeeping over any [`DocumentStore`]
pub struct ScoreBook<S> {
    store: S,
    player: Option<Player>,
    clock: fn() -> f64,
}

impl<S: DocumentStore> ScoreBook<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            player: None,
            clock: crate::now_ms,
        }
    }

    /// Replace the timestamp source
    pub fn with_clock(mut self, clock: fn() -> f64) -> Self {
        self.clock = clock;
        self
    }

    pub fn sign_in(&mut self, player: Player) {
        log::info!("Signed in as {}", player.user_id);
        self.player = Some(player);
    }

    pub fn sign_out(&mut self) {
        self.player = None;
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record a finished round. Works without a player; identity fields are
    /// included when someone is signed in.
    pub fn save_score(&mut self, score: u32, level: &str) -> crate::Result<String> {
        let record = RoundRecord {
            player: self.player.clone(),
            game_name: GAME_NAME.to_string(),
            level: level.to_string(),
            score,
            timestamp: (self.clock)(),
        };
        log::debug!("Saving score: {record:?}");
        let id = self.store.add(ROUNDS_COLLECTION, to_document(&record)?)?;
        log::info!("Score {score} saved for level {level}");
        Ok(id)
    }

    /// Merge `update` into `userProgress/<uid>` under `module.level`.
    /// Returns `false` when nobody is signed in.
    pub fn log_user_progress(
        &mut self,
        module: &str,
        level: &str,
        update: Document,
    ) -> crate::Result<bool> {
        let Some(player) = &self.player else {
            log::warn!("No user is logged in - progress not saved");
            return Ok(false);
        };
        let now = (self.clock)();

        let mut entry = Document::new();
        entry.insert("gameName".into(), GAME_NAME.into());
        entry.insert("level".into(), level.into());
        entry.extend(update);
        entry.insert("timestamp".into(), now.into());

        let mut levels = Document::new();
        levels.insert(level.to_string(), Value::Object(entry));

        let mut doc = Document::new();
        doc.insert(module.to_string(), Value::Object(levels));
        doc.insert("userId".into(), player.user_id.clone().into());
        doc.insert("lastUpdated".into(), now.into());

        let uid = player.user_id.clone();
        self.store.set_merge(PROGRESS_COLLECTION, &uid, doc)?;
        log::info!("Progress logged for {uid}: {module}/{level}");
        Ok(true)
    }

    /// Add a result to `scores` and update progress. Returns `false` when
    /// nobody is signed in.
    pub fn store_game_score(
        &mut self,
        module: &str,
        level: &str,
        score: u32,
        total_questions: u32,
    ) -> crate::Result<bool> {
        let Some(player) = &self.player else {
            log::warn!("No user is logged in - score not saved");
            return Ok(false);
        };
        let now = (self.clock)();
        let record = ScoreRecord {
            id: String::new(),
            user_id: player.user_id.clone(),
            game_name: GAME_NAME.to_string(),
            module: module.to_string(),
            level: level.to_string(),
            score,
            total_questions,
            timestamp: now,
        };
        self.store.add(SCORES_COLLECTION, to_document(&record)?)?;

        let update = to_document(&ProgressUpdate::new(score, total_questions, now))?;
        self.log_user_progress(module, level, update)
    }

    /// The signed-in player's progress, narrowed to a module and level when
    /// given
    pub fn user_progress(
        &self,
        module: Option<&str>,
        level: Option<&str>,
    ) -> crate::Result<Option<Value>> {
        let Some(player) = &self.player else {
            return Ok(None);
        };
        let Some(doc) = self.store.get(PROGRESS_COLLECTION, &player.user_id)? else {
            log::debug!("No progress data found");
            return Ok(None);
        };
        let data = Value::Object(doc);
        let narrowed = match (module, level) {
            (Some(m), Some(l)) => data.get(m).and_then(|v| v.get(l)).cloned(),
            (Some(m), None) => data.get(m).cloned(),
            _ => Some(data),
        };
        Ok(narrowed)
    }

    /// The signed-in player's results, newest first. Level only filters
    /// together with module.
    pub fn user_scores(
        &self,
        module: Option<&str>,
        level: Option<&str>,
        limit: usize,
    ) -> crate::Result<Vec<ScoreRecord>> {
        let mut scores = self.all_scores()?;
        scores.retain(|s| match (module, level) {
            (Some(m), Some(l)) => s.module == m && s.level == l,
            (Some(m), None) => s.module == m,
            _ => true,
        });
        scores.truncate(limit);
        Ok(scores)
    }

    pub fn user_stats(&self) -> crate::Result<Option<UserStats>> {
        if self.player.is_none() {
            return Ok(None);
        }
        let scores = self.all_scores()?;
        let total_correct: u64 = scores.iter().map(|s| u64::from(s.score)).sum();
        let total_questions: u64 = scores.iter().map(|s| u64::from(s.total_questions)).sum();
        let mut modules_played: Vec<String> = Vec::new();
        for s in &scores {
            if !modules_played.contains(&s.module) {
                modules_played.push(s.module.clone());
            }
        }
        Ok(Some(UserStats {
            total_games: scores.len(),
            total_correct,
            total_questions,
            overall_percentage: percentage(total_correct, total_questions),
            modules_played,
            last_played: scores.first().map(|s| s.timestamp),
        }))
    }

    fn all_scores(&self) -> crate::Result<Vec<ScoreRecord>> {
        let Some(player) = &self.player else {
            return Ok(Vec::new());
        };
        let mut scores = Vec::new();
        for (id, doc) in self.store.list(SCORES_COLLECTION)? {
            let mut record: ScoreRecord = from_document(doc)?;
            if record.user_id != player.user_id {
                continue;
            }
            record.id = id;
            scores.push(record);
        }
        scores.sort_by(|a, b| {
            b.timestamp
                .total_cmp(&a.timestamp)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(scores)
    }
}

impl<S: DocumentStore> ResultReporter for ScoreBook<S> {
    fn report(&mut self, report: &RoundReport) -> crate::Result<()> {
        self.save_score(report.score, &report.level).map(|_| ())
    }
}
