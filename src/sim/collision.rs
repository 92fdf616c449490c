//! Catch detection and scoring
//!
//! The player occupies one lane at the bottom of the field. Any word in that
//! lane inside the trigger band gets caught: correct words add the reward,
//! distractors subtract it (never below zero). A caught word is flagged `hit`
//! so it can't score again, and lingers briefly so its feedback has somewhere
//! to appear before it is removed.

use super::schedule::TimerKind;
use super::state::{FeedbackColor, FloatingFeedback, GameState};

/// A word that was just caught
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Catch {
    pub word_id: u32,
    pub correct: bool,
    /// Signed score change as shown to the player (before flooring)
    pub delta: i32,
}

/// Whether a word at `y` is inside the trigger band
#[inline]
pub fn in_trigger_band(y: f32, trigger_top: f32, visible_bound: f32) -> bool {
    y > trigger_top && y < visible_bound
}

/// Catch every unhit word in the player's lane that has reached the trigger
/// band. Schedules the caught words' removal and their feedback expiry.
pub fn detect_catches(state: &mut GameState) -> Vec<Catch> {
    if !state.is_playing() {
        return Vec::new();
    }

    let lane = state.round.player_lane;
    let reward = state.config.reward;
    let (top, bound) = (state.config.trigger_top, state.config.visible_bound);

    let mut catches = Vec::new();
    let mut spots = Vec::new();
    for word in &mut state.words {
        if word.hit || word.lane != lane || !in_trigger_band(word.y, top, bound) {
            continue;
        }
        word.hit = true;
        catches.push(Catch {
            word_id: word.id,
            correct: word.is_correct,
            delta: if word.is_correct {
                reward as i32
            } else {
                -(reward as i32)
            },
        });
        spots.push((word.lane, word.y));
    }

    for (catch, (lane, y)) in catches.iter().zip(spots) {
        let round = &mut state.round;
        let color = if catch.correct {
            round.score = round.score.saturating_add(reward);
            round.correct_catches += 1;
            FeedbackColor::Lime
        } else {
            round.score = round.score.saturating_sub(reward);
            round.incorrect_catches += 1;
            FeedbackColor::Red
        };
        log::debug!(
            "Caught word {} ({}), score now {}",
            catch.word_id,
            if catch.correct { "correct" } else { "wrong" },
            round.score
        );

        let id = state.next_entity_id();
        state.feedback.push(FloatingFeedback {
            id,
            text: format!("{:+}", catch.delta),
            color,
            lane,
            y,
        });
        state
            .schedule
            .after(TimerKind::RemoveWord(catch.word_id), state.config.hit_linger_ms);
        state
            .schedule
            .after(TimerKind::ExpireFeedback(id), state.config.feedback_ms);
    }

    catches
}

/// Remove a caught word whose linger time is up
pub fn remove_word(state: &mut GameState, word_id: u32) {
    state.words.retain(|w| w.id != word_id);
}

/// Remove expired feedback
pub fn expire_feedback(state: &mut GameState, feedback_id: u32) {
    state.feedback.retain(|f| f.id != feedback_id);
}

/// Resolve pending removals right away and cancel every outstanding timer
pub fn flush_deferred(state: &mut GameState) {
    state.words.retain(|w| !w.hit);
    state.feedback.clear();
    state.schedule.clear();
}
