//! Word spawning
//!
//! Each spawn tick drops one word from the catalog that has not been used in
//! the current cycle. Once every word has been dropped the cycle resets, and
//! that tick spawns nothing so the last word can't immediately repeat.

use rand::Rng;

use super::state::{FallingWord, GameState};

/// Result of one spawn tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    Spawned { id: u32, lane: u8 },
    /// Every catalog word had been used; the used set was cleared
    Recycled,
    /// Nothing happened (not playing, or empty catalog)
    Idle,
}

/// Drop one unused word into a random lane, drawing from the round's RNG
pub fn spawn_word(state: &mut GameState) -> SpawnOutcome {
    if !state.is_playing() || state.catalog.is_empty() {
        return SpawnOutcome::Idle;
    }

    let available: Vec<usize> = (0..state.catalog.len())
        .filter(|idx| !state.round.used_word_indices.contains(idx))
        .collect();
    if available.is_empty() {
        state.round.used_word_indices.clear();
        log::debug!("All {} words used, starting a new cycle", state.catalog.len());
        return SpawnOutcome::Recycled;
    }

    let index = available[state.rng.random_range(0..available.len())];
    let lane = state.rng.random_range(0..state.config.lane_count);
    state.round.used_word_indices.insert(index);

    let id = state.next_entity_id();
    let Some(definition) = state.catalog.get(index) else {
        return SpawnOutcome::Idle;
    };
    let word = FallingWord::new(id, definition, lane);
    log::debug!("Spawned '{}' in lane {lane}", word.text);
    state.words.push(word);

    SpawnOutcome::Spawned { id, lane }
}
