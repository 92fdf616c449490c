//! Falling motion

use super::state::GameState;

/// Move every falling word down one step and prune the ones that left the
/// field. Returns how many words were pruned.
pub fn advance_words(state: &mut GameState) -> usize {
    if !state.is_playing() {
        return 0;
    }

    let step = state.config.fall_step;
    let bound = state.config.visible_bound;
    for word in &mut state.words {
        word.y += step;
    }

    let before = state.words.len();
    state.words.retain(|w| w.y < bound);
    before - state.words.len()
}
