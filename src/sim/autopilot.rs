//! Demo-mode player
//!
//! Heads for the lowest target word still in play. With no target to chase,
//! steps out of the way of a distractor coming down the player's lane.

use super::state::GameState;
use super::tick::Command;

/// Pick at most one lane move for this frame
pub fn choose_move(state: &GameState) -> Option<Command> {
    let lane = state.round.player_lane;
    let bound = state.config.visible_bound;
    let live = move || state.words.iter().filter(move |w| !w.hit && w.y < bound);

    let target = live()
        .filter(|w| w.is_correct)
        .max_by(|a, b| a.y.total_cmp(&b.y))
        .map(|w| w.lane);

    if let Some(target) = target {
        return step_toward(lane, target);
    }

    let threat = live().any(|w| !w.is_correct && w.lane == lane);
    if !threat {
        return None;
    }
    let max_lane = state.config.lane_count.saturating_sub(1);
    let blocked = |l: u8| live().any(|w| !w.is_correct && w.lane == l);
    if lane > 0 && !blocked(lane - 1) {
        Some(Command::MoveLeft)
    } else if lane < max_lane && !blocked(lane + 1) {
        Some(Command::MoveRight)
    } else {
        None
    }
}

fn step_toward(lane: u8, target: u8) -> Option<Command> {
    match target.cmp(&lane) {
        std::cmp::Ordering::Less => Some(Command::MoveLeft),
        std::cmp::Ordering::Greater => Some(Command::MoveRight),
        std::cmp::Ordering::Equal => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameConfig;
    use crate::sim::catalog::{WordCatalog, WordDefinition};
    use crate::sim::state::{FallingWord, GamePhase};

    fn state_with(words: &[(&str, bool, u8, f32)]) -> GameState {
        let mut state = GameState::new(GameConfig::default(), WordCatalog::expert(), 1);
        state.phase = GamePhase::Playing;
        for (text, correct, lane, y) in words {
            let id = state.next_entity_id();
            let mut word = FallingWord::new(id, &WordDefinition::new(*text, *correct), *lane);
            word.y = *y;
            state.words.push(word);
        }
        state
    }

    #[test]
    fn test_chases_lowest_target() {
        let state = state_with(&[("team", true, 2, 100.0), ("rope", true, 0, 400.0)]);
        assert_eq!(choose_move(&state), Some(Command::MoveLeft));
    }

    #[test]
    fn test_stays_put_under_target() {
        let state = state_with(&[("cube", true, 1, 300.0), ("cat", false, 0, 500.0)]);
        assert_eq!(choose_move(&state), None);
    }

    #[test]
    fn test_dodges_distractor() {
        let state = state_with(&[("cat", false, 1, 500.0), ("dog", false, 0, 200.0)]);
        assert_eq!(choose_move(&state), Some(Command::MoveRight));
    }

    #[test]
    fn test_idle_with_empty_field() {
        let state = state_with(&[]);
        assert_eq!(choose_move(&state), None);
    }
}
