//! Round clock

use super::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockOutcome {
    Ticked { remaining: u32 },
    /// Time is up; the caller ends the round
    Expired,
    Idle,
}

/// Take one second off the round clock
pub fn count_down(state: &mut GameState) -> ClockOutcome {
    if !state.is_playing() {
        return ClockOutcome::Idle;
    }
    state.round.time_remaining = state.round.time_remaining.saturating_sub(1);
    match state.round.time_remaining {
        0 => ClockOutcome::Expired,
        remaining => ClockOutcome::Ticked { remaining },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameConfig;
    use crate::sim::catalog::WordCatalog;
    use crate::sim::state::GamePhase;

    #[test]
    fn test_counts_down_to_expiry() {
        let config = GameConfig {
            round_seconds: 2,
            ..Default::default()
        };
        let mut state = GameState::new(config, WordCatalog::expert(), 1);
        state.phase = GamePhase::Playing;
        assert_eq!(count_down(&mut state), ClockOutcome::Ticked { remaining: 1 });
        assert_eq!(count_down(&mut state), ClockOutcome::Expired);
        assert_eq!(state.round.time_remaining, 0);
    }

    #[test]
    fn test_idle_when_paused() {
        let mut state = GameState::new(GameConfig::default(), WordCatalog::expert(), 1);
        state.phase = GamePhase::Paused;
        assert_eq!(count_down(&mut state), ClockOutcome::Idle);
        assert_eq!(state.round.time_remaining, 60);
    }
}
