//! Round state machine and time stepping
//!
//! Commands move the round between phases; [`advance`] moves virtual time
//! forward and fires whatever timers fall due. Both return the events the
//! outside world should react to (reporting, navigation, HUD updates).

use super::autopilot::choose_move;
use super::clock::{ClockOutcome, count_down};
use super::collision::{detect_catches, expire_feedback, flush_deferred, remove_word};
use super::motion::advance_words;
use super::schedule::TimerKind;
use super::spawn::{SpawnOutcome, spawn_word};
use super::state::{GamePhase, GameState, RoundReport};

/// Player actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Leave the instructions screen and begin a round
    Start,
    Pause,
    /// Begin the 3-2-1 countdown back into play
    Resume,
    MoveLeft,
    MoveRight,
    /// Start a fresh round from the game-over screen
    PlayAgain,
    /// Abandon the round and go back to the instructions screen
    Home,
}

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Commands applied in order before time advances
    pub commands: Vec<Command>,
    /// Demo mode - the autopilot steers the player
    pub autopilot: bool,
}

/// Things that happened while handling a command or advancing time
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    RoundStarted,
    WordSpawned { id: u32, lane: u8 },
    /// The whole catalog had been used and the cycle restarted
    WordsRecycled,
    WordCaught {
        word_id: u32,
        correct: bool,
        delta: i32,
        score: u32,
    },
    LaneChanged { lane: u8 },
    ClockTick { remaining: u32 },
    Paused,
    Countdown { remaining: u8 },
    Resumed,
    /// The round finished; emitted once per completed round
    RoundOver(RoundReport),
    /// The player left for the level-select screen
    NavigateAway,
}

/// Apply one command
pub fn handle_command(state: &mut GameState, command: Command) -> Vec<GameEvent> {
    let mut events = Vec::new();
    match (command, state.phase) {
        (Command::Start, GamePhase::Instructions) | (Command::PlayAgain, GamePhase::Over) => {
            start_round(state, &mut events);
        }
        (Command::Pause, GamePhase::Playing) => {
            flush_deferred(state);
            state.phase = GamePhase::Paused;
            log::info!("Paused with {}s left", state.round.time_remaining);
            events.push(GameEvent::Paused);
        }
        (Command::Pause, GamePhase::Countdown { .. }) => {
            state.schedule.clear();
            state.phase = GamePhase::Paused;
            events.push(GameEvent::Paused);
        }
        (Command::Resume, GamePhase::Paused) => {
            let from = state.config.countdown_from;
            if from == 0 {
                resume_play(state, &mut events);
            } else {
                state.phase = GamePhase::Countdown { remaining: from };
                state
                    .schedule
                    .every(TimerKind::Countdown, state.config.countdown_interval_ms);
                events.push(GameEvent::Countdown { remaining: from });
            }
        }
        (Command::MoveLeft | Command::MoveRight, GamePhase::Playing) => {
            let max_lane = state.config.lane_count.saturating_sub(1);
            let lane = state.round.player_lane;
            let target = match command {
                Command::MoveLeft => lane.saturating_sub(1),
                _ => lane.saturating_add(1).min(max_lane),
            };
            if target != lane {
                state.round.player_lane = target;
                events.push(GameEvent::LaneChanged { lane: target });
                push_catches(state, &mut events);
            }
        }
        (Command::Home, _) => {
            state.reset_round();
            state.phase = GamePhase::Instructions;
            log::info!("Left the round for level select");
            events.push(GameEvent::NavigateAway);
        }
        (command, phase) => {
            log::debug!("Ignoring {command:?} during {phase:?}");
        }
    }
    events
}

/// Advance virtual time by `elapsed_ms`, firing due timers in order
pub fn advance(state: &mut GameState, elapsed_ms: u32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let mut budget = elapsed_ms;

    while budget > 0 {
        let Some(next) = state.schedule.next_due() else {
            break;
        };
        let step = next.min(budget);
        state.schedule.elapse(step);
        if state.phase == GamePhase::Playing {
            state.elapsed_ms += u64::from(step);
        }
        budget -= step;
        if step < next {
            break;
        }

        let generation = state.schedule.generation();
        for (token, kind) in state.schedule.take_due() {
            let cancelled = if kind.is_periodic() {
                !state.schedule.is_armed(token)
            } else {
                state.schedule.generation() != generation
            };
            if !cancelled {
                fire(state, kind, &mut events);
            }
        }
    }

    events
}

/// Advance the game by one frame: apply input, then move time forward
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: u32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for &command in &input.commands {
        events.extend(handle_command(state, command));
    }
    if input.autopilot && state.is_playing() {
        if let Some(command) = choose_move(state) {
            events.extend(handle_command(state, command));
        }
    }
    events.extend(advance(state, dt_ms));
    events
}

fn fire(state: &mut GameState, kind: TimerKind, events: &mut Vec<GameEvent>) {
    match kind {
        TimerKind::Motion => {
            advance_words(state);
            push_catches(state, events);
        }
        TimerKind::Spawn => {
            match spawn_word(state) {
                SpawnOutcome::Spawned { id, lane } => {
                    events.push(GameEvent::WordSpawned { id, lane });
                }
                SpawnOutcome::Recycled => events.push(GameEvent::WordsRecycled),
                SpawnOutcome::Idle => {}
            }
            push_catches(state, events);
        }
        TimerKind::Clock => match count_down(state) {
            ClockOutcome::Ticked { remaining } => events.push(GameEvent::ClockTick { remaining }),
            ClockOutcome::Expired => {
                events.push(GameEvent::ClockTick { remaining: 0 });
                end_round(state, events);
            }
            ClockOutcome::Idle => {}
        },
        TimerKind::Countdown => {
            if let GamePhase::Countdown { remaining } = state.phase {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    resume_play(state, events);
                } else {
                    state.phase = GamePhase::Countdown { remaining };
                    events.push(GameEvent::Countdown { remaining });
                }
            }
        }
        TimerKind::RemoveWord(id) => remove_word(state, id),
        TimerKind::ExpireFeedback(id) => expire_feedback(state, id),
    }
}

fn push_catches(state: &mut GameState, events: &mut Vec<GameEvent>) {
    for catch in detect_catches(state) {
        events.push(GameEvent::WordCaught {
            word_id: catch.word_id,
            correct: catch.correct,
            delta: catch.delta,
            score: state.round.score,
        });
    }
}

fn start_round(state: &mut GameState, events: &mut Vec<GameEvent>) {
    state.reset_round();
    state.phase = GamePhase::Playing;
    state.arm_play_timers();
    log::info!(
        "Round started: level {}, {}s",
        state.catalog.level,
        state.round.time_remaining
    );
    events.push(GameEvent::RoundStarted);
}

fn resume_play(state: &mut GameState, events: &mut Vec<GameEvent>) {
    state.schedule.clear();
    state.phase = GamePhase::Playing;
    state.arm_play_timers();
    log::info!("Resumed with {}s left", state.round.time_remaining);
    events.push(GameEvent::Resumed);
}

fn end_round(state: &mut GameState, events: &mut Vec<GameEvent>) {
    state.schedule.clear();
    state.phase = GamePhase::Over;
    if state.result_reported {
        return;
    }
    state.result_reported = true;
    let report = state.report();
    log::info!(
        "Round over: score {} ({} correct, {} wrong)",
        report.score,
        report.correct_catches,
        report.incorrect_catches
    );
    events.push(GameEvent::RoundOver(report));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameConfig;
    use crate::sim::catalog::{WordCatalog, WordDefinition};
    use crate::sim::state::{FallingWord, Outcome};
    use proptest::prelude::*;

    fn two_by_two() -> WordCatalog {
        WordCatalog::new(
            "test",
            "long vowels",
            vec![
                WordDefinition::new("team", true),
                WordDefinition::new("rope", true),
                WordDefinition::new("cat", false),
                WordDefinition::new("dog", false),
            ],
        )
    }

    fn started(config: GameConfig, catalog: WordCatalog) -> GameState {
        let mut state = GameState::new(config, catalog, 12345);
        handle_command(&mut state, Command::Start);
        state
    }

    fn reports(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::RoundOver(_)))
            .count()
    }

    #[test]
    fn test_start_arms_timers() {
        let mut state = GameState::new(GameConfig::default(), WordCatalog::expert(), 1);
        assert!(advance(&mut state, 5000).is_empty());
        assert_eq!(state.round.time_remaining, 60);

        let events = handle_command(&mut state, Command::Start);
        assert_eq!(events, vec![GameEvent::RoundStarted]);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.schedule.has(TimerKind::Motion));
        assert!(state.schedule.has(TimerKind::Spawn));
        assert!(state.schedule.has(TimerKind::Clock));
    }

    #[test]
    fn test_first_spawn_after_one_interval() {
        let mut state = started(GameConfig::default(), WordCatalog::expert());
        advance(&mut state, 899);
        assert!(state.words.is_empty());
        let events = advance(&mut state, 1);
        assert!(matches!(events.as_slice(), [GameEvent::WordSpawned { .. }]));
        assert_eq!(state.words.len(), 1);
    }

    #[test]
    fn test_lane_clamped_and_only_while_playing() {
        let mut state = started(GameConfig::default(), WordCatalog::expert());
        assert_eq!(state.round.player_lane, 1);
        handle_command(&mut state, Command::MoveRight);
        assert!(handle_command(&mut state, Command::MoveRight).is_empty());
        assert_eq!(state.round.player_lane, 2);
        for _ in 0..4 {
            handle_command(&mut state, Command::MoveLeft);
        }
        assert_eq!(state.round.player_lane, 0);

        handle_command(&mut state, Command::Pause);
        handle_command(&mut state, Command::MoveRight);
        assert_eq!(state.round.player_lane, 0);
    }

    #[test]
    fn test_lane_change_catches_word_in_band() {
        let mut state = started(GameConfig::default(), WordCatalog::expert());
        let id = state.next_entity_id();
        let mut word = FallingWord::new(id, &WordDefinition::new("leaf", true), 2);
        word.y = 600.0;
        state.words.push(word);

        let events = handle_command(&mut state, Command::MoveRight);
        assert_eq!(
            events,
            vec![
                GameEvent::LaneChanged { lane: 2 },
                GameEvent::WordCaught {
                    word_id: id,
                    correct: true,
                    delta: 5,
                    score: 5
                }
            ]
        );
    }

    #[test]
    fn test_catch_scenario_three_right_one_wrong() {
        let config = GameConfig {
            start_lane: 0,
            ..Default::default()
        };
        let mut state = started(config, two_by_two());
        state.schedule.clear();
        state.schedule.every(TimerKind::Motion, 70);

        // Staggered so they reach the band one after another
        let plan = [("team", true), ("rope", true), ("cat", false), ("team", true)];
        for (i, (text, correct)) in plan.iter().enumerate() {
            let id = state.next_entity_id();
            let mut word = FallingWord::new(id, &WordDefinition::new(*text, *correct), 0);
            word.y = 500.0 - 100.0 * i as f32;
            state.words.push(word);
        }

        let events = advance(&mut state, 3000);
        let scores: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::WordCaught { score, .. } => Some(*score),
                _ => None,
            })
            .collect();
        assert_eq!(scores, vec![5, 10, 5, 10]);
        assert_eq!(state.round.score, 10);
        assert_eq!(state.round.correct_catches, 3);
        assert_eq!(state.round.incorrect_catches, 1);
        assert!(state.words.is_empty());
    }

    #[test]
    fn test_single_lane_catches_whole_catalog() {
        let config = GameConfig {
            lane_count: 1,
            start_lane: 0,
            ..Default::default()
        };
        let catalog = WordCatalog::new(
            "test",
            "long vowels",
            vec![
                WordDefinition::new("team", true),
                WordDefinition::new("rope", true),
                WordDefinition::new("cube", true),
                WordDefinition::new("cat", false),
            ],
        );
        let mut state = started(config, catalog);

        // Every word falls into the only lane, so each one is caught
        let mut caught = Vec::new();
        let mut elapsed = 0;
        while caught.len() < 4 && elapsed < 10_000 {
            for event in advance(&mut state, 70) {
                if let GameEvent::WordCaught { correct, delta, score, .. } = event {
                    caught.push((correct, delta, score));
                }
            }
            elapsed += 70;
        }

        assert_eq!(caught.len(), 4);
        assert_eq!(caught.iter().filter(|(correct, ..)| *correct).count(), 3);
        assert_eq!(state.round.correct_catches, 3);
        assert_eq!(state.round.incorrect_catches, 1);
        let expected = caught
            .iter()
            .fold(0i32, |score, (_, delta, _)| (score + delta).max(0));
        assert_eq!(state.round.score, expected as u32);
        assert_eq!(caught.last().map(|c| c.2), Some(state.round.score));
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_hit_word_removed_after_linger() {
        let config = GameConfig {
            start_lane: 0,
            ..Default::default()
        };
        let mut state = started(config, two_by_two());
        state.schedule.clear();
        let id = state.next_entity_id();
        let mut word = FallingWord::new(id, &WordDefinition::new("rope", true), 0);
        word.y = 560.0;
        state.words.push(word);
        handle_command(&mut state, Command::MoveRight);
        handle_command(&mut state, Command::MoveLeft);
        assert!(state.words[0].hit);

        advance(&mut state, 299);
        assert_eq!(state.words.len(), 1);
        advance(&mut state, 1);
        assert!(state.words.is_empty());
        assert_eq!(state.feedback.len(), 1);
        advance(&mut state, 300);
        assert!(state.feedback.is_empty());
    }

    #[test]
    fn test_round_ends_once_after_sixty_seconds() {
        let mut state = started(GameConfig::default(), WordCatalog::expert());
        let mut events = Vec::new();
        for _ in 0..(60_000 / 16) {
            events.extend(advance(&mut state, 16));
        }
        events.extend(advance(&mut state, 60_000 % 16));
        assert_eq!(state.phase, GamePhase::Over);
        assert_eq!(state.round.time_remaining, 0);
        assert_eq!(reports(&events), 1);
        assert!(state.result_reported);
        assert!(state.schedule.is_empty());

        // Further frames never report again
        for _ in 0..100 {
            assert!(advance(&mut state, 16).is_empty());
        }
        assert!(tick(&mut state, &TickInput::default(), 1000).is_empty());
    }

    #[test]
    fn test_one_second_short_is_still_playing() {
        let mut state = started(GameConfig::default(), WordCatalog::expert());
        advance(&mut state, 59_999);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.round.time_remaining, 1);
    }

    #[test]
    fn test_report_outcome() {
        let config = GameConfig {
            round_seconds: 1,
            ..Default::default()
        };
        let mut state = started(config, WordCatalog::expert());
        state.round.correct_catches = 2;
        state.round.incorrect_catches = 2;
        state.round.score = 0;
        let events = advance(&mut state, 1000);
        let Some(GameEvent::RoundOver(report)) = events.last() else {
            panic!("expected a report, got {events:?}");
        };
        assert_eq!(report.level, "expert");
        assert_eq!(report.outcome, Outcome::NeedsPractice);
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut state = started(GameConfig::default(), WordCatalog::expert());
        advance(&mut state, 2_500);
        let words = state.words.clone();
        let remaining = state.round.time_remaining;
        let elapsed = state.elapsed_ms;
        assert_eq!(remaining, 58);

        handle_command(&mut state, Command::Pause);
        assert!(state.is_paused());
        assert!(advance(&mut state, 30_000).is_empty());
        assert_eq!(state.words, words);
        assert_eq!(state.round.time_remaining, remaining);
        assert_eq!(state.elapsed_ms, elapsed);
    }

    #[test]
    fn test_resume_counts_down_then_plays() {
        let mut state = started(GameConfig::default(), WordCatalog::expert());
        advance(&mut state, 10_000);
        handle_command(&mut state, Command::Pause);

        let events = handle_command(&mut state, Command::Resume);
        assert_eq!(events, vec![GameEvent::Countdown { remaining: 3 }]);
        assert!(state.is_paused());

        // Moves are ignored during the countdown
        handle_command(&mut state, Command::MoveLeft);
        assert_eq!(state.round.player_lane, 1);

        assert_eq!(
            advance(&mut state, 2_000),
            vec![
                GameEvent::Countdown { remaining: 2 },
                GameEvent::Countdown { remaining: 1 }
            ]
        );
        assert_eq!(state.round.time_remaining, 50);
        assert_eq!(advance(&mut state, 1_000), vec![GameEvent::Resumed]);
        assert!(state.is_playing());

        // The clock picks up where it stopped
        advance(&mut state, 1_000);
        assert_eq!(state.round.time_remaining, 49);
    }

    #[test]
    fn test_pause_during_countdown_returns_to_pause() {
        let mut state = started(GameConfig::default(), WordCatalog::expert());
        handle_command(&mut state, Command::Pause);
        handle_command(&mut state, Command::Resume);
        advance(&mut state, 1_000);
        assert_eq!(handle_command(&mut state, Command::Pause), vec![GameEvent::Paused]);
        assert_eq!(state.phase, GamePhase::Paused);
        assert!(advance(&mut state, 5_000).is_empty());
    }

    #[test]
    fn test_play_again_resets_round() {
        let mut state = started(GameConfig::default(), WordCatalog::expert());
        advance(&mut state, 59_000);
        state.round.score = 35;
        advance(&mut state, 1_000);
        assert!(state.is_over());

        let events = handle_command(&mut state, Command::PlayAgain);
        assert_eq!(events, vec![GameEvent::RoundStarted]);
        assert_eq!(state.round.score, 0);
        assert_eq!(state.round.time_remaining, 60);
        assert!(state.words.is_empty());
        assert!(state.round.used_word_indices.is_empty());
        assert!(!state.result_reported);

        // And the next round reports again
        let events = advance(&mut state, 60_000);
        assert_eq!(reports(&events), 1);
    }

    #[test]
    fn test_play_again_ignored_mid_round() {
        let mut state = started(GameConfig::default(), WordCatalog::expert());
        advance(&mut state, 5_000);
        assert!(handle_command(&mut state, Command::PlayAgain).is_empty());
        assert_eq!(state.round.time_remaining, 55);
    }

    #[test]
    fn test_home_resets_from_any_phase() {
        let mut state = started(GameConfig::default(), WordCatalog::expert());
        advance(&mut state, 5_000);
        handle_command(&mut state, Command::Pause);

        let events = handle_command(&mut state, Command::Home);
        assert_eq!(events, vec![GameEvent::NavigateAway]);
        assert_eq!(state.phase, GamePhase::Instructions);
        assert!(state.words.is_empty());
        assert!(state.schedule.is_empty());
        assert_eq!(state.round.time_remaining, 60);
    }

    #[test]
    fn test_determinism() {
        let mut a = started(GameConfig::default(), WordCatalog::expert());
        let mut b = started(GameConfig::default(), WordCatalog::expert());
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..500 {
            assert_eq!(tick(&mut a, &input, 70), tick(&mut b, &input, 70));
        }
        assert_eq!(a.words, b.words);
        assert_eq!(a.round, b.round);
    }

    #[test]
    fn test_recycle_skips_a_spawn() {
        let mut state = started(GameConfig::default(), two_by_two());
        state.schedule.clear();
        state.schedule.every(TimerKind::Spawn, 900);
        let events = advance(&mut state, 900 * 6);
        let kinds: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::WordSpawned { .. } => Some("spawn"),
                GameEvent::WordsRecycled => Some("recycle"),
                _ => None,
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["spawn", "spawn", "spawn", "spawn", "recycle", "spawn"]
        );
    }

    fn command_strategy() -> impl Strategy<Value = Command> {
        prop_oneof![
            Just(Command::Start),
            Just(Command::Pause),
            Just(Command::Resume),
            Just(Command::MoveLeft),
            Just(Command::MoveRight),
            Just(Command::PlayAgain),
            Just(Command::Home),
        ]
    }

    proptest! {
        #[test]
        fn prop_round_invariants_hold(
            steps in prop::collection::vec(
                (prop::option::of(command_strategy()), 0u32..2_000),
                1..200,
            ),
            seed in any::<u64>(),
        ) {
            let mut state = GameState::new(GameConfig::default(), two_by_two(), seed);
            let mut reported = 0;
            let mut rounds_over = 0;
            for (command, dt) in steps {
                let was_over = state.is_over();
                let input = TickInput {
                    commands: command.into_iter().collect(),
                    autopilot: false,
                };
                let events = tick(&mut state, &input, dt);
                reported += reports(&events);
                if state.is_over() && !was_over {
                    rounds_over += 1;
                }
                prop_assert!(state.round.player_lane < state.config.lane_count);
                prop_assert!(state.round.time_remaining <= state.config.round_seconds);
                prop_assert!(state.round.used_word_indices.len() < state.catalog.len() + 1);
                let caught = state.round.correct_catches as u64;
                prop_assert!(u64::from(state.round.score) <= caught * u64::from(state.config.reward));
            }
            prop_assert_eq!(reported, rounds_over);
        }
    }
}
