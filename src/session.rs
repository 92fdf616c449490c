//! Real-time session driver
//!
//! Wraps a [`GameState`] for a frame loop: wall-clock milliseconds go in,
//! whole virtual milliseconds come out of an accumulator, and the events the
//! simulation emits are routed to the reporter, the navigator and the local
//! leaderboard. Collaborator failures are logged and never reach gameplay.

use crate::audio::AudioManager;
use crate::consts::MAX_FRAME_MS;
use crate::highscores::HighScores;
use crate::persistence::ResultReporter;
use crate::sim::{
    Command, GameEvent, GameState, RoundReport, RoundSnapshot, TickInput, handle_command, tick,
};

/// Screens the game can hand control to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    LevelSelect,
}

/// Moves the player to another screen
pub trait Navigator {
    fn navigate(&mut self, screen: Screen) -> crate::Result<()>;
}

/// Navigator for headless runs
#[derive(Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&mut self, screen: Screen) -> crate::Result<()> {
        log::info!("Navigating to {screen:?}");
        Ok(())
    }
}

/// A game screen in progress
pub struct Session {
    state: GameState,
    accumulator_ms: f64,
    autopilot: bool,
    reporter: Box<dyn ResultReporter>,
    audio: AudioManager,
    navigator: Box<dyn Navigator>,
    high_scores: HighScores,
    last_report: Option<RoundReport>,
}

impl Session {
    /// Open the game screen; background music starts right away
    pub fn new(
        state: GameState,
        reporter: Box<dyn ResultReporter>,
        audio: AudioManager,
        navigator: Box<dyn Navigator>,
    ) -> Self {
        let mut session = Self {
            state,
            accumulator_ms: 0.0,
            autopilot: false,
            reporter,
            audio,
            navigator,
            high_scores: HighScores::new(),
            last_report: None,
        };
        session.audio.start_music();
        session
    }

    pub fn with_high_scores(mut self, high_scores: HighScores) -> Self {
        self.high_scores = high_scores;
        self
    }

    pub fn set_autopilot(&mut self, on: bool) {
        self.autopilot = on;
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn audio_mut(&mut self) -> &mut AudioManager {
        &mut self.audio
    }

    /// Result of the most recent finished round
    pub fn last_report(&self) -> Option<&RoundReport> {
        self.last_report.as_ref()
    }

    /// A button press: tap sound, then the command
    pub fn press(&mut self, command: Command) -> Vec<GameEvent> {
        self.audio.play_tap();
        let events = handle_command(&mut self.state, command);
        self.dispatch(&events);
        events
    }

    /// Advance by `elapsed_ms` of wall-clock time. Long frames (tab switches,
    /// debugger stops) are capped so the round doesn't jump ahead.
    pub fn update(&mut self, elapsed_ms: f64) -> Vec<GameEvent> {
        let elapsed = if elapsed_ms.is_finite() {
            elapsed_ms.clamp(0.0, MAX_FRAME_MS)
        } else {
            0.0
        };
        self.accumulator_ms += elapsed;
        let whole = self.accumulator_ms.floor();
        self.accumulator_ms -= whole;

        let input = TickInput {
            commands: Vec::new(),
            autopilot: self.autopilot,
        };
        let events = tick(&mut self.state, &input, whole as u32);
        self.dispatch(&events);
        events
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        self.state.snapshot()
    }

    fn dispatch(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::RoundStarted => self.audio.start_music(),
                GameEvent::RoundOver(report) => self.finish_round(report),
                GameEvent::NavigateAway => {
                    self.audio.stop_music();
                    if let Err(e) = self.navigator.navigate(Screen::LevelSelect) {
                        log::warn!("Navigation failed: {e}");
                    }
                }
                _ => {}
            }
        }
    }

    fn finish_round(&mut self, report: &RoundReport) {
        if let Err(e) = self.reporter.report(report) {
            log::error!("Error saving score: {e}");
        }
        if let Some(rank) = self.high_scores.add(report, crate::now_ms()) {
            log::info!("New high score: #{rank} with {} points", report.score);
        }
        self.last_report = Some(report.clone());
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.state.schedule.clear();
        self.audio.stop_music();
    }
}
