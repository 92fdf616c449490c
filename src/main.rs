//! Vowel Drop entry point
//!
//! The web build is driven from JavaScript through `WebGame`. Natively this
//! binary plays one demo round on autopilot and prints the result.
//!
//! Usage: `vowel-drop [seed] [score-file]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = demo::run() {
        log::error!("Demo failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::path::PathBuf;

    use vowel_drop::audio::AudioManager;
    use vowel_drop::persistence::{JsonFileStore, ScoreBook};
    use vowel_drop::session::LogNavigator;
    use vowel_drop::sim::{Command, GameState, WordCatalog};
    use vowel_drop::{HighScores, Session, Settings};

    /// Simulated display refresh
    const FRAME_MS: f64 = 1000.0 / 60.0;

    pub fn run() -> vowel_drop::Result<()> {
        let mut args = std::env::args().skip(1);
        let seed = match args.next() {
            Some(s) => s.parse().unwrap_or_else(|_| {
                log::warn!("Ignoring non-numeric seed {s:?}");
                0
            }),
            None => vowel_drop::now_ms() as u64,
        };
        let score_path = args
            .next()
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("vowel_drop_scores.json"));
        let board_path = score_path.with_extension("highscores.json");

        let settings = Settings::load();
        log::info!("Vowel Drop (native demo) starting, seed {seed}");

        let book = ScoreBook::new(JsonFileStore::open(&score_path)?);
        let mut audio = AudioManager::silent();
        audio.apply_settings(&settings);
        let state = GameState::new(settings.game.clone(), WordCatalog::expert(), seed);

        let mut session = Session::new(state, Box::new(book), audio, Box::new(LogNavigator))
            .with_high_scores(HighScores::load_from(&board_path)?);
        session.set_autopilot(true);
        session.press(Command::Start);

        while !session.state().is_over() {
            session.update(FRAME_MS);
        }

        let snapshot = session.snapshot();
        println!("Level:    {}", snapshot.level);
        println!("Score:    {}", snapshot.score);
        println!("Caught:   {} long-vowel words", snapshot.correct_catches);
        println!("Mistakes: {} short-vowel words", snapshot.incorrect_catches);
        if let Some(message) = &snapshot.practice_message {
            println!("{message}");
        }
        if let Some(best) = session.high_scores().top_score() {
            println!("Best:     {best}");
        }

        session.high_scores().save_to(&board_path)?;
        println!("Scores saved to {}", score_path.display());
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `platform::web::init`, this is just to satisfy the compiler
}
