//! Browser glue: LocalStorage, hash navigation and the `WebGame` handle

use wasm_bindgen::prelude::*;

use crate::audio::AudioManager;
use crate::audio::web::WebAudioBackend;
use crate::highscores::HighScores;
use crate::persistence::deferred::{DeferredReporter, spawn_local};
use crate::persistence::{LocalStorageStore, Player, ScoreBook};
use crate::session::{Navigator, Screen, Session};
use crate::settings::Settings;
use crate::sim::{Command, GameEvent, GameState, WordCatalog};
use crate::VowelDropError;

/// LocalStorage key for the score database
pub const SCORE_DB_KEY: &str = "vowel_drop_scores";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
}

pub fn storage_get(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

pub fn storage_set(key: &str, value: &str) -> crate::Result<()> {
    let storage =
        local_storage().ok_or_else(|| VowelDropError::Storage("LocalStorage unavailable".into()))?;
    storage
        .set_item(key, value)
        .map_err(|e| VowelDropError::Storage(format!("{e:?}")))
}

/// Navigates by rewriting the location hash
#[derive(Debug, Default)]
pub struct HashNavigator;

impl Navigator for HashNavigator {
    fn navigate(&mut self, screen: Screen) -> crate::Result<()> {
        let hash = match screen {
            Screen::LevelSelect => "#/level-select",
        };
        let window = web_sys::window().ok_or_else(|| VowelDropError::Platform("no window".into()))?;
        window
            .location()
            .set_hash(hash)
            .map_err(|e| VowelDropError::Platform(format!("{e:?}")))
    }
}

fn js_err(e: VowelDropError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Game handle exported to JavaScript. The page drives it from
/// `requestAnimationFrame` and its buttons, and renders `snapshot()`.
#[wasm_bindgen]
pub struct WebGame {
    session: Session,
    last_time: f64,
}

#[wasm_bindgen]
impl WebGame {
    /// `catalog_json` overrides the built-in word list; `user_id` signs a
    /// player in for score records
    #[wasm_bindgen(constructor)]
    pub fn new(catalog_json: Option<String>, user_id: Option<String>) -> Result<WebGame, JsValue> {
        let settings = Settings::load();
        let catalog = match catalog_json {
            Some(json) => WordCatalog::from_json(&json).map_err(js_err)?,
            None => WordCatalog::expert(),
        };
        let seed = getrandom_03::u64().unwrap_or_else(|e| {
            log::warn!("No entropy source ({e}), using a time-based seed");
            crate::now_ms() as u64
        });
        log::info!("Vowel Drop starting (level {}, seed {seed})", catalog.level);

        let mut book = ScoreBook::new(LocalStorageStore::new(SCORE_DB_KEY));
        if let Some(user_id) = user_id {
            book.sign_in(Player::new(user_id));
        }

        let mut audio = AudioManager::new(Box::new(WebAudioBackend::new()));
        audio.apply_settings(&settings);

        let state = GameState::new(settings.game.clone(), catalog, seed);
        let reporter = DeferredReporter::new(book, spawn_local);
        let session = Session::new(state, Box::new(reporter), audio, Box::new(HashNavigator))
            .with_high_scores(HighScores::load());
        Ok(WebGame {
            session,
            last_time: 0.0,
        })
    }

    pub fn start(&mut self) {
        self.press(Command::Start);
    }

    pub fn pause(&mut self) {
        self.press(Command::Pause);
    }

    pub fn resume(&mut self) {
        self.press(Command::Resume);
    }

    pub fn move_left(&mut self) {
        self.press(Command::MoveLeft);
    }

    pub fn move_right(&mut self) {
        self.press(Command::MoveRight);
    }

    pub fn play_again(&mut self) {
        self.press(Command::PlayAgain);
    }

    pub fn home(&mut self) {
        self.press(Command::Home);
    }

    pub fn set_autopilot(&mut self, on: bool) {
        self.session.set_autopilot(on);
    }

    /// Advance to `time` (a `requestAnimationFrame` timestamp)
    pub fn update(&mut self, time: f64) {
        let elapsed = if self.last_time > 0.0 {
            time - self.last_time
        } else {
            0.0
        };
        self.last_time = time;
        let events = self.session.update(elapsed);
        self.after(&events);
    }

    /// Current round as JSON
    pub fn snapshot(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.snapshot()).map_err(|e| js_err(e.into()))
    }

    pub fn high_scores(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.high_scores()).map_err(|e| js_err(e.into()))
    }
}

impl WebGame {
    fn press(&mut self, command: Command) {
        let events = self.session.press(command);
        self.after(&events);
    }

    fn after(&mut self, events: &[GameEvent]) {
        if events.iter().any(|e| matches!(e, GameEvent::RoundOver(_))) {
            if let Err(e) = self.session.high_scores().save() {
                log::warn!("Failed to save high scores: {e}");
            }
        }
    }
}

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
}
