//! Audio playback
//!
//! Background music loops while the game screen is open and a short tap
//! plays on every button press. Playback failures are logged and otherwise
//! ignored; gameplay never waits on audio.

use crate::settings::Settings;

/// Sounds the game plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    /// Looping background music
    Music,
    /// Button press
    Tap,
}

/// Something that can make noise
pub trait AudioBackend {
    /// Start `track` looping, replacing any loop already running
    fn start_loop(&mut self, track: Track, volume: f32) -> crate::Result<()>;
    /// Stop the running loop, if any
    fn stop(&mut self) -> crate::Result<()>;
    /// Play `track` once
    fn play_once(&mut self, track: Track, volume: f32) -> crate::Result<()>;
}

/// Backend for headless runs
#[derive(Debug, Default)]
pub struct SilentBackend;

impl AudioBackend for SilentBackend {
    fn start_loop(&mut self, track: Track, volume: f32) -> crate::Result<()> {
        log::debug!("(silent) loop {track:?} at {volume:.2}");
        Ok(())
    }

    fn stop(&mut self) -> crate::Result<()> {
        Ok(())
    }

    fn play_once(&mut self, track: Track, volume: f32) -> crate::Result<()> {
        log::debug!("(silent) play {track:?} at {volume:.2}");
        Ok(())
    }
}

/// Audio manager for the game
pub struct AudioManager {
    backend: Box<dyn AudioBackend>,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    music_playing: bool,
}

impl AudioManager {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            master_volume: 1.0,
            sfx_volume: 0.6,
            music_volume: 0.4,
            muted: false,
            music_playing: false,
        }
    }

    pub fn silent() -> Self {
        Self::new(Box::new(SilentBackend))
    }

    /// Copy volume and mute preferences from settings
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
        self.music_volume = settings.music_volume.clamp(0.0, 1.0);
        self.set_muted(settings.muted);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted && self.music_playing {
            self.stop_music();
        }
    }

    pub fn is_music_playing(&self) -> bool {
        self.music_playing
    }

    fn effective(&self, channel: f32) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * channel
        }
    }

    /// Start the background loop unless it is already running
    pub fn start_music(&mut self) {
        if self.music_playing {
            return;
        }
        let vol = self.effective(self.music_volume);
        if vol <= 0.0 {
            return;
        }
        match self.backend.start_loop(Track::Music, vol) {
            Ok(()) => self.music_playing = true,
            Err(e) => log::warn!("Error loading background music: {e}"),
        }
    }

    pub fn stop_music(&mut self) {
        if !self.music_playing {
            return;
        }
        self.music_playing = false;
        if let Err(e) = self.backend.stop() {
            log::warn!("Error stopping background music: {e}");
        }
    }

    /// Button feedback
    pub fn play_tap(&mut self) {
        let vol = self.effective(self.sfx_volume);
        if vol <= 0.0 {
            return;
        }
        if let Err(e) = self.backend.play_once(Track::Tap, vol) {
            log::warn!("Error playing tap sound: {e}");
        }
    }
}

/// Web Audio backend: music is a soft two-oscillator drone, taps are a short
/// blip. No asset files needed.
#[cfg(target_arch = "wasm32")]
pub mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioBackend, Track};
    use crate::VowelDropError;

    fn audio_err(e: wasm_bindgen::JsValue) -> VowelDropError {
        VowelDropError::Audio(format!("{e:?}"))
    }

    pub struct WebAudioBackend {
        ctx: Option<AudioContext>,
        music: Vec<(OscillatorNode, GainNode)>,
    }

    impl Default for WebAudioBackend {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudioBackend {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                music: Vec::new(),
            }
        }

        fn context(&self) -> crate::Result<&AudioContext> {
            let ctx = self
                .ctx
                .as_ref()
                .ok_or_else(|| VowelDropError::Audio("no audio context".into()))?;
            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            Ok(ctx)
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> crate::Result<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().map_err(audio_err)?;
            let gain = ctx.create_gain().map_err(audio_err)?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).map_err(audio_err)?;
            gain.connect_with_audio_node(&ctx.destination())
                .map_err(audio_err)?;

            Ok((osc, gain))
        }

        fn play_tap(ctx: &AudioContext, vol: f32) -> crate::Result<()> {
            let (osc, gain) = Self::create_osc(ctx, 660.0, OscillatorType::Sine)?;
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.5, t).map_err(audio_err)?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                .map_err(audio_err)?;
            osc.frequency()
                .exponential_ramp_to_value_at_time(440.0, t + 0.08)
                .map_err(audio_err)?;

            osc.start().map_err(audio_err)?;
            osc.stop_with_when(t + 0.1).map_err(audio_err)?;
            Ok(())
        }
    }

    impl AudioBackend for WebAudioBackend {
        fn start_loop(&mut self, track: Track, volume: f32) -> crate::Result<()> {
            self.stop()?;
            let ctx = self.context()?;
            let notes: &[(f32, OscillatorType)] = match track {
                Track::Music => &[(220.0, OscillatorType::Triangle), (329.6, OscillatorType::Sine)],
                Track::Tap => &[(660.0, OscillatorType::Sine)],
            };
            let mut voices = Vec::with_capacity(notes.len());
            for &(freq, osc_type) in notes {
                let (osc, gain) = Self::create_osc(ctx, freq, osc_type)?;
                gain.gain().set_value(volume * 0.15);
                osc.start().map_err(audio_err)?;
                voices.push((osc, gain));
            }
            self.music = voices;
            Ok(())
        }

        fn stop(&mut self) -> crate::Result<()> {
            for (osc, _gain) in self.music.drain(..) {
                osc.stop().map_err(audio_err)?;
            }
            Ok(())
        }

        fn play_once(&mut self, track: Track, volume: f32) -> crate::Result<()> {
            let ctx = self.context()?;
            match track {
                Track::Tap => Self::play_tap(ctx, volume),
                Track::Music => {
                    let (osc, gain) = Self::create_osc(ctx, 220.0, OscillatorType::Triangle)?;
                    let t = ctx.current_time();
                    gain.gain().set_value_at_time(volume * 0.15, t).map_err(audio_err)?;
                    osc.start().map_err(audio_err)?;
                    osc.stop_with_when(t + 2.0).map_err(audio_err)?;
                    Ok(())
                }
            }
        }
    }
}
