//! Audio system
//!
//! Clip playback is delegated to an `AudioBackend` supplied by the front end;
//! this module owns the clip catalogue, the enable flags and the volume mix.
//! Missing clips or a missing backend simply mean silence.

pub mod mixer;
#[cfg(feature = "speaker")]
pub mod speaker;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub use mixer::{Clip, ClipError, Mixer, decode_wav};
#[cfg(feature = "speaker")]
pub use speaker::SpeakerBackend;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Player lost a life or smashed through traffic
    Crash,
    /// Power-up collected
    PowerUp,
    /// Menu button pressed
    Button,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 3] = [
        SoundEffect::Crash,
        SoundEffect::PowerUp,
        SoundEffect::Button,
    ];

    /// Clip name, also the file stem under `sounds/`
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Crash => "crash",
            SoundEffect::PowerUp => "powerup",
            SoundEffect::Button => "button",
        }
    }
}

/// Background music tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MusicTrack {
    /// In-game loop
    Game,
}

impl MusicTrack {
    pub const ALL: [MusicTrack; 1] = [MusicTrack::Game];

    /// Clip name, also the file stem under `music/`
    pub fn name(&self) -> &'static str {
        match self {
            MusicTrack::Game => "game",
        }
    }
}

/// Platform audio output
pub trait AudioBackend {
    /// Decode and keep the clip at `path` under `name`; false if it could not be loaded
    fn load_clip(&mut self, name: &str, path: &Path) -> bool;
    /// Play a loaded clip from the start, restarting it if already playing
    fn play_clip(&mut self, name: &str, volume: f32, looping: bool);
    /// Stop a clip if it is playing
    fn stop_clip(&mut self, name: &str);
}

/// Backend for headless runs: accepts every clip and plays nothing
#[derive(Debug, Default)]
pub struct SilentBackend;

impl AudioBackend for SilentBackend {
    fn load_clip(&mut self, _name: &str, _path: &Path) -> bool {
        true
    }

    fn play_clip(&mut self, _name: &str, _volume: f32, _looping: bool) {}

    fn stop_clip(&mut self, _name: &str) {}
}

/// Speaker output when `speaker` is set and a device opens, otherwise silence
pub fn open_output(speaker: bool) -> Box<dyn AudioBackend> {
    if !speaker {
        return Box::new(SilentBackend);
    }
    #[cfg(feature = "speaker")]
    {
        if let Some(backend) = SpeakerBackend::open() {
            return Box::new(backend);
        }
    }
    #[cfg(not(feature = "speaker"))]
    {
        log::warn!("Built without the `speaker` feature");
    }
    log::warn!("Falling back to silent audio");
    Box::new(SilentBackend)
}

/// Audio manager for the game
pub struct AudioManager {
    backend: Box<dyn AudioBackend>,
    loaded: HashSet<&'static str>,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    sound_enabled: bool,
    music_enabled: bool,
    /// Track currently looping, if any
    playing: Option<MusicTrack>,
}

impl AudioManager {
    /// Load every clip found under `asset_root` (`sounds/<name>.wav`, `music/<name>.wav`)
    pub fn new(backend: Box<dyn AudioBackend>, asset_root: &Path) -> Self {
        let mut manager = Self::with_backend(backend);
        for effect in SoundEffect::ALL {
            manager.load(effect.name(), clip_path(asset_root, "sounds", effect.name()));
        }
        for track in MusicTrack::ALL {
            manager.load(track.name(), clip_path(asset_root, "music", track.name()));
        }
        log::info!("Audio ready: {} clips loaded", manager.loaded.len());
        manager
    }

    /// Manager with no clips at all
    pub fn silent() -> Self {
        Self::with_backend(Box::new(SilentBackend))
    }

    fn with_backend(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            loaded: HashSet::new(),
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            sound_enabled: true,
            music_enabled: true,
            playing: None,
        }
    }

    fn load(&mut self, name: &'static str, path: PathBuf) {
        if !path.is_file() {
            log::info!("Audio file not found: {}", path.display());
            return;
        }
        if self.backend.load_clip(name, &path) {
            self.loaded.insert(name);
        } else {
            log::warn!("Could not load audio clip {}", path.display());
        }
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains(name)
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        if !self.sound_enabled || !self.loaded.contains(effect.name()) {
            return;
        }
        let volume = self.master_volume * self.sfx_volume;
        self.backend.play_clip(effect.name(), volume, false);
    }

    /// Start a track from the beginning, looping; any other music stops first
    pub fn play_music(&mut self, track: MusicTrack) {
        if !self.music_enabled {
            return;
        }
        self.stop_all_music();
        if !self.loaded.contains(track.name()) {
            return;
        }
        let volume = self.master_volume * self.music_volume;
        self.backend.play_clip(track.name(), volume, true);
        self.playing = Some(track);
    }

    pub fn stop_all_music(&mut self) {
        if let Some(track) = self.playing.take() {
            self.backend.stop_clip(track.name());
        }
    }

    pub fn playing_music(&self) -> Option<MusicTrack> {
        self.playing
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    /// Disabling music also stops whatever is playing
    pub fn set_music_enabled(&mut self, enabled: bool) {
        self.music_enabled = enabled;
        if !enabled {
            self.stop_all_music();
        }
    }

    pub fn music_enabled(&self) -> bool {
        self.music_enabled
    }

    /// Flip the music flag; returns the new state
    pub fn toggle_music(&mut self) -> bool {
        self.set_music_enabled(!self.music_enabled);
        log::info!("Music {}", if self.music_enabled { "on" } else { "off" });
        self.music_enabled
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Copy volume and enable flags from persisted settings
    pub fn apply_settings(&mut self, settings: &crate::Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_music_volume(settings.music_volume);
        self.set_sound_enabled(settings.sound_enabled);
        self.set_music_enabled(settings.music_enabled);
    }
}

fn clip_path(root: &Path, dir: &str, name: &str) -> PathBuf {
    root.join(dir).join(format!("{name}.wav"))
}
