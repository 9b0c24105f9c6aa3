//! Frame loop
//!
//! `Game` owns a session and the services around it. The front end feeds it key
//! events and frame deltas; it runs fixed ticks, routes tick events to audio and
//! tracks whether the last run earned a place on the leaderboard.

use crate::audio::{AudioManager, MusicTrack, SoundEffect};
use crate::consts::*;
use crate::highscores::HighScores;
use crate::platform::{Command, Controls, Key};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, SessionPhase, SpriteMetrics, TickInput, Transition, tick};

/// A finished run waiting for the player's name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingHighScore {
    pub score: u64,
    pub level: u32,
    /// Rank the score will take (1-based)
    pub rank: usize,
}

pub struct Game {
    state: GameState,
    controls: Controls,
    high_scores: HighScores,
    audio: AudioManager,
    settings: Settings,
    accumulator: f32,
    /// One-shot commands for the next tick
    input: TickInput,
    autopilot: bool,
    pending_high_score: Option<PendingHighScore>,
    show_high_scores: bool,
}

impl Game {
    pub fn new(
        seed: u64,
        metrics: SpriteMetrics,
        mut audio: AudioManager,
        high_scores: HighScores,
        settings: Settings,
    ) -> Self {
        audio.apply_settings(&settings);
        let mut state = GameState::new(seed, metrics);
        state.particles.set_cap(settings.max_particles());
        Self {
            state,
            controls: Controls::new(),
            high_scores,
            audio,
            settings,
            accumulator: 0.0,
            input: TickInput::default(),
            autopilot: false,
            pending_high_score: None,
            show_high_scores: false,
        }
    }

    /// Handle a key press; returns the command it triggered, if any
    pub fn key_down(&mut self, key: Key) -> Option<Command> {
        let command = self.controls.key_down(key, self.state.phase)?;
        match command {
            Command::Start => self.start(),
            Command::TogglePause => self.toggle_pause(),
            Command::ToggleMusic => self.toggle_music(),
            Command::Restart => self.restart(),
            Command::ReturnToMenu => self.return_to_menu(),
            Command::ShowHighScores => {
                self.audio.play(SoundEffect::Button);
                self.show_high_scores = true;
            }
        }
        Some(command)
    }

    pub fn key_up(&mut self, key: Key) {
        self.controls.key_up(key);
    }

    /// Begin a session from the menu on the next tick
    pub fn start(&mut self) {
        self.audio.play(SoundEffect::Button);
        self.input.start = true;
    }

    pub fn toggle_pause(&mut self) {
        self.input.pause = true;
    }

    pub fn restart(&mut self) {
        self.input.restart = true;
    }

    pub fn return_to_menu(&mut self) {
        self.audio.play(SoundEffect::Button);
        self.input.menu = true;
    }

    pub fn toggle_music(&mut self) {
        let enabled = self.audio.toggle_music();
        if enabled && self.state.phase == SessionPhase::Running {
            self.audio.play_music(MusicTrack::Game);
        }
    }

    /// Let the car drive itself (demo mode)
    pub fn set_autopilot(&mut self, enabled: bool) {
        self.autopilot = enabled;
        log::info!("Autopilot: {enabled}");
    }

    /// Run as many fixed ticks as `dt` seconds of wall time cover
    pub fn update(&mut self, dt: f32) -> Vec<Transition> {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut transitions = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let transition = self.step();
            if transition != Transition::None {
                transitions.push(transition);
            }
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        transitions
    }

    /// Run exactly one tick
    pub fn step(&mut self) -> Transition {
        let mut input = std::mem::take(&mut self.input);
        input.movement = self.controls.intent();
        input.autopilot = self.autopilot;

        let transition = tick(&mut self.state, &input);

        for event in self.state.drain_events() {
            self.handle_event(event);
        }
        self.handle_transition(transition);
        transition
    }

    fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::Crash | GameEvent::ObstacleSmashed => self.audio.play(SoundEffect::Crash),
            GameEvent::PowerUpCollected(kind) => {
                log::debug!("Collected {}", kind.label());
                self.audio.play(SoundEffect::PowerUp);
            }
            GameEvent::LevelUp(level) => log::info!("Level {level}"),
        }
    }

    fn handle_transition(&mut self, transition: Transition) {
        match transition {
            Transition::None | Transition::ReturnedToMenu => {}
            Transition::Started => {
                self.pending_high_score = None;
                self.show_high_scores = false;
                self.audio.play_music(MusicTrack::Game);
            }
            Transition::Resumed => self.audio.play_music(MusicTrack::Game),
            Transition::Paused => self.audio.stop_all_music(),
            Transition::GameOver { score, level } => {
                self.audio.stop_all_music();
                self.controls.release_all();
                self.pending_high_score = self
                    .high_scores
                    .potential_rank(score)
                    .map(|rank| PendingHighScore { score, level, rank });
                if let Some(pending) = self.pending_high_score {
                    log::info!("New high score: {score} (rank {})", pending.rank);
                }
            }
        }
    }

    /// Record the last run under `name`. Returns the rank, or `None` if there
    /// was nothing to record.
    pub fn submit_high_score(&mut self, name: &str) -> Option<usize> {
        let pending = self.pending_high_score.take()?;
        self.high_scores.add_score(name, pending.score, pending.level)
    }

    /// Close out a run that is still going, e.g. when a headless run hits its
    /// tick limit. Afterwards `submit_high_score` records the score reached so
    /// far. A run that already ended keeps its own result.
    pub fn finish_run(&mut self) -> Option<PendingHighScore> {
        if self.state.phase == SessionPhase::GameOver {
            return self.pending_high_score;
        }
        self.audio.stop_all_music();
        self.controls.release_all();
        let (score, level) = (self.state.score, self.state.level);
        self.pending_high_score = self
            .high_scores
            .potential_rank(score)
            .map(|rank| PendingHighScore { score, level, rank });
        log::info!("Run stopped at score {score}, level {level}");
        self.pending_high_score
    }

    pub fn pending_high_score(&self) -> Option<PendingHighScore> {
        self.pending_high_score
    }

    /// True once after the player asked for the leaderboard
    pub fn take_high_score_request(&mut self) -> bool {
        std::mem::take(&mut self.show_high_scores)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn audio(&self) -> &AudioManager {
        &self.audio
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
