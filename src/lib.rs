//! Highway Escape - a top-down arcade driving game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, collisions, progression)
//! - `game`: Frame loop wiring the simulation to injected services
//! - `assets`: Sprite catalog with generated placeholders
//! - `audio`: Sound effect and music playback over a pluggable backend
//! - `highscores` / `persistence`: Top-10 leaderboard stored as JSON
//! - `settings`: Player preferences
//! - `platform`: Keyboard mapping

pub mod assets;
pub mod audio;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use highscores::HighScores;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate
    pub const TICK_HZ: u64 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / TICK_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Playfield dimensions
    pub const PANEL_WIDTH: i32 = 500;
    pub const PANEL_HEIGHT: i32 = 700;

    /// Player car
    pub const PLAYER_SPEED: i32 = 5;
    /// Distance between the player's bottom edge and the panel bottom at spawn
    pub const PLAYER_START_BOTTOM_GAP: i32 = 50;
    /// Vertical travel band (top edge min, bottom edge max)
    pub const PLAYER_MIN_Y: i32 = 300;
    pub const PLAYER_MAX_Y: i32 = 650;

    /// Lives
    pub const START_LIVES: u8 = 3;
    pub const MAX_LIVES: u8 = 5;

    /// Obstacles
    pub const OBSTACLE_SPEED: i32 = 3;
    pub const TRUCK_SPAWN_PROBABILITY: f64 = 0.3;
    /// Vertical overlap between truck cab and trailer
    pub const TRUCK_OVERLAP: i32 = 20;
    pub const OBSTACLE_SPAWN_INTERVAL_MS: u64 = 2000;
    pub const MIN_OBSTACLE_SPAWN_INTERVAL_MS: u64 = 800;
    pub const SPAWN_INTERVAL_STEP_MS: u64 = 250;
    pub const OBSTACLE_SPAWN_ATTEMPTS: u32 = 10;
    /// Left edge of the drivable road
    pub const ROAD_MARGIN: i32 = 50;
    /// Horizontal span obstacles may occupy
    pub const OBSTACLE_ROAD_WIDTH: i32 = PANEL_WIDTH - 100;

    /// Power-ups
    pub const POWERUP_SIZE: i32 = 40;
    pub const POWERUP_FALL_SPEED: i32 = 3;
    pub const POWERUP_SPAWN_Y: i32 = -50;
    pub const POWERUP_SPAWN_INTERVAL_MS: u64 = 8000;
    pub const POWERUP_SPAWN_ATTEMPTS: u32 = 15;
    /// Horizontal span power-up x positions are drawn from
    pub const POWERUP_ROAD_WIDTH: i32 = PANEL_WIDTH - 140;
    /// Power-ups below this y are discarded
    pub const POWERUP_DESPAWN_Y: i32 = 800;

    /// Score: one point per decisecond, a new level every 500 points
    pub const MS_PER_POINT: u64 = 100;
    pub const POINTS_PER_LEVEL: u64 = 500;

    /// Road scroll speeds (pixels per tick)
    pub const ROAD_SCROLL_SPEED: i32 = 5;
    pub const ROAD_SCROLL_BOOST: i32 = 3;
    pub const ROAD_SCROLL_BRAKE: i32 = 2;
}
