//! Game state and core simulation types
//!
//! Everything the frame loop mutates lives here and is owned by `GameState`.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::particles::ParticleSystem;
use super::rect::Rect;
use crate::consts::*;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Main menu, no session yet
    Idle,
    /// Active gameplay
    Running,
    /// Frozen by the player; rendering continues
    Paused,
    /// Lives exhausted; entities frozen for the final frame
    GameOver,
}

/// RGBA colour used for power-ups and particles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const ORANGE: Color = Color::rgb(255, 200, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const SMOKE: Color = Color::rgba(100, 100, 100, 150);
}

/// Width and height of a sprite in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub w: i32,
    pub h: i32,
}

impl Size {
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }
}

/// Sprite dimensions the simulation derives hitboxes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteMetrics {
    pub player: Size,
    pub enemy_car: Size,
    pub truck_cab: Size,
    pub truck_trailer: Size,
}

impl Default for SpriteMetrics {
    /// Sizes of the generated placeholder sprites
    fn default() -> Self {
        Self {
            player: Size::new(60, 100),
            enemy_car: Size::new(60, 100),
            truck_cab: Size::new(80, 60),
            truck_trailer: Size::new(80, 120),
        }
    }
}

/// Held movement keys. Any combination is allowed (diagonals, or opposing keys cancelling out).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveIntent {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// The player's car
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Pixels per tick
    pub speed: i32,
    pub intent: MoveIntent,
    /// -1 left, 1 right, 0 none; only used for skid marks
    pub last_move_direction: i8,
}

impl Player {
    /// Place a car of the given size at the bottom centre of the panel
    pub fn spawn(size: Size) -> Self {
        Self {
            x: (PANEL_WIDTH - size.w) / 2,
            y: PANEL_HEIGHT - size.h - PLAYER_START_BOTTOM_GAP,
            width: size.w,
            height: size.h,
            speed: PLAYER_SPEED,
            intent: MoveIntent::default(),
            last_move_direction: 0,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Apply the held intents and clamp to the panel width and the vertical travel band.
    /// Returns the new position.
    pub fn update(&mut self, bounds_w: i32, bounds_h: i32) -> (i32, i32) {
        self.last_move_direction = 0;
        if self.intent.left {
            self.x -= self.speed;
            self.last_move_direction = -1;
        }
        if self.intent.right {
            self.x += self.speed;
            self.last_move_direction = 1;
        }
        if self.intent.up {
            self.y -= self.speed;
        }
        if self.intent.down {
            self.y += self.speed;
        }

        let band_bottom = PLAYER_MAX_Y.min(bounds_h);
        if self.x < 0 {
            self.x = 0;
        }
        if self.x + self.width > bounds_w {
            self.x = bounds_w - self.width;
        }
        if self.y < PLAYER_MIN_Y {
            self.y = PLAYER_MIN_Y;
        }
        if self.y + self.height > band_bottom {
            self.y = band_bottom - self.height;
        }

        (self.x, self.y)
    }
}

/// Obstacle variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Car { size: Size },
    /// Trailer on top, cab in front of it (further down the screen), sharing an x offset
    Truck { cab: Size, trailer: Size },
}

impl ObstacleKind {
    pub fn width(&self) -> i32 {
        match *self {
            ObstacleKind::Car { size } => size.w,
            ObstacleKind::Truck { cab, trailer } => cab.w.max(trailer.w),
        }
    }

    pub fn height(&self) -> i32 {
        match *self {
            ObstacleKind::Car { size } => size.h,
            ObstacleKind::Truck { cab, trailer } => cab.h + trailer.h - TRUCK_OVERLAP,
        }
    }

    pub fn is_truck(&self) -> bool {
        matches!(self, ObstacleKind::Truck { .. })
    }
}

/// Oncoming traffic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: i32,
    /// Top edge of the whole vehicle
    pub y: i32,
    /// Pixels per tick (downward)
    pub speed: i32,
    pub kind: ObstacleKind,
    pub active: bool,
}

impl Obstacle {
    pub fn new(x: i32, y: i32, kind: ObstacleKind) -> Self {
        Self {
            x,
            y,
            speed: OBSTACLE_SPEED,
            kind,
            active: true,
        }
    }

    pub fn width(&self) -> i32 {
        self.kind.width()
    }

    pub fn height(&self) -> i32 {
        self.kind.height()
    }

    /// Overall bounding box (used for spawn spacing)
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width(), self.height())
    }

    /// Collision rectangles: one for a car, trailer then cab for a truck
    pub fn parts(&self) -> [Option<Rect>; 2] {
        match self.kind {
            ObstacleKind::Car { size } => [Some(Rect::new(self.x, self.y, size.w, size.h)), None],
            ObstacleKind::Truck { cab, trailer } => [
                Some(Rect::new(self.x, self.y, trailer.w, trailer.h)),
                Some(Rect::new(
                    self.x,
                    self.y + trailer.h - TRUCK_OVERLAP,
                    cab.w,
                    cab.h,
                )),
            ],
        }
    }

    /// Move down one tick; deactivate once the vehicle is fully past the bottom edge
    pub fn update(&mut self, panel_height: i32) {
        self.y += self.speed;
        if self.y > panel_height {
            self.active = false;
        }
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Invincibility,
    ScoreMultiplier,
    ExtraLife,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::Invincibility,
        PowerUpKind::ScoreMultiplier,
        PowerUpKind::ExtraLife,
    ];

    pub fn color(&self) -> Color {
        match self {
            PowerUpKind::Invincibility => Color::YELLOW,
            PowerUpKind::ScoreMultiplier => Color::ORANGE,
            PowerUpKind::ExtraLife => Color::GREEN,
        }
    }

    /// Effect duration; `None` for instantaneous effects
    pub fn duration_ms(&self) -> Option<u64> {
        match self {
            PowerUpKind::Invincibility => Some(5000),
            PowerUpKind::ScoreMultiplier => Some(7000),
            PowerUpKind::ExtraLife => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PowerUpKind::Invincibility => "Invincible",
            PowerUpKind::ScoreMultiplier => "2x Score",
            PowerUpKind::ExtraLife => "Extra Life",
        }
    }

    /// Glyph drawn on the pickup
    pub fn symbol(&self) -> &'static str {
        match self {
            PowerUpKind::Invincibility => "★",
            PowerUpKind::ScoreMultiplier => "2x",
            PowerUpKind::ExtraLife => "+1",
        }
    }
}

/// A falling pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub x: i32,
    pub y: i32,
    pub kind: PowerUpKind,
    /// Logical time of spawn, drives the wobble
    pub spawned_ms: u64,
}

impl PowerUp {
    pub fn new(x: i32, y: i32, kind: PowerUpKind, spawned_ms: u64) -> Self {
        Self {
            x,
            y,
            kind,
            spawned_ms,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, POWERUP_SIZE, POWERUP_SIZE)
    }

    /// Fall at constant speed plus a sinusoidal bob
    pub fn update(&mut self, now_ms: u64) {
        self.y += POWERUP_FALL_SPEED;
        let t = now_ms.saturating_sub(self.spawned_ms) as f64 / 1000.0;
        self.y += ((t * 3.0).sin() * 5.0) as i32;
    }

    pub fn is_off_screen(&self) -> bool {
        self.y > POWERUP_DESPAWN_Y
    }
}

/// Timed power-up effects, stored as absolute expiry times on the logical clock
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub invincible_until: Option<u64>,
    pub multiplier_until: Option<u64>,
}

impl ActiveEffects {
    pub fn is_invincible(&self) -> bool {
        self.invincible_until.is_some()
    }

    pub fn has_multiplier(&self) -> bool {
        self.multiplier_until.is_some()
    }

    /// Start (or restart) a timed effect; instantaneous kinds are ignored here
    pub fn activate(&mut self, kind: PowerUpKind, now_ms: u64) {
        let Some(duration) = kind.duration_ms() else {
            return;
        };
        let until = Some(now_ms + duration);
        match kind {
            PowerUpKind::Invincibility => self.invincible_until = until,
            PowerUpKind::ScoreMultiplier => self.multiplier_until = until,
            PowerUpKind::ExtraLife => {}
        }
    }

    /// Drop effects whose expiry lies strictly in the past
    pub fn expire(&mut self, now_ms: u64) {
        if self.invincible_until.is_some_and(|t| now_ms > t) {
            self.invincible_until = None;
        }
        if self.multiplier_until.is_some_and(|t| now_ms > t) {
            self.multiplier_until = None;
        }
    }
}

/// Two stacked road tiles scrolling downward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadScroll {
    pub y1: i32,
    pub y2: i32,
}

impl Default for RoadScroll {
    fn default() -> Self {
        Self {
            y1: 0,
            y2: -PANEL_HEIGHT,
        }
    }
}

impl RoadScroll {
    /// Scroll faster while accelerating, slower (never stopping) while braking
    pub fn advance(&mut self, intent: MoveIntent) {
        let mut speed = ROAD_SCROLL_SPEED;
        if intent.up {
            speed += ROAD_SCROLL_BOOST;
        } else if intent.down {
            speed = (speed - ROAD_SCROLL_BRAKE).max(1);
        }

        self.y1 += speed;
        self.y2 += speed;
        if self.y1 >= PANEL_HEIGHT {
            self.y1 = self.y2 - PANEL_HEIGHT;
        }
        if self.y2 >= PANEL_HEIGHT {
            self.y2 = self.y1 - PANEL_HEIGHT;
        }
    }
}

/// Things that happened during a tick, drained by the frame loop (sound, UI)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Player hit an obstacle and lost a life
    Crash,
    /// Invincible player plowed through an obstacle
    ObstacleSmashed,
    PowerUpCollected(PowerUpKind),
    LevelUp(u32),
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed for reproducibility
    pub seed: u64,
    /// Gameplay RNG (spawn placement)
    pub rng: Pcg32,
    /// Cosmetic RNG (particles), kept apart so effects never shift spawns
    pub fx_rng: Pcg32,
    pub metrics: SpriteMetrics,
    pub phase: SessionPhase,
    /// Ticks simulated in the current session
    pub time_ticks: u64,
    pub score: u64,
    pub lives: u8,
    pub max_lives: u8,
    pub level: u32,
    /// Current obstacle spawn period
    pub obstacle_interval_ms: u64,
    pub next_obstacle_ms: u64,
    pub next_powerup_ms: u64,
    pub player: Player,
    /// Active obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Active power-ups in spawn order
    pub powerups: Vec<PowerUp>,
    pub effects: ActiveEffects,
    /// Visual particles (not gameplay-affecting)
    pub particles: ParticleSystem,
    pub road: RoadScroll,
    /// Pending events since the last drain
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create an idle state (main menu) with the given seed
    pub fn new(seed: u64, metrics: SpriteMetrics) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            fx_rng: Pcg32::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15),
            metrics,
            phase: SessionPhase::Idle,
            time_ticks: 0,
            score: 0,
            lives: START_LIVES,
            max_lives: MAX_LIVES,
            level: 1,
            obstacle_interval_ms: OBSTACLE_SPAWN_INTERVAL_MS,
            next_obstacle_ms: OBSTACLE_SPAWN_INTERVAL_MS,
            next_powerup_ms: POWERUP_SPAWN_INTERVAL_MS,
            player: Player::spawn(metrics.player),
            obstacles: Vec::new(),
            powerups: Vec::new(),
            effects: ActiveEffects::default(),
            particles: ParticleSystem::default(),
            road: RoadScroll::default(),
            events: Vec::new(),
        }
    }

    /// Logical session time in milliseconds
    pub fn now_ms(&self) -> u64 {
        self.time_ticks * 1000 / TICK_HZ
    }

    /// Reset everything for a fresh run and enter `Running`.
    /// RNG streams carry on so consecutive sessions stay reproducible from the seed.
    pub fn start_session(&mut self) {
        self.phase = SessionPhase::Running;
        self.time_ticks = 0;
        self.score = 0;
        self.lives = START_LIVES;
        self.level = 1;
        self.obstacle_interval_ms = OBSTACLE_SPAWN_INTERVAL_MS;
        self.next_obstacle_ms = OBSTACLE_SPAWN_INTERVAL_MS;
        self.next_powerup_ms = POWERUP_SPAWN_INTERVAL_MS;
        self.player = Player::spawn(self.metrics.player);
        self.obstacles.clear();
        self.powerups.clear();
        self.effects = ActiveEffects::default();
        self.particles.clear();
        self.road = RoadScroll::default();
        self.events.clear();
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, SessionPhase::Running | SessionPhase::Paused)
    }
}
