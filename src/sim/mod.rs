//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (logical clock, no wall time)
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod particles;
pub mod rect;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{apply_powerup, obstacle_hits_player, powerup_hits_player};
pub use particles::{MAX_PARTICLES, Particle, ParticleKind, ParticleSystem};
pub use rect::Rect;
pub use spawn::{obstacle_spawn_interval_ms, spawn_obstacle, spawn_powerup};
pub use state::{
    ActiveEffects, Color, GameEvent, GameState, MoveIntent, Obstacle, ObstacleKind, Player,
    PowerUp, PowerUpKind, RoadScroll, SessionPhase, Size, SpriteMetrics,
};
pub use tick::{TickInput, Transition, level_for_score, tick};
