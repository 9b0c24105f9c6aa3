//! Obstacle and power-up spawning
//!
//! Placement is best-effort: a candidate position is drawn at random and rejected
//! if it crowds anything still near the top of the road. After a bounded number of
//! attempts the spawn is skipped for this cycle. That is a normal outcome, not an error.

use rand::Rng;

use super::rect::Rect;
use super::state::{Obstacle, ObstacleKind, PowerUp, PowerUpKind, SpriteMetrics};
use crate::consts::*;

/// Existing obstacles above this y still block new obstacles
const OBSTACLE_EXCLUSION_Y: i32 = 150;
/// Buffer around a nearby obstacle when placing a new obstacle
const OBSTACLE_BUFFER_X: i32 = 10;
const OBSTACLE_BUFFER_Y: i32 = 30;

/// Entities above this y still block new power-ups
const POWERUP_EXCLUSION_Y: i32 = 200;
/// Buffer around the power-up candidate itself
const POWERUP_CANDIDATE_BUFFER: i32 = 20;
/// Buffer around nearby obstacles when placing a power-up
const POWERUP_OBSTACLE_BUFFER: i32 = 30;
/// Buffer around nearby power-ups when placing a power-up
const POWERUP_POWERUP_BUFFER: i32 = 25;
/// Keep-out region around the player (left/right, above, below)
const PLAYER_KEEP_OUT_SIDE: i32 = 50;
const PLAYER_KEEP_OUT_ABOVE: i32 = 100;
const PLAYER_KEEP_OUT_BELOW: i32 = 50;

/// Obstacle spawn period for a difficulty level
pub fn obstacle_spawn_interval_ms(level: u32) -> u64 {
    let step = level as u64 * SPAWN_INTERVAL_STEP_MS;
    OBSTACLE_SPAWN_INTERVAL_MS
        .saturating_sub(step)
        .max(MIN_OBSTACLE_SPAWN_INTERVAL_MS)
}

/// Pick a car or truck and a clear spot just above the screen.
/// Returns `None` when every attempt crowded an existing obstacle.
pub fn spawn_obstacle<R: Rng>(
    existing: &[Obstacle],
    metrics: &SpriteMetrics,
    rng: &mut R,
) -> Option<Obstacle> {
    let kind = if rng.random::<f64>() < TRUCK_SPAWN_PROBABILITY {
        ObstacleKind::Truck {
            cab: metrics.truck_cab,
            trailer: metrics.truck_trailer,
        }
    } else {
        ObstacleKind::Car {
            size: metrics.enemy_car,
        }
    };

    let width = kind.width();
    let height = kind.height();
    let y = -height;
    let span = (OBSTACLE_ROAD_WIDTH - width).max(1);

    for _ in 0..OBSTACLE_SPAWN_ATTEMPTS {
        let x = ROAD_MARGIN + rng.random_range(0..span);
        let candidate = Rect::new(x, y, width, height);

        let crowded = existing
            .iter()
            .filter(|o| o.y < OBSTACLE_EXCLUSION_Y)
            .any(|o| {
                let buffered = o.bounds().inflate(OBSTACLE_BUFFER_X, OBSTACLE_BUFFER_Y);
                candidate.intersects(&buffered)
            });

        if !crowded {
            return Some(Obstacle::new(x, y, kind));
        }
    }

    log::debug!("Obstacle spawn skipped after {OBSTACLE_SPAWN_ATTEMPTS} attempts");
    None
}

/// Pick a random power-up and a spot clear of nearby traffic, other power-ups and the player.
/// Returns `None` when every attempt was rejected.
pub fn spawn_powerup<R: Rng>(
    obstacles: &[Obstacle],
    powerups: &[PowerUp],
    player_bounds: Rect,
    now_ms: u64,
    rng: &mut R,
) -> Option<PowerUp> {
    let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
    let player_area = player_bounds.grow(
        PLAYER_KEEP_OUT_SIDE,
        PLAYER_KEEP_OUT_ABOVE,
        PLAYER_KEEP_OUT_SIDE,
        PLAYER_KEEP_OUT_BELOW,
    );

    for _ in 0..POWERUP_SPAWN_ATTEMPTS {
        let x = ROAD_MARGIN + rng.random_range(0..POWERUP_ROAD_WIDTH);
        let y = POWERUP_SPAWN_Y;
        let candidate = Rect::new(x, y, POWERUP_SIZE, POWERUP_SIZE)
            .inflate(POWERUP_CANDIDATE_BUFFER, POWERUP_CANDIDATE_BUFFER);

        let near_obstacle = obstacles
            .iter()
            .filter(|o| o.y < POWERUP_EXCLUSION_Y)
            .any(|o| {
                let buffered = o
                    .bounds()
                    .inflate(POWERUP_OBSTACLE_BUFFER, POWERUP_OBSTACLE_BUFFER);
                candidate.intersects(&buffered)
            });
        if near_obstacle {
            continue;
        }

        let near_powerup = powerups
            .iter()
            .filter(|p| p.y < POWERUP_EXCLUSION_Y)
            .any(|p| {
                let buffered = p
                    .bounds()
                    .inflate(POWERUP_POWERUP_BUFFER, POWERUP_POWERUP_BUFFER);
                candidate.intersects(&buffered)
            });
        if near_powerup || candidate.intersects(&player_area) {
            continue;
        }

        return Some(PowerUp::new(x, y, kind, now_ms));
    }

    log::debug!("Power-up spawn skipped after {POWERUP_SPAWN_ATTEMPTS} attempts");
    None
}
