//! Collision detection and resolution
//!
//! The player is a single rectangle. Cars are one rectangle; trucks are tested
//! part by part (trailer and cab), so the gap beside a narrower part is safe.
//! Entities are processed in spawn order and every hit in a tick is resolved.

use super::rect::Rect;
use super::state::{Color, GameEvent, GameState, Obstacle, PowerUp, PowerUpKind};
use crate::consts::*;

/// Sparks for a smashed obstacle while invincible
const SMASH_PARTICLES: usize = 20;
/// Sparks for a crash that costs a life
const CRASH_PARTICLES: usize = 30;

/// True if any collision part of the obstacle overlaps the player
pub fn obstacle_hits_player(obstacle: &Obstacle, player: &Rect) -> bool {
    obstacle
        .parts()
        .iter()
        .flatten()
        .any(|part| part.intersects(player))
}

/// True if the power-up overlaps the player
pub fn powerup_hits_player(powerup: &PowerUp, player: &Rect) -> bool {
    powerup.bounds().intersects(player)
}

/// Move every obstacle, drop the ones that left the screen and resolve hits.
///
/// Returns `true` if the player ran out of lives; remaining obstacles are left
/// untouched in that case so the final frame shows the wreck as it happened.
pub fn resolve_obstacles(state: &mut GameState) -> bool {
    let player = state.player.bounds();
    let mut i = 0;

    while i < state.obstacles.len() {
        let obstacle = &mut state.obstacles[i];
        obstacle.update(PANEL_HEIGHT);
        if !obstacle.active {
            state.obstacles.remove(i);
            continue;
        }
        if !obstacle_hits_player(obstacle, &player) {
            i += 1;
            continue;
        }

        let obstacle = state.obstacles.remove(i);
        if state.effects.is_invincible() {
            let (cx, cy) = obstacle.bounds().center();
            state
                .particles
                .explosion(&mut state.fx_rng, cx, cy, Color::YELLOW, SMASH_PARTICLES);
            state.events.push(GameEvent::ObstacleSmashed);
        } else {
            state.lives = state.lives.saturating_sub(1);
            let (cx, cy) = player.center();
            state
                .particles
                .explosion(&mut state.fx_rng, cx, cy, Color::RED, CRASH_PARTICLES);
            state.events.push(GameEvent::Crash);
            log::debug!("Crash, {} lives left", state.lives);

            if state.lives == 0 {
                return true;
            }
        }
    }

    false
}

/// Move every power-up, drop the ones that fell off screen and apply pickups
pub fn resolve_powerups(state: &mut GameState) {
    let player = state.player.bounds();
    let now = state.now_ms();
    let mut i = 0;

    while i < state.powerups.len() {
        let powerup = &mut state.powerups[i];
        powerup.update(now);
        if powerup.is_off_screen() {
            state.powerups.remove(i);
            continue;
        }
        if !powerup_hits_player(powerup, &player) {
            i += 1;
            continue;
        }

        let powerup = state.powerups.remove(i);
        apply_powerup(state, powerup.kind, now);
        let half = POWERUP_SIZE / 2;
        state.particles.power_up_burst(
            &mut state.fx_rng,
            powerup.x + half,
            powerup.y + half,
            powerup.kind.color(),
        );
        state.events.push(GameEvent::PowerUpCollected(powerup.kind));
    }
}

/// Apply a collected power-up's effect
pub fn apply_powerup(state: &mut GameState, kind: PowerUpKind, now_ms: u64) {
    match kind {
        PowerUpKind::Invincibility | PowerUpKind::ScoreMultiplier => {
            state.effects.activate(kind, now_ms);
        }
        PowerUpKind::ExtraLife => {
            if state.lives < state.max_lives {
                state.lives += 1;
            }
        }
    }
}
