//! Fixed timestep simulation tick
//!
//! Core game loop that advances a session deterministically. One call is one
//! 60 Hz step on the logical clock; spawn "timers" are due-time checks against it.

use super::collision::{resolve_obstacles, resolve_powerups};
use super::rect::Rect;
use super::spawn::{obstacle_spawn_interval_ms, spawn_obstacle, spawn_powerup};
use super::state::{GameEvent, GameState, MoveIntent, SessionPhase};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held movement keys
    pub movement: MoveIntent,
    /// Start a session from the menu
    pub start: bool,
    /// Pause toggle
    pub pause: bool,
    /// Start over after game over
    pub restart: bool,
    /// Leave the game-over screen for the menu
    pub menu: bool,
    /// Demo mode - the car steers itself
    pub autopilot: bool,
}

/// Session state change produced by a tick, consumed by the surrounding UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    Started,
    Paused,
    Resumed,
    GameOver { score: u64, level: u32 },
    ReturnedToMenu,
}

/// Advance the session by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) -> Transition {
    let mut transition = Transition::None;

    match state.phase {
        SessionPhase::Idle => {
            if input.start {
                state.start_session();
                log::info!("Session started (seed {})", state.seed);
                return Transition::Started;
            }
            return Transition::None;
        }
        SessionPhase::GameOver => {
            if input.restart {
                state.start_session();
                log::info!("Session restarted");
                return Transition::Started;
            }
            if input.menu {
                state.phase = SessionPhase::Idle;
                return Transition::ReturnedToMenu;
            }
            return Transition::None;
        }
        SessionPhase::Running => {
            if input.pause {
                state.phase = SessionPhase::Paused;
                return Transition::Paused;
            }
        }
        SessionPhase::Paused => {
            if !input.pause {
                return Transition::None;
            }
            state.phase = SessionPhase::Running;
            transition = Transition::Resumed;
        }
    }

    state.player.intent = if input.autopilot {
        autopilot_intent(state)
    } else {
        input.movement
    };

    state.time_ticks += 1;
    let now = state.now_ms();

    // Progression
    update_score(state, now);
    update_difficulty(state);
    state.effects.expire(now);

    // Player
    state.player.update(PANEL_WIDTH, PANEL_HEIGHT);
    let exhaust = state.player.bounds();
    state.particles.engine_smoke(
        &mut state.fx_rng,
        exhaust.x + exhaust.w / 2,
        exhaust.bottom(),
    );

    // Spawners
    if now >= state.next_obstacle_ms {
        if let Some(obstacle) = spawn_obstacle(&state.obstacles, &state.metrics, &mut state.rng) {
            state.obstacles.push(obstacle);
        }
        state.next_obstacle_ms = now + state.obstacle_interval_ms;
    }
    if now >= state.next_powerup_ms {
        let player = state.player.bounds();
        if let Some(powerup) =
            spawn_powerup(&state.obstacles, &state.powerups, player, now, &mut state.rng)
        {
            state.powerups.push(powerup);
        }
        state.next_powerup_ms = now + POWERUP_SPAWN_INTERVAL_MS;
    }

    // Collisions
    if resolve_obstacles(state) {
        state.phase = SessionPhase::GameOver;
        log::info!("Game over: score {} at level {}", state.score, state.level);
        return Transition::GameOver {
            score: state.score,
            level: state.level,
        };
    }
    resolve_powerups(state);

    state.particles.update();
    state.road.advance(state.player.intent);

    transition
}

/// Score is elapsed deciseconds, doubled while the multiplier runs.
/// Recomputed from the session clock every tick so it never drifts.
fn update_score(state: &mut GameState, now_ms: u64) {
    let base = now_ms / MS_PER_POINT;
    state.score = if state.effects.has_multiplier() {
        base * 2
    } else {
        base
    };
}

/// Level follows the score; the obstacle period is recomputed when it changes
fn update_difficulty(state: &mut GameState) {
    let level = level_for_score(state.score);
    if level == state.level {
        return;
    }
    let raised = level > state.level;
    state.level = level;
    state.obstacle_interval_ms = obstacle_spawn_interval_ms(level);
    if raised {
        log::debug!(
            "Level {level}, obstacles every {} ms",
            state.obstacle_interval_ms
        );
        state.events.push(GameEvent::LevelUp(level));
    }
}

/// Difficulty level for a score (1-based, a new level every 500 points)
pub fn level_for_score(score: u64) -> u32 {
    (score / POINTS_PER_LEVEL) as u32 + 1
}

/// Demo driver: dodge the nearest threat in our column, otherwise chase a pickup
/// or drift back to the middle of the road.
fn autopilot_intent(state: &GameState) -> MoveIntent {
    let player = state.player.bounds();
    let (px, _) = player.center();
    let lookahead = Rect::new(player.x - 10, player.y - 250, player.w + 20, player.h + 250);

    let threat = state
        .obstacles
        .iter()
        .filter(|o| o.bounds().intersects(&lookahead))
        .max_by_key(|o| o.bounds().bottom());

    let mut intent = MoveIntent::default();

    if let Some(threat) = threat {
        let bounds = threat.bounds();
        let (tx, _) = bounds.center();
        let room_left = bounds.x;
        let room_right = PANEL_WIDTH - bounds.right();
        // Swerve away from the threat's centre unless the wall is in the way
        let go_left = if px == tx {
            room_left > room_right
        } else {
            px < tx
        };
        if go_left && player.x > 0 {
            intent.left = true;
        } else if !go_left && player.right() < PANEL_WIDTH {
            intent.right = true;
        } else if go_left {
            intent.right = true;
        } else {
            intent.left = true;
        }
        // Back off to buy time
        intent.down = true;
        return intent;
    }

    let target_x = state
        .powerups
        .iter()
        .filter(|p| p.y > 0 && p.y < player.y)
        .min_by_key(|p| (player.y - p.y, (p.x - player.x).abs()))
        .map(|p| p.bounds().center().0)
        .unwrap_or(PANEL_WIDTH / 2);

    let dead_zone = state.player.speed;
    if target_x < px - dead_zone {
        intent.left = true;
    } else if target_x > px + dead_zone {
        intent.right = true;
    }
    intent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Obstacle, ObstacleKind, PowerUp, PowerUpKind, Size, SpriteMetrics};

    fn running_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed, SpriteMetrics::default());
        let start = TickInput {
            start: true,
            ..Default::default()
        };
        assert_eq!(tick(&mut state, &start), Transition::Started);
        state
    }

    fn run_ticks(state: &mut GameState, n: u64) {
        let input = TickInput::default();
        for _ in 0..n {
            tick(state, &input);
        }
    }

    #[test]
    fn test_idle_waits_for_start() {
        let mut state = GameState::new(1, SpriteMetrics::default());
        assert_eq!(tick(&mut state, &TickInput::default()), Transition::None);
        assert_eq!(state.phase, SessionPhase::Idle);
        assert_eq!(state.time_ticks, 0);

        let state = running_state(1);
        assert_eq!(state.phase, SessionPhase::Running);
    }

    #[test]
    fn test_tick_pause() {
        let mut state = running_state(12345);
        run_ticks(&mut state, 10);

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        assert_eq!(tick(&mut state, &pause), Transition::Paused);
        assert_eq!(state.phase, SessionPhase::Paused);

        // Paused ticks are no-ops, even with movement held
        let ticks = state.time_ticks;
        let player = state.player.bounds();
        let held = TickInput {
            movement: MoveIntent {
                left: true,
                ..Default::default()
            },
            ..Default::default()
        };
        for _ in 0..30 {
            assert_eq!(tick(&mut state, &held), Transition::None);
        }
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(state.player.bounds(), player);

        // Unpause
        assert_eq!(tick(&mut state, &pause), Transition::Resumed);
        assert_eq!(state.phase, SessionPhase::Running);
        assert_eq!(state.time_ticks, ticks + 1);
    }

    #[test]
    fn test_score_tracks_elapsed_deciseconds() {
        let mut state = running_state(3);
        // 60 ticks = 1000 ms
        run_ticks(&mut state, 60);
        assert_eq!(state.now_ms(), 1000);
        assert_eq!(state.score, 10);
    }

    #[test]
    fn test_multiplier_doubles_score() {
        let mut state = running_state(3);
        run_ticks(&mut state, 60);
        state.effects.activate(PowerUpKind::ScoreMultiplier, state.now_ms());
        run_ticks(&mut state, 60);
        assert_eq!(state.score, 40);

        // Once expired, score falls back to the elapsed-time baseline
        run_ticks(&mut state, 7 * 60);
        assert!(!state.effects.has_multiplier());
        assert_eq!(state.score, state.now_ms() / MS_PER_POINT);
    }

    #[test]
    fn test_level_up_shortens_spawn_interval() {
        let mut state = running_state(4);
        assert_eq!(state.obstacle_interval_ms, OBSTACLE_SPAWN_INTERVAL_MS);

        // 500 points = 50 s
        state.time_ticks = 50 * 60 - 1;
        // Keep the road clear so nothing ends the run
        state.next_obstacle_ms = u64::MAX;
        state.next_powerup_ms = u64::MAX;
        run_ticks(&mut state, 1);
        assert_eq!(state.score, 500);
        assert_eq!(state.level, 2);
        assert_eq!(state.obstacle_interval_ms, 1500);
        assert!(state.events.contains(&GameEvent::LevelUp(2)));
    }

    #[test]
    fn test_first_obstacle_spawns_after_two_seconds() {
        let mut state = running_state(5);
        run_ticks(&mut state, 119);
        assert!(state.obstacles.is_empty());
        run_ticks(&mut state, 1);
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.next_obstacle_ms, 2000 + OBSTACLE_SPAWN_INTERVAL_MS);
    }

    #[test]
    fn test_last_life_ends_session() {
        let mut state = running_state(6);
        state.lives = 1;
        let player = state.player.bounds();
        state.obstacles.push(Obstacle::new(
            player.x,
            player.y - 50,
            ObstacleKind::Car {
                size: Size::new(60, 100),
            },
        ));

        let transition = tick(&mut state, &TickInput::default());
        assert_eq!(
            transition,
            Transition::GameOver {
                score: 0,
                level: 1
            }
        );
        assert_eq!(state.phase, SessionPhase::GameOver);
        assert_eq!(state.lives, 0);

        // Frozen: spawners and movement stop
        let ticks = state.time_ticks;
        run_ticks(&mut state, 600);
        assert_eq!(state.time_ticks, ticks);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_double_crash_and_extra_life_in_one_tick() {
        let mut state = running_state(8);
        state.next_obstacle_ms = u64::MAX;
        state.next_powerup_ms = u64::MAX;
        let player = state.player.bounds();
        for _ in 0..2 {
            state.obstacles.push(Obstacle::new(
                player.x,
                player.y - 50,
                ObstacleKind::Car {
                    size: Size::new(60, 100),
                },
            ));
        }
        // Spawned this tick, so the bob offset is zero
        let now = (state.time_ticks + 1) * 1000 / TICK_HZ;
        state.powerups.push(PowerUp::new(
            player.x + 10,
            player.y + 10,
            PowerUpKind::ExtraLife,
            now,
        ));

        // Both crashes land before the pickup: 3 - 2 + 1
        assert_eq!(tick(&mut state, &TickInput::default()), Transition::None);
        assert_eq!(state.phase, SessionPhase::Running);
        assert_eq!(state.lives, START_LIVES - 1);
        assert!(state.obstacles.is_empty());
        assert!(state.powerups.is_empty());
        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::Crash,
                GameEvent::Crash,
                GameEvent::PowerUpCollected(PowerUpKind::ExtraLife),
            ]
        );
    }

    #[test]
    fn test_game_over_restart_and_menu() {
        let mut state = running_state(7);
        state.phase = SessionPhase::GameOver;
        state.lives = 0;

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        assert_eq!(tick(&mut state, &restart), Transition::Started);
        assert_eq!(state.lives, START_LIVES);
        assert_eq!(state.time_ticks, 0);

        state.phase = SessionPhase::GameOver;
        let menu = TickInput {
            menu: true,
            ..Default::default()
        };
        assert_eq!(tick(&mut state, &menu), Transition::ReturnedToMenu);
        assert_eq!(state.phase, SessionPhase::Idle);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = running_state(99999);
        let mut state2 = running_state(99999);

        let inputs = [
            TickInput {
                movement: MoveIntent {
                    left: true,
                    ..Default::default()
                },
                ..Default::default()
            },
            TickInput::default(),
            TickInput {
                movement: MoveIntent {
                    right: true,
                    up: true,
                    ..Default::default()
                },
                ..Default::default()
            },
        ];

        for _ in 0..600 {
            for input in &inputs {
                tick(&mut state1, input);
                tick(&mut state2, input);
            }
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.lives, state2.lives);
        assert_eq!(state1.obstacles.len(), state2.obstacles.len());
        assert_eq!(state1.player.bounds(), state2.player.bounds());
    }

    proptest::proptest! {
        #[test]
        fn prop_player_stays_in_travel_band(
            seed in 0u64..1000,
            moves in proptest::collection::vec(0u8..16, 1..400),
        ) {
            let mut state = running_state(seed);
            for bits in moves {
                let input = TickInput {
                    movement: MoveIntent {
                        left: bits & 1 != 0,
                        right: bits & 2 != 0,
                        up: bits & 4 != 0,
                        down: bits & 8 != 0,
                    },
                    ..Default::default()
                };
                tick(&mut state, &input);
                let p = state.player.bounds();
                proptest::prop_assert!(p.x >= 0 && p.right() <= PANEL_WIDTH);
                proptest::prop_assert!(p.y >= PLAYER_MIN_Y && p.bottom() <= PLAYER_MAX_Y);
                proptest::prop_assert!(state.lives <= MAX_LIVES);
            }
        }
    }

    #[test]
    fn test_level_formula() {
        assert_eq!(level_for_score(0), 1);
        assert_eq!(level_for_score(499), 1);
        assert_eq!(level_for_score(500), 2);
        assert_eq!(level_for_score(1250), 3);
    }
}
