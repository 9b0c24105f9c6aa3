//! Particle effects
//!
//! Purely cosmetic: explosions, pickup bursts and exhaust smoke. Particles age in
//! fixed 16 ms steps and are culled once their lifetime is used up.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::Color;

/// Default pool size when no setting overrides it
pub const MAX_PARTICLES: usize = 500;

/// Milliseconds a particle ages per tick
const PARTICLE_STEP_MS: u32 = 16;
/// Downward acceleration per tick
const PARTICLE_GRAVITY: f32 = 0.1;

/// Particle variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Explosion and pickup sparks
    Spark,
    /// Engine exhaust: grows and slows down
    Smoke,
}

/// A single particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Color,
    pub age_ms: u32,
    pub lifetime_ms: u32,
    pub size: f32,
}

impl Particle {
    pub fn new(kind: ParticleKind, pos: Vec2, vel: Vec2, color: Color, lifetime_ms: u32) -> Self {
        let size = match kind {
            ParticleKind::Spark => 4.0,
            ParticleKind::Smoke => 6.0,
        };
        Self {
            kind,
            pos,
            vel,
            color,
            age_ms: 0,
            lifetime_ms,
            size,
        }
    }

    pub fn update(&mut self) {
        self.pos += self.vel;
        self.vel.y += PARTICLE_GRAVITY;
        self.age_ms += PARTICLE_STEP_MS;

        if self.kind == ParticleKind::Smoke {
            self.size += 0.1;
            self.vel *= 0.98;
        }
    }

    /// Fade factor for rendering (1 = fresh, 0 = dead)
    pub fn alpha(&self) -> f32 {
        if self.lifetime_ms == 0 {
            return 0.0;
        }
        (1.0 - self.age_ms as f32 / self.lifetime_ms as f32).clamp(0.0, 1.0)
    }

    pub fn is_dead(&self) -> bool {
        self.age_ms >= self.lifetime_ms
    }
}

/// Bounded particle pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    cap: usize,
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::with_cap(MAX_PARTICLES)
    }
}

impl ParticleSystem {
    pub fn with_cap(cap: usize) -> Self {
        Self {
            particles: Vec::new(),
            cap,
        }
    }

    /// Change the pool size; surplus particles (oldest first) are dropped
    pub fn set_cap(&mut self, cap: usize) {
        self.cap = cap;
        if self.particles.len() > cap {
            let surplus = self.particles.len() - cap;
            self.particles.drain(..surplus);
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    fn push(&mut self, particle: Particle) {
        if self.particles.len() < self.cap {
            self.particles.push(particle);
        }
    }

    /// Advance every particle one tick and cull the dead
    pub fn update(&mut self) {
        for particle in self.particles.iter_mut() {
            particle.update();
        }
        self.particles.retain(|p| !p.is_dead());
    }

    /// Radial burst of sparks
    pub fn explosion<R: Rng>(
        &mut self,
        rng: &mut R,
        x: i32,
        y: i32,
        color: Color,
        count: usize,
    ) {
        let origin = Vec2::new(x as f32, y as f32);
        for _ in 0..count {
            let angle = rng.random::<f32>() * std::f32::consts::TAU;
            let speed = rng.random::<f32>() * 5.0 + 2.0;
            let vel = Vec2::from_angle(angle) * speed;
            let lifetime = 1000 + rng.random_range(0..500);
            self.push(Particle::new(ParticleKind::Spark, origin, vel, color, lifetime));
        }
    }

    /// Upward-biased sparkle when a power-up is collected
    pub fn power_up_burst<R: Rng>(&mut self, rng: &mut R, x: i32, y: i32, color: Color) {
        let origin = Vec2::new(x as f32, y as f32);
        for _ in 0..15 {
            let angle = rng.random::<f32>() * std::f32::consts::TAU;
            let speed = rng.random::<f32>() * 3.0 + 1.0;
            let vel = Vec2::from_angle(angle) * speed - Vec2::new(0.0, 2.0);
            let lifetime = 800 + rng.random_range(0..400);
            self.push(Particle::new(ParticleKind::Spark, origin, vel, color, lifetime));
        }
    }

    /// Exhaust puff behind the player (70% of ticks)
    pub fn engine_smoke<R: Rng>(&mut self, rng: &mut R, x: i32, y: i32) {
        if rng.random::<f64>() >= 0.7 {
            return;
        }
        let vel = Vec2::new(
            (rng.random::<f32>() - 0.5) * 2.0,
            rng.random::<f32>() * 2.0 + 1.0,
        );
        let lifetime = 500 + rng.random_range(0..300);
        self.push(Particle::new(
            ParticleKind::Smoke,
            Vec2::new(x as f32, y as f32),
            vel,
            Color::SMOKE,
            lifetime,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_explosion_spawns_requested_count() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut system = ParticleSystem::default();
        system.explosion(&mut rng, 100, 100, Color::RED, 30);
        assert_eq!(system.len(), 30);
        assert!(system.iter().all(|p| p.kind == ParticleKind::Spark));
    }

    #[test]
    fn test_particles_die_after_lifetime() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut system = ParticleSystem::default();
        system.power_up_burst(&mut rng, 50, 50, Color::GREEN);
        assert_eq!(system.len(), 15);

        // Longest burst lifetime is under 1200 ms = 75 ticks
        for _ in 0..75 {
            system.update();
        }
        assert!(system.is_empty());
    }

    #[test]
    fn test_smoke_grows_and_slows() {
        let mut smoke = Particle::new(
            ParticleKind::Smoke,
            Vec2::ZERO,
            Vec2::new(1.0, 0.0),
            Color::SMOKE,
            500,
        );
        smoke.update();
        assert!(smoke.size > 6.0);
        assert!(smoke.vel.x < 1.0);

        let mut spark = Particle::new(
            ParticleKind::Spark,
            Vec2::ZERO,
            Vec2::new(1.0, 0.0),
            Color::RED,
            500,
        );
        spark.update();
        assert_eq!(spark.size, 4.0);
        assert_eq!(spark.vel.x, 1.0);
    }

    #[test]
    fn test_cap_limits_pool() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut system = ParticleSystem::with_cap(10);
        system.explosion(&mut rng, 0, 0, Color::YELLOW, 20);
        assert_eq!(system.len(), 10);

        system.set_cap(0);
        assert!(system.is_empty());
        system.explosion(&mut rng, 0, 0, Color::YELLOW, 5);
        assert!(system.is_empty());
    }
}
