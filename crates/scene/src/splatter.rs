//! Impact splatter: a one-shot burst of ballistic chunks that bounce on the
//! ground and off the arena walls. No fade; lives until torn down.

use std::f32::consts::TAU;

use engine_core::{Rgba, Spin, Velocity};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::budget::ParticleBudget;

/// Height above the target where the burst starts.
pub const IMPACT_LIFT: f32 = 1.0;
/// Ground plane in the burst's local frame.
pub const GROUND_Y: f32 = -2.0;
/// Lateral walls at `±WALL` on local X and Z.
pub const WALL: f32 = 8.0;

const GRAVITY: f32 = 0.01;
const GROUND_RESTITUTION: f32 = 0.6;
const GROUND_FRICTION: f32 = 0.92;
const GROUND_SPIN_DAMPING: f32 = 0.9;
const WALL_RESTITUTION: f32 = 0.8;
const SPIN_DRAG: f32 = 0.97;

#[derive(Debug, Clone)]
pub struct SplatterParticle {
    /// Relative to the emitter origin.
    pub position: Vec3,
    pub velocity: Velocity,
    pub spin: Spin,
    pub size: f32,
    /// Drawn as a cube instead of a sphere.
    pub chunk: bool,
    pub color: Rgba,
}

impl SplatterParticle {
    fn update(&mut self) {
        let v = &mut self.velocity.linear;
        v.y -= GRAVITY;
        self.position += *v;

        if self.position.y < GROUND_Y {
            self.position.y = GROUND_Y;
            v.y = -v.y * GROUND_RESTITUTION;
            v.x *= GROUND_FRICTION;
            v.z *= GROUND_FRICTION;
            self.spin.damp(GROUND_SPIN_DAMPING);
        }
        if self.position.x.abs() > WALL {
            self.position.x = WALL.copysign(self.position.x);
            v.x = -v.x * WALL_RESTITUTION;
        }
        if self.position.z.abs() > WALL {
            self.position.z = WALL.copysign(self.position.z);
            v.z = -v.z * WALL_RESTITUTION;
        }

        self.spin.update(SPIN_DRAG);
    }
}

/// Owns at most one live splatter burst.
pub struct SplatterEmitter {
    origin: Vec3,
    particles: Vec<SplatterParticle>,
    rng: StdRng,
}

impl Default for SplatterEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl SplatterEmitter {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            origin: Vec3::ZERO,
            particles: Vec::new(),
            rng,
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn particles(&self) -> &[SplatterParticle] {
        &self.particles
    }

    pub fn is_active(&self) -> bool {
        !self.particles.is_empty()
    }

    /// Burst above `target`, taking as many chunks as `budget` allows.
    /// A live burst is replaced.
    pub fn spawn(&mut self, target: Vec3, budget: &mut ParticleBudget) -> usize {
        self.clear(budget);
        let count = budget.acquire(budget.cap());
        self.origin = target + Vec3::Y * IMPACT_LIFT;

        let rng = &mut self.rng;
        self.particles.reserve(count);
        for _ in 0..count {
            let angle = rng.gen::<f32>() * TAU;
            let bias = rng.gen::<f32>() * 0.5 + 0.2;
            let speed = rng.gen::<f32>() * 0.2 + 0.1;
            let linear = Vec3::new(
                angle.cos() * speed * 2.0,
                bias + rng.gen::<f32>() * 0.3,
                angle.sin() * speed * 2.0,
            );
            let angles = Vec3::new(rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>()) * TAU;
            let angular = Vec3::new(
                rng.gen::<f32>() - 0.5,
                rng.gen::<f32>() - 0.5,
                rng.gen::<f32>() - 0.5,
            ) * 0.15;
            self.particles.push(SplatterParticle {
                position: Vec3::ZERO,
                velocity: Velocity::new(linear),
                spin: Spin::new(angles, angular),
                size: rng.gen::<f32>() * 0.25 + 0.05,
                chunk: rng.gen::<f32>() > 0.7,
                color: [0.8 + rng.gen::<f32>() * 0.2, rng.gen::<f32>() * 0.2, rng.gen::<f32>() * 0.2, 1.0],
            });
        }
        log::debug!("Splatter of {} chunks at {:?}", count, self.origin);
        count
    }

    pub fn update(&mut self) {
        for p in &mut self.particles {
            p.update();
        }
    }

    /// Tear the burst down and hand its chunks back to `budget`.
    pub fn clear(&mut self, budget: &mut ParticleBudget) {
        budget.release(self.particles.len());
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawned(seed: u64, cap: usize) -> (SplatterEmitter, ParticleBudget) {
        let mut budget = ParticleBudget::new(cap);
        let mut emitter = SplatterEmitter::with_seed(seed);
        emitter.spawn(Vec3::new(2.0, 0.0, 1.0), &mut budget);
        (emitter, budget)
    }

    #[test]
    fn splatter_spawns_full_tier_count_above_target() {
        let (emitter, budget) = spawned(1, 75);
        assert_eq!(emitter.particles().len(), 75);
        assert_eq!(budget.active(), 75);
        assert_eq!(emitter.origin(), Vec3::new(2.0, 1.0, 1.0));
        for p in emitter.particles() {
            assert!(p.velocity.linear.y >= 0.2);
            assert!((0.05..0.3).contains(&p.size));
            assert!(p.color[0] >= 0.8 && p.color[1] < 0.2 && p.color[2] < 0.2);
        }
    }

    #[test]
    fn splatter_stays_within_bounds() {
        let (mut emitter, _) = spawned(7, 75);
        for _ in 0..1500 {
            emitter.update();
            for p in emitter.particles() {
                assert!(p.position.y >= GROUND_Y);
                assert!(p.position.x.abs() <= WALL);
                assert!(p.position.z.abs() <= WALL);
            }
        }
    }

    #[test]
    fn splatter_does_not_fade() {
        let (mut emitter, budget) = spawned(3, 50);
        for _ in 0..5000 {
            emitter.update();
        }
        assert_eq!(emitter.particles().len(), 50);
        assert_eq!(budget.active(), 50);
    }

    #[test]
    fn splatter_spin_decays() {
        let (mut emitter, _) = spawned(9, 50);
        let before: f32 = emitter.particles().iter().map(|p| p.spin.angular.length()).sum();
        for _ in 0..100 {
            emitter.update();
        }
        let after: f32 = emitter.particles().iter().map(|p| p.spin.angular.length()).sum();
        assert!(after < before * 0.1);
    }

    #[test]
    fn splatter_respawn_and_clear_balance_budget() {
        let (mut emitter, mut budget) = spawned(5, 50);
        emitter.spawn(Vec3::ZERO, &mut budget);
        assert_eq!(budget.active(), 50);
        emitter.clear(&mut budget);
        assert_eq!(budget.active(), 0);
        assert!(!emitter.is_active());
    }
}
