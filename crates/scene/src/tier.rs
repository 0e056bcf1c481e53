//! Device tiers and their parameter tables.
//!
//! Every cap, count and speed that depends on how capable the host is lives
//! here, in one table per tier.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Viewports narrower than this run the constrained table.
pub const CONSTRAINED_VIEWPORT_WIDTH: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceTier {
    Constrained,
    Full,
}

impl DeviceTier {
    pub fn from_constrained(constrained: bool) -> Self {
        if constrained {
            Self::Constrained
        } else {
            Self::Full
        }
    }

    pub fn from_viewport_width(width: u32) -> Self {
        Self::from_constrained(width < CONSTRAINED_VIEWPORT_WIDTH)
    }

    pub fn is_constrained(self) -> bool {
        self == Self::Constrained
    }

    pub fn params(self) -> &'static TierParams {
        match self {
            Self::Constrained => &CONSTRAINED,
            Self::Full => &FULL,
        }
    }
}

/// Per-tier simulation constants.
#[derive(Debug, Clone, PartialEq)]
pub struct TierParams {
    // ── Explosions ──
    /// Global cap on live explosion particles.
    pub explosion_cap: usize,
    /// Live bursts allowed at once.
    pub max_bursts: usize,
    /// Ticks between burst spawns.
    pub burst_interval: u64,
    /// Particles per burst: `base + U[0, extra)` before budgeting.
    pub burst_base_count: usize,
    pub burst_extra_count: usize,
    /// Full width of the spawn volume on X and Z.
    pub burst_x_range: f32,
    pub burst_z_range: f32,
    /// Spawn height band.
    pub burst_y_min: f32,
    pub burst_y_max: f32,
    pub burst_speed_multiplier: f32,
    /// Particle size: `min + U * span`.
    pub spark_size_min: f32,
    pub spark_size_span: f32,
    /// Trailed particles allowed per burst.
    pub max_trails_per_burst: usize,

    // ── Impact splatter ──
    pub splatter_count: usize,

    // ── Crowd ──
    /// Agents steered per tick.
    pub steering_batch: usize,
    /// Fleeing agents are clamped to `±flee_bound` on X and Z.
    pub flee_bound: f32,
    /// Wander/spawn area: `x ∈ ±range`, `z ∈ ±range / 2`.
    pub wander_range: f32,
    /// Radius of the celebration formation circle.
    pub formation_radius: f32,

    // ── Actor ──
    pub actor_home: Vec3,
    /// Target used when the winner has no agent in the crowd yet.
    pub fallback_target: Vec3,
}

pub static CONSTRAINED: TierParams = TierParams {
    explosion_cap: 500,
    max_bursts: 5,
    burst_interval: 40,
    burst_base_count: 60,
    burst_extra_count: 20,
    burst_x_range: 10.0,
    burst_z_range: 6.0,
    burst_y_min: 3.0,
    burst_y_max: 8.0,
    burst_speed_multiplier: 0.8,
    spark_size_min: 0.03,
    spark_size_span: 0.08,
    max_trails_per_burst: 5,
    splatter_count: 50,
    steering_batch: 10,
    flee_bound: 8.0,
    wander_range: 5.0,
    formation_radius: 3.0,
    actor_home: Vec3::new(-5.0, 0.0, -5.0),
    fallback_target: Vec3::new(2.0, 0.0, 0.0),
};

pub static FULL: TierParams = TierParams {
    explosion_cap: 1000,
    max_bursts: 10,
    burst_interval: 30,
    burst_base_count: 100,
    burst_extra_count: 50,
    burst_x_range: 20.0,
    burst_z_range: 10.0,
    burst_y_min: 5.0,
    burst_y_max: 15.0,
    burst_speed_multiplier: 1.2,
    spark_size_min: 0.05,
    spark_size_span: 0.12,
    max_trails_per_burst: 15,
    splatter_count: 75,
    steering_batch: 20,
    flee_bound: 12.0,
    wander_range: 8.0,
    formation_radius: 4.5,
    actor_home: Vec3::new(-8.0, 0.0, -8.0),
    fallback_target: Vec3::new(3.0, 0.0, 0.0),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_from_viewport_width_threshold() {
        assert_eq!(DeviceTier::from_viewport_width(767), DeviceTier::Constrained);
        assert_eq!(DeviceTier::from_viewport_width(768), DeviceTier::Full);
    }

    #[test]
    fn constrained_table_is_never_larger() {
        let (c, f) = (DeviceTier::Constrained.params(), DeviceTier::Full.params());
        assert!(c.explosion_cap < f.explosion_cap);
        assert!(c.max_bursts < f.max_bursts);
        assert!(c.splatter_count < f.splatter_count);
        assert!(c.steering_batch < f.steering_batch);
        assert!(c.burst_interval > f.burst_interval);
    }
}
