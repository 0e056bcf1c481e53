//! Weapon pose: the attached blade's local orientation and the attack swing.
//!
//! The weapon is a child node of the actor. Its only animated channel is the
//! roll about local Z; everything else is fixed at the grip offset.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use glam::Vec3;
use hecs::Entity;

/// Grip offset from the actor's origin.
pub const WEAPON_OFFSET: Vec3 = Vec3::new(0.4, 0.9, 0.0);
/// Resting blade angle about local Z.
pub const REST_ANGLE: f32 = FRAC_PI_4;

/// Marks the weapon node and links it to its holder.
#[derive(Debug, Clone, Copy)]
pub struct Weapon {
    pub holder: Entity,
}

/// Which part of the swing a progress value falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwingPhase {
    Raise,
    Strike,
    Recover,
    Done,
}

/// Three-part swing: wind up over the shoulder, strike down, settle back.
///
/// Progress is normalized to `[0, 1]` over the attack duration. Each part
/// eases between its two key angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackCurve {
    /// Progress at which the raise ends and the strike begins.
    pub raise_end: f32,
    /// Progress at which the strike ends and recovery begins.
    pub strike_end: f32,
    /// Blade angle at the top of the wind-up.
    pub raised_angle: f32,
    /// Blade angle at the bottom of the strike.
    pub strike_angle: f32,
}

impl Default for AttackCurve {
    fn default() -> Self {
        Self {
            raise_end: 0.35,
            strike_end: 0.6,
            raised_angle: REST_ANGLE + PI / 1.5,
            strike_angle: REST_ANGLE - PI / 1.5,
        }
    }
}

impl AttackCurve {
    pub fn phase(&self, progress: f32) -> SwingPhase {
        if progress >= 1.0 {
            SwingPhase::Done
        } else if progress < self.raise_end {
            SwingPhase::Raise
        } else if progress < self.strike_end {
            SwingPhase::Strike
        } else {
            SwingPhase::Recover
        }
    }

    /// Blade angle about local Z at `progress`.
    pub fn angle(&self, progress: f32) -> f32 {
        let p = progress.clamp(0.0, 1.0);
        match self.phase(p) {
            SwingPhase::Raise => {
                let t = p / self.raise_end;
                lerp(REST_ANGLE, self.raised_angle, ease_out_cubic(t))
            }
            SwingPhase::Strike => {
                let t = (p - self.raise_end) / (self.strike_end - self.raise_end);
                lerp(self.raised_angle, self.strike_angle, ease_in_cubic(t))
            }
            SwingPhase::Recover => {
                let t = (p - self.strike_end) / (1.0 - self.strike_end);
                lerp(self.strike_angle, REST_ANGLE, ease_in_out_sine(t))
            }
            SwingPhase::Done => REST_ANGLE,
        }
    }
}

/// Blade angle during the celebration flourish.
pub fn flourish_angle(celebration_time: f32) -> f32 {
    REST_ANGLE + (celebration_time * 12.0).sin() * FRAC_PI_2
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

fn ease_in_cubic(t: f32) -> f32 {
    t * t * t
}

fn ease_in_out_sine(t: f32) -> f32 {
    -((PI * t).cos() - 1.0) / 2.0
}
