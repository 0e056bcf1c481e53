//! Common components shared by scene nodes and particles.

use glam::Vec3;

/// Per-tick linear velocity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Velocity {
    pub linear: Vec3,
}

impl Velocity {
    pub fn new(linear: Vec3) -> Self {
        Self { linear }
    }
}

/// Free rotation about all three axes with a decaying angular velocity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spin {
    /// Accumulated Euler angles (radians).
    pub angles: Vec3,
    /// Radians added per tick.
    pub angular: Vec3,
}

impl Spin {
    pub fn new(angles: Vec3, angular: Vec3) -> Self {
        Self { angles, angular }
    }

    /// Integrate one tick, then apply drag to the angular velocity.
    pub fn update(&mut self, drag: f32) {
        self.angles += self.angular;
        self.angular *= drag;
    }

    /// Scale the angular velocity (impact damping).
    pub fn damp(&mut self, factor: f32) {
        self.angular *= factor;
    }
}

/// Linear RGBA color.
pub type Rgba = [f32; 4];

/// Parse a `#rrggbb` hex string. Returns `None` for anything else.
pub fn rgba_from_hex(hex: &str) -> Option<Rgba> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| -> Option<f32> {
        u8::from_str_radix(digits.get(i..i + 2)?, 16)
            .ok()
            .map(|v| v as f32 / 255.0)
    };
    Some([channel(0)?, channel(2)?, channel(4)?, 1.0])
}
