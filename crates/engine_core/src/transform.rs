//! Transform component and utilities for spatial positioning.

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Euler orientation in radians, applied in X, Y, Z order.
///
/// Poses in the scene are authored per axis (yaw to face a direction, roll
/// for a body sway, a weapon swing about Z), so the angles are stored directly
/// and only folded into a quaternion when the render record is built.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Orientation {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Pure yaw about the up axis.
    pub fn yaw(y: f32) -> Self {
        Self { y, ..Self::ZERO }
    }

    pub fn to_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.x, self.y, self.z)
    }
}

/// A 3D transform representing position, orientation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub orientation: Orientation,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Orientation::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and orientation.
    pub fn from_position_orientation(position: Vec3, orientation: Orientation) -> Self {
        Self {
            position,
            orientation,
            ..Default::default()
        }
    }

    pub fn rotation(&self) -> Quat {
        self.orientation.to_quat()
    }

    /// Create the model matrix for this transform.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation(), self.position)
    }

    /// Translate the transform by a delta.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Turn to face along `direction` on the ground plane.
    ///
    /// Yaw follows the `atan2(x, z)` convention, so a direction of +Z is a yaw
    /// of zero. Zero-length directions leave the heading untouched.
    pub fn face_direction(&mut self, direction: Vec3) {
        if direction.x * direction.x + direction.z * direction.z > 1e-8 {
            self.orientation.y = heading_of(direction);
        }
    }

    /// Snap back to the given position with no rotation.
    pub fn reset_to(&mut self, position: Vec3) {
        self.position = position;
        self.orientation = Orientation::ZERO;
    }
}

/// Yaw angle for a ground-plane direction.
pub fn heading_of(direction: Vec3) -> f32 {
    direction.x.atan2(direction.z)
}

/// Project a vector onto the ground plane.
pub fn planar(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Ground-plane distance between two points, ignoring height.
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    planar(b - a).length()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_direction_uses_atan2_x_z() {
        let mut t = Transform::default();
        t.face_direction(Vec3::X);
        assert!((t.orientation.y - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        t.face_direction(Vec3::Z);
        assert!(t.orientation.y.abs() < 1e-6);
    }

    #[test]
    fn face_direction_ignores_zero_vector() {
        let mut t = Transform::default();
        t.orientation.y = 1.25;
        t.face_direction(Vec3::Y);
        assert_eq!(t.orientation.y, 1.25);
    }

    #[test]
    fn planar_distance_ignores_height() {
        let d = planar_distance(Vec3::new(0.0, 5.0, 0.0), Vec3::new(3.0, -2.0, 4.0));
        assert!((d - 5.0).abs() < 1e-6);
    }
}
