//! Core types shared by the scene simulation crates.
//!
//! This crate provides:
//! - Transform and orientation helpers for ground-plane movement
//! - The simulation clock and host frame pacing
//! - Small components (velocity, spin, colors)

pub mod components;
pub mod time;
pub mod transform;

pub use components::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec3};
pub use hecs::{Entity, World};
