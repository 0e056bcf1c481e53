//! Render sink records: per-frame instance data for every visible node and
//! particle, ready for instanced drawing.

use std::collections::BTreeMap;

use bytemuck::{Pod, Zeroable};
use engine_core::{Orientation, Rgba, Transform};
use glam::{Mat4, Quat, Vec3};

use crate::fireworks::{palette_color, FireworksEmitter};
use crate::splatter::SplatterEmitter;

/// Opacity of untrailed sparks.
pub const SPARK_OPACITY: f32 = 0.8;

pub const ACTOR_COLOR: Rgba = [0.85, 0.12, 0.1, 1.0];
pub const WEAPON_COLOR: Rgba = [0.75, 0.78, 0.82, 1.0];
pub const AGENT_COLOR: Rgba = [0.1, 0.1, 0.1, 1.0];

/// Instance data for instanced rendering.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    /// Model matrix (4x4, column major).
    pub model: [[f32; 4]; 4],
    /// RGB plus opacity.
    pub color: [f32; 4],
}

impl InstanceData {
    pub fn new(model: Mat4, color: Rgba) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color,
        }
    }

    pub fn translation(&self) -> Vec3 {
        Mat4::from_cols_array_2d(&self.model).w_axis.truncate()
    }
}

impl Default for InstanceData {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, [1.0; 4])
    }
}

/// Sparks sharing one palette color.
#[derive(Debug, Clone)]
pub struct SparkBatch {
    pub color: Rgba,
    pub instances: Vec<InstanceData>,
}

/// A trailed spark: drawn on its own with a fading polyline behind it.
#[derive(Debug, Clone)]
pub struct TrailRecord {
    pub head: InstanceData,
    /// Oldest point first.
    pub points: Vec<[f32; 3]>,
    pub line_opacity: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct SplatterInstance {
    pub instance: InstanceData,
    /// Cube chunk rather than a sphere.
    pub chunk: bool,
}

#[derive(Debug, Clone)]
pub struct AgentInstance {
    pub name: String,
    pub instance: InstanceData,
    pub arm_swing: f32,
}

/// Everything the host needs to draw one tick.
#[derive(Debug, Clone, Default)]
pub struct RenderFrame {
    pub actor: Option<InstanceData>,
    pub weapon: Option<InstanceData>,
    pub agents: Vec<AgentInstance>,
    pub spark_batches: Vec<SparkBatch>,
    pub trails: Vec<TrailRecord>,
    pub splatter: Vec<SplatterInstance>,
}

impl RenderFrame {
    pub fn spark_count(&self) -> usize {
        self.spark_batches.iter().map(|b| b.instances.len()).sum::<usize>() + self.trails.len()
    }

    pub fn instance_count(&self) -> usize {
        self.actor.iter().count()
            + self.weapon.iter().count()
            + self.agents.len()
            + self.spark_count()
            + self.splatter.len()
    }
}

/// World matrix of a child node given its parent and its local transform.
pub fn child_matrix(parent: &Transform, local: &Transform) -> Mat4 {
    parent.to_matrix() * local.to_matrix()
}

/// Untrailed sparks grouped by palette color, scaled by `size * life`.
pub fn spark_batches(emitter: &FireworksEmitter) -> Vec<SparkBatch> {
    let mut by_color: BTreeMap<usize, Vec<InstanceData>> = BTreeMap::new();
    for p in emitter.particles().filter(|p| p.trail.is_none()) {
        let mut color = palette_color(p.color);
        color[3] = SPARK_OPACITY;
        let model = Mat4::from_scale_rotation_translation(
            Vec3::splat(p.size * p.life),
            Quat::IDENTITY,
            p.position,
        );
        by_color.entry(p.color).or_default().push(InstanceData::new(model, color));
    }
    by_color
        .into_iter()
        .map(|(slot, instances)| SparkBatch {
            color: palette_color(slot),
            instances,
        })
        .collect()
}

/// Trailed sparks, each with its polyline.
pub fn spark_trails(emitter: &FireworksEmitter) -> Vec<TrailRecord> {
    emitter
        .particles()
        .filter_map(|p| {
            let trail = p.trail.as_ref()?;
            let mut color = palette_color(p.color);
            color[3] = p.life;
            let model = Mat4::from_scale_rotation_translation(
                Vec3::splat(p.size * p.life),
                Quat::IDENTITY,
                p.position,
            );
            Some(TrailRecord {
                head: InstanceData::new(model, color),
                points: trail.iter().map(|v| v.to_array()).collect(),
                line_opacity: p.life * 0.5,
            })
        })
        .collect()
}

/// Splatter chunks in world space.
pub fn splatter_instances(emitter: &SplatterEmitter) -> Vec<SplatterInstance> {
    let origin = emitter.origin();
    emitter
        .particles()
        .iter()
        .map(|p| {
            let a = p.spin.angles;
            let t = Transform {
                position: origin + p.position,
                orientation: Orientation::new(a.x, a.y, a.z),
                scale: Vec3::splat(p.size),
            };
            SplatterInstance {
                instance: InstanceData::new(t.to_matrix(), p.color),
                chunk: p.chunk,
            }
        })
        .collect()
}
