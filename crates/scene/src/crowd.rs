//! Crowd of bystanders: one arena entity per roster name.
//!
//! Steering runs in rotating batches while an animation is in progress.
//! Bystanders flee from the winner until the blood shows, then drift back to
//! the center and wander between random waypoints. During the celebration
//! they jump and spin (or gather into a circle first, see
//! [`CelebrationStyle::Formation`]).

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::f32::consts::{PI, TAU};
use std::hash::{Hash, Hasher};

use engine_core::{heading_of, planar, planar_distance, Transform, NOMINAL_DT};
use glam::Vec3;
use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::CelebrationStyle;
use crate::state::{AnimationStage, AnimationState};
use crate::tier::TierParams;

/// Bystanders farther than this from the center walk back first.
pub const CENTER_RADIUS: f32 = 3.0;
/// A waypoint closer than this counts as reached.
pub const WAYPOINT_REACHED: f32 = 0.5;
/// Flee speed relative to the agent's base speed.
pub const FLEE_FACTOR: f32 = 1.5;

/// Per-agent steering and celebration state.
#[derive(Debug, Clone)]
pub struct Agent {
    pub name: String,
    /// Distance per tick, fixed at spawn.
    pub speed: f32,
    pub waypoint: Option<Vec3>,
    /// Celebration clock; starts at a random phase on first use.
    pub celebration_phase: Option<f32>,
    /// Arm pitch for the celebration wave.
    pub arm_swing: f32,
}

/// Names that joined and left on a roster sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl RosterDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

pub struct Crowd {
    index: HashMap<String, Entity>,
    /// Roster order; batches are slices of this.
    order: Vec<String>,
    cursor: usize,
    style: CelebrationStyle,
    rng: StdRng,
}

impl Crowd {
    pub fn new(style: CelebrationStyle) -> Self {
        Self::with_rng(style, StdRng::from_entropy())
    }

    pub fn with_seed(style: CelebrationStyle, seed: u64) -> Self {
        Self::with_rng(style, StdRng::seed_from_u64(seed))
    }

    fn with_rng(style: CelebrationStyle, rng: StdRng) -> Self {
        Self {
            index: HashMap::new(),
            order: Vec::new(),
            cursor: 0,
            style,
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn entity(&self, name: &str) -> Option<Entity> {
        self.index.get(name).copied()
    }

    pub fn style(&self) -> CelebrationStyle {
        self.style
    }

    pub fn position_of(&self, world: &World, name: &str) -> Option<Vec3> {
        let e = self.entity(name)?;
        world.get::<&Transform>(e).ok().map(|t| t.position)
    }

    /// Bring the arena in line with `names`. Duplicates after the first are
    /// ignored. New agents spawn at a random spot in the wander area.
    pub fn sync_roster(&mut self, world: &mut World, names: &[String], params: &TierParams) -> RosterDiff {
        let mut seen = HashSet::new();
        let order: Vec<String> = names.iter().filter(|n| seen.insert(n.as_str())).cloned().collect();

        let mut diff = RosterDiff::default();
        let stale: Vec<String> = self
            .index
            .keys()
            .filter(|n| !seen.contains(n.as_str()))
            .cloned()
            .collect();
        for name in stale {
            if let Some(e) = self.index.remove(&name) {
                world.despawn(e).ok();
            }
            diff.removed.push(name);
        }

        for name in &order {
            if self.index.contains_key(name) {
                continue;
            }
            let position = random_point(&mut self.rng, params.wander_range);
            let agent = Agent {
                name: name.clone(),
                speed: self.rng.gen_range(0.03..0.05),
                waypoint: None,
                celebration_phase: None,
                arm_swing: 0.0,
            };
            let e = world.spawn((Transform::from_position(position), agent));
            self.index.insert(name.clone(), e);
            diff.added.push(name.clone());
        }

        self.order = order;
        if !diff.is_empty() {
            let batch = params.steering_batch.max(1);
            if self.cursor * batch >= self.order.len() {
                self.cursor = 0;
            }
            log::debug!(
                "Crowd roster: +{} -{} ({} agents)",
                diff.added.len(),
                diff.removed.len(),
                self.order.len()
            );
        }
        diff
    }

    /// Despawn every agent.
    pub fn clear(&mut self, world: &mut World) {
        for (_, e) in self.index.drain() {
            world.despawn(e).ok();
        }
        self.order.clear();
        self.cursor = 0;
    }

    /// Steer one batch of bystanders. Does nothing unless an animation is
    /// running past idle.
    pub fn steer(&mut self, world: &mut World, state: &AnimationState, winner: Option<&str>, params: &TierParams) {
        if !state.is_animating() || state.stage() == AnimationStage::Idle || self.order.is_empty() {
            return;
        }

        let batch = params.steering_batch.max(1);
        let batches = self.order.len().div_ceil(batch);
        if self.cursor >= batches {
            self.cursor = 0;
        }
        let start = self.cursor * batch;
        let end = (start + batch).min(self.order.len());

        let flee_from = match winner {
            Some(w) if !state.show_blood() => self.position_of(world, w),
            _ => None,
        };
        let gathering = self.style == CelebrationStyle::Formation && state.stage() == AnimationStage::Celebrating;

        for name in &self.order[start..end] {
            if Some(name.as_str()) == winner || (gathering && flee_from.is_none()) {
                continue;
            }
            let Some(&e) = self.index.get(name) else {
                continue;
            };
            let Ok((transform, agent)) = world.query_one_mut::<(&mut Transform, &mut Agent)>(e) else {
                continue;
            };

            if let Some(threat) = flee_from {
                let away = planar(transform.position - threat).normalize_or_zero();
                let bound = params.flee_bound;
                let step = away * agent.speed * FLEE_FACTOR;
                transform.position.x = (transform.position.x + step.x).clamp(-bound, bound);
                transform.position.z = (transform.position.z + step.z).clamp(-bound, bound);
                transform.position.y = 0.0;
                if away != Vec3::ZERO {
                    transform.orientation.y = heading_of(away) + PI;
                }
                continue;
            }

            let here = transform.position;
            let goal = if planar_distance(here, Vec3::ZERO) > CENTER_RADIUS {
                Vec3::ZERO
            } else {
                let reached = agent
                    .waypoint
                    .map_or(true, |w| planar_distance(here, w) < WAYPOINT_REACHED);
                if reached {
                    agent.waypoint = Some(random_point(&mut self.rng, params.wander_range));
                }
                agent.waypoint.unwrap_or(Vec3::ZERO)
            };
            let dir = planar(goal - here).normalize_or_zero();
            transform.position += dir * agent.speed;
            transform.position.y = 0.0;
            transform.face_direction(dir);
        }

        self.cursor = (self.cursor + 1) % batches;
    }

    /// Celebration pose for every bystander. Only acts while celebrating.
    pub fn celebrate(&mut self, world: &mut World, state: &AnimationState, winner: Option<&str>, params: &TierParams) {
        if state.stage() != AnimationStage::Celebrating {
            return;
        }
        let slots = match self.style {
            CelebrationStyle::Formation => self.formation_slots(winner, params.formation_radius),
            CelebrationStyle::JumpSpin => HashMap::new(),
        };
        let rng = &mut self.rng;

        for (name, &e) in &self.index {
            if Some(name.as_str()) == winner {
                continue;
            }
            let Ok((transform, agent)) = world.query_one_mut::<(&mut Transform, &mut Agent)>(e) else {
                continue;
            };

            if let Some(&slot) = slots.get(name) {
                let offset = planar(slot - transform.position);
                let gap = offset.length();
                if gap > f32::EPSILON {
                    transform.position += offset / gap * agent.speed.min(gap);
                }
            }

            let p = agent
                .celebration_phase
                .get_or_insert_with(|| rng.gen::<f32>() * PI);
            *p += NOMINAL_DT;
            let p = *p;
            transform.position.y = (p * 5.0).sin().abs() * 0.5;
            transform.orientation.y += NOMINAL_DT * 2.0;
            transform.orientation.z = (p * 5.0).sin() * 0.1;
            agent.arm_swing = (p * 8.0).sin() * 0.3;
        }
    }

    /// Clear celebration poses and waypoints, dropping everyone back to the ground.
    pub fn reset_pose(&mut self, world: &mut World) {
        for (_, (transform, agent)) in world.query_mut::<(&mut Transform, &mut Agent)>() {
            transform.position.y = 0.0;
            transform.orientation.x = 0.0;
            transform.orientation.z = 0.0;
            agent.celebration_phase = None;
            agent.arm_swing = 0.0;
            agent.waypoint = None;
        }
        self.cursor = 0;
    }

    /// Evenly spaced circle slots, assigned by name-hash rank.
    pub fn formation_slots(&self, winner: Option<&str>, radius: f32) -> HashMap<String, Vec3> {
        let mut ranked: Vec<(u64, &String)> = self
            .order
            .iter()
            .filter(|n| Some(n.as_str()) != winner)
            .map(|n| (name_hash(n), n))
            .collect();
        ranked.sort();
        let count = ranked.len().max(1) as f32;
        ranked
            .into_iter()
            .enumerate()
            .map(|(rank, (_, name))| {
                let a = TAU * rank as f32 / count;
                (name.clone(), Vec3::new(a.cos() * radius, 0.0, a.sin() * radius))
            })
            .collect()
    }
}

/// Random ground point with `x ∈ ±range` and `z ∈ ±range / 2`.
fn random_point(rng: &mut impl Rng, range: f32) -> Vec3 {
    Vec3::new(
        (rng.gen::<f32>() - 0.5) * range * 2.0,
        0.0,
        (rng.gen::<f32>() - 0.5) * range,
    )
}

fn name_hash(name: &str) -> u64 {
    let mut h = DefaultHasher::new();
    name.hash(&mut h);
    h.finish()
}
