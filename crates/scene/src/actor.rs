//! The protagonist: a stage machine that runs the actor to the winner,
//! swings the weapon, and celebrates.
//!
//! The actor's body and weapon are nodes in the scene arena. [`Actor`] holds
//! their handles plus the per-stage timers, and every tick poses both nodes
//! for the current [`AnimationStage`]. Timed transitions are stored deadlines
//! checked against the simulation clock, each tagged with the stage and cycle
//! it was armed in so a reset in between makes it stale.

use engine_core::{heading_of, planar, planar_distance, Orientation, Transform, NOMINAL_DT};
use glam::Vec3;
use hecs::{Entity, World};

use crate::state::{AnimationStage, AnimationState};
use crate::weapon::{flourish_angle, AttackCurve, Weapon, REST_ANGLE, WEAPON_OFFSET};

/// Horizontal distance covered per tick while running.
pub const RUN_SPEED: f32 = 0.15;
/// Distance at which the run ends and the attack begins.
pub const ATTACK_RANGE: f32 = 1.5;
/// How far short of the target the actor plants itself.
pub const STAND_OFF: f32 = 1.0;
/// Delay before leaving preparation.
pub const PREPARATION_DELAY: f32 = 1.0;
/// Dwell after the swing before celebrating.
pub const AFTER_ATTACK_DWELL: f32 = 1.5;
/// Step back per tick after the swing.
pub const RECOIL_STEP: f32 = 0.02;
/// Yaw added per tick while celebrating.
pub const CELEBRATION_SPIN: f32 = 0.1;

/// Marks the actor's body node.
#[derive(Debug, Clone, Copy)]
pub struct ActorBody;

/// A one-shot transition armed in a given stage and cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Deadline {
    at: f32,
    stage: AnimationStage,
    cycle: u64,
}

impl Deadline {
    fn arm(now: f32, delay: f32, state: &AnimationState) -> Self {
        Self {
            at: now + delay,
            stage: state.stage(),
            cycle: state.cycle(),
        }
    }

    /// Due only if the clock has passed it and the state has not moved on.
    fn is_due(&self, now: f32, state: &AnimationState) -> bool {
        now >= self.at && state.stage() == self.stage && state.cycle() == self.cycle
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct StageTimers {
    /// Armed once on entering preparation.
    preparation: Option<Deadline>,
    attack_started: Option<f32>,
    after_attack_started: Option<f32>,
    running_time: f32,
    celebration_time: f32,
}

/// Body and weapon transforms, read out of the arena for one tick.
#[derive(Debug, Clone, Copy)]
struct Pose {
    body: Transform,
    weapon: Option<Transform>,
}

/// The protagonist's stage sequencer.
pub struct Actor {
    home: Vec3,
    body: Option<Entity>,
    weapon: Option<Entity>,
    timers: StageTimers,
    /// Last target seen; kept when the live target goes missing.
    latched_target: Option<Vec3>,
    attack_duration: f32,
    curve: AttackCurve,
    /// Animation cycle the timers belong to.
    cycle: u64,
}

impl Actor {
    pub fn new(home: Vec3, attack_duration: f32) -> Self {
        Self {
            home,
            body: None,
            weapon: None,
            timers: StageTimers::default(),
            latched_target: None,
            attack_duration: attack_duration.max(f32::EPSILON),
            curve: AttackCurve::default(),
            cycle: 0,
        }
    }

    pub fn with_curve(mut self, curve: AttackCurve) -> Self {
        self.curve = curve;
        self
    }

    /// Spawn the body and weapon nodes. No-op if already spawned.
    pub fn materialize(&mut self, world: &mut World) {
        if self.body.is_some_and(|b| world.contains(b)) {
            return;
        }
        let body = world.spawn((Transform::from_position(self.home), ActorBody));
        let weapon = world.spawn((
            Transform::from_position_orientation(WEAPON_OFFSET, Orientation::new(0.0, 0.0, REST_ANGLE)),
            Weapon { holder: body },
        ));
        self.body = Some(body);
        self.weapon = Some(weapon);
        log::debug!("Actor materialized at {:?}", self.home);
    }

    /// Remove the body and weapon nodes from the arena.
    pub fn despawn(&mut self, world: &mut World) {
        for e in [self.body.take(), self.weapon.take()].into_iter().flatten() {
            world.despawn(e).ok();
        }
    }

    pub fn body(&self) -> Option<Entity> {
        self.body
    }

    pub fn weapon(&self) -> Option<Entity> {
        self.weapon
    }

    pub fn home(&self) -> Vec3 {
        self.home
    }

    /// Move the rest position (tier change). Takes effect on the next idle tick.
    pub fn set_home(&mut self, home: Vec3) {
        self.home = home;
    }

    pub fn latched_target(&self) -> Option<Vec3> {
        self.latched_target
    }

    pub fn attack_duration(&self) -> f32 {
        self.attack_duration
    }

    /// World position of the body, if materialized.
    pub fn position(&self, world: &World) -> Option<Vec3> {
        let body = self.body?;
        world.get::<&Transform>(body).ok().map(|t| t.position)
    }

    /// Blade angle about local Z, if the weapon is materialized.
    pub fn weapon_angle(&self, world: &World) -> Option<f32> {
        let weapon = self.weapon?;
        world.get::<&Transform>(weapon).ok().map(|t| t.orientation.z)
    }

    /// Advance one tick.
    ///
    /// `target` is the winner's live position, if any. `now` is the simulation
    /// clock in seconds. Does nothing if the body has not been materialized.
    pub fn update(
        &mut self,
        world: &mut World,
        state: &mut AnimationState,
        target: Option<Vec3>,
        now: f32,
    ) {
        let Some(mut pose) = self.read_pose(world) else {
            return;
        };

        if self.cycle != state.cycle() {
            self.timers = StageTimers::default();
            self.cycle = state.cycle();
        }
        if let Some(t) = target {
            self.latched_target = Some(t);
        }

        match state.stage() {
            AnimationStage::Idle => self.idle(&mut pose, state),
            AnimationStage::Preparation => self.prepare(&mut pose, state, now),
            AnimationStage::Running => self.run(&mut pose, state, now),
            AnimationStage::Attacking => self.attack(&mut pose, state, now),
            AnimationStage::AfterAttack => self.recover(&mut pose, state, now),
            AnimationStage::Celebrating => self.celebrate(&mut pose),
        }

        self.write_pose(world, &pose);
    }

    fn idle(&mut self, pose: &mut Pose, state: &mut AnimationState) {
        pose.body.reset_to(self.home);
        if let Some(w) = pose.weapon.as_mut() {
            w.orientation = Orientation::ZERO;
        }
        self.timers = StageTimers::default();
        if state.actor_reached_target() {
            state.set_actor_reached_target(false);
        }
    }

    fn prepare(&mut self, pose: &mut Pose, state: &mut AnimationState, now: f32) {
        pose.body.position.y = self.home.y + (now * 3.0).sin() * 0.05;

        match self.timers.preparation {
            None => {
                self.timers.preparation = Some(Deadline::arm(now, PREPARATION_DELAY, state));
            }
            Some(deadline) if deadline.is_due(now, state) => {
                state.advance_to_next_stage();
            }
            Some(_) => {}
        }
    }

    fn run(&mut self, pose: &mut Pose, state: &mut AnimationState, now: f32) {
        let Some(target) = self.latched_target else {
            return;
        };
        let body = &mut pose.body;
        let direction = planar(target - body.position).normalize_or_zero();
        let distance = planar_distance(body.position, target);
        state.set_actor_distance_to_target(distance);

        if distance < ATTACK_RANGE {
            let stand = target - direction * STAND_OFF;
            body.position = Vec3::new(stand.x, self.home.y, stand.z);
            body.orientation.y = heading_of(direction);
            state.set_actor_reached_target(true);
            state.advance_to_next_stage();
            self.timers.attack_started = Some(now);
            log::debug!("Actor reached target at distance {:.2}", distance);
            return;
        }

        self.timers.running_time += NOMINAL_DT;
        body.position.x += direction.x * RUN_SPEED;
        body.position.z += direction.z * RUN_SPEED;
        body.position.y = self.home.y + (self.timers.running_time * 10.0).sin().abs() * 0.2;
        body.face_direction(direction);
    }

    fn attack(&mut self, pose: &mut Pose, state: &mut AnimationState, now: f32) {
        let Some(weapon) = pose.weapon.as_mut() else {
            return;
        };
        let body = &mut pose.body;
        if let Some(target) = self.latched_target {
            body.face_direction(planar(target - body.position));
        }

        let started = *self.timers.attack_started.get_or_insert(now);
        let progress = (now - started) / self.attack_duration;
        if progress >= 1.0 {
            state.advance_to_next_stage();
            self.timers.after_attack_started = Some(now);
            return;
        }

        weapon.orientation.z = self.curve.angle(progress);
        body.position.y = self.home.y + (now * 10.0).sin() * 0.1;
        body.orientation.z = (now * 8.0).sin() * 0.1;
    }

    fn recover(&mut self, pose: &mut Pose, state: &mut AnimationState, now: f32) {
        if let Some(w) = pose.weapon.as_mut() {
            w.orientation.z = REST_ANGLE;
        }
        let body = &mut pose.body;
        body.orientation.z = 0.0;
        body.position.y = self.home.y;

        let back = planar(self.home - body.position);
        let room = back.length();
        if room > 0.0 {
            body.position += back / room * RECOIL_STEP.min(room);
        }

        let started = *self.timers.after_attack_started.get_or_insert(now);
        if now - started > AFTER_ATTACK_DWELL {
            state.advance_to_next_stage();
        }
    }

    fn celebrate(&mut self, pose: &mut Pose) {
        self.timers.celebration_time += NOMINAL_DT;
        let c = self.timers.celebration_time;
        pose.body.position.y = self.home.y + (c * 5.0).sin().abs() * 0.7;
        pose.body.orientation.y += CELEBRATION_SPIN;
        if let Some(w) = pose.weapon.as_mut() {
            w.orientation.z = flourish_angle(c);
        }
    }

    fn read_pose(&self, world: &World) -> Option<Pose> {
        let body = *world.get::<&Transform>(self.body?).ok()?;
        let weapon = self
            .weapon
            .and_then(|w| world.get::<&Transform>(w).ok().map(|t| *t));
        Some(Pose { body, weapon })
    }

    fn write_pose(&self, world: &mut World, pose: &Pose) {
        if let Some(body) = self.body {
            if let Ok(t) = world.query_one_mut::<&mut Transform>(body) {
                *t = pose.body;
            }
        }
        if let (Some(weapon), Some(local)) = (self.weapon, pose.weapon) {
            if let Ok(t) = world.query_one_mut::<&mut Transform>(weapon) {
                *t = local;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::SimClock;

    struct Rig {
        world: World,
        state: AnimationState,
        actor: Actor,
        clock: SimClock,
    }

    impl Rig {
        fn new() -> Self {
            let mut world = World::new();
            let mut actor = Actor::new(Vec3::new(-8.0, 0.0, -8.0), 1.5);
            actor.materialize(&mut world);
            Self {
                world,
                state: AnimationState::new(),
                actor,
                clock: SimClock::new(),
            }
        }

        fn tick(&mut self, target: Option<Vec3>) {
            self.clock.step();
            let now = self.clock.elapsed_seconds();
            self.actor.update(&mut self.world, &mut self.state, target, now);
        }

        fn tick_until(&mut self, stage: AnimationStage, target: Option<Vec3>, limit: usize) -> usize {
            for i in 0..limit {
                if self.state.stage() == stage {
                    return i;
                }
                self.tick(target);
            }
            panic!("never reached {stage}, stuck in {}", self.state.stage());
        }

        fn position(&self) -> Vec3 {
            self.actor.position(&self.world).unwrap()
        }
    }

    const TARGET: Vec3 = Vec3::new(3.0, 0.0, 0.0);

    #[test]
    fn preparation_waits_one_second() {
        let mut rig = Rig::new();
        rig.state.start_animation();
        let ticks = rig.tick_until(AnimationStage::Running, Some(TARGET), 200);
        let seconds = ticks as f32 * NOMINAL_DT;
        assert!((1.0..1.1).contains(&seconds), "left preparation after {seconds}s");
    }

    #[test]
    fn stale_preparation_deadline_is_ignored_after_restart() {
        let mut rig = Rig::new();
        rig.state.start_animation();
        for _ in 0..40 {
            rig.tick(Some(TARGET));
        }
        // Restart mid-preparation: the old deadline must not fire early.
        rig.state.stop_animation();
        rig.tick(Some(TARGET));
        rig.state.start_animation();
        let ticks = rig.tick_until(AnimationStage::Running, Some(TARGET), 200);
        assert!(ticks as f32 * NOMINAL_DT >= 1.0);
    }

    #[test]
    fn running_distance_strictly_decreases_then_attacks() {
        let mut rig = Rig::new();
        rig.state.start_animation();
        rig.tick_until(AnimationStage::Running, Some(TARGET), 200);

        let mut last = planar_distance(rig.position(), TARGET);
        while rig.state.stage() == AnimationStage::Running {
            let before = planar_distance(rig.position(), TARGET);
            rig.tick(Some(TARGET));
            if rig.state.stage() == AnimationStage::Running {
                let now = planar_distance(rig.position(), TARGET);
                assert!(now < last, "distance went {last} -> {now}");
                last = now;
            } else {
                assert!(before < ATTACK_RANGE);
            }
        }
        assert_eq!(rig.state.stage(), AnimationStage::Attacking);
        assert!(rig.state.actor_reached_target());
        let stand = planar_distance(rig.position(), TARGET);
        assert!((stand - STAND_OFF).abs() < 1e-4);
    }

    #[test]
    fn running_publishes_distance_every_tick() {
        let mut rig = Rig::new();
        rig.state.start_animation();
        rig.tick_until(AnimationStage::Running, Some(TARGET), 200);
        rig.tick(Some(TARGET));
        let published = rig.state.actor_distance_to_target();
        assert!(published.is_finite());
        let expected = planar_distance(rig.position(), TARGET) + RUN_SPEED;
        assert!((published - expected).abs() < 1e-3);
    }

    #[test]
    fn running_without_any_target_holds_position() {
        let mut rig = Rig::new();
        rig.state.start_animation();
        rig.tick_until(AnimationStage::Running, None, 200);
        let before = rig.position();
        for _ in 0..30 {
            rig.tick(None);
        }
        assert_eq!(rig.state.stage(), AnimationStage::Running);
        assert_eq!(planar(rig.position()), planar(before));
    }

    #[test]
    fn running_time_only_accumulates_while_running() {
        let mut rig = Rig::new();
        rig.state.start_animation();
        rig.tick_until(AnimationStage::Running, Some(TARGET), 200);
        assert_eq!(rig.actor.timers.running_time, 0.0);

        for _ in 0..5 {
            rig.tick(Some(TARGET));
        }
        assert_eq!(rig.state.stage(), AnimationStage::Running);
        assert!((rig.actor.timers.running_time - 5.0 * NOMINAL_DT).abs() < 1e-6);

        rig.tick_until(AnimationStage::AfterAttack, Some(TARGET), 500);
        let frozen = rig.actor.timers.running_time;
        for _ in 0..10 {
            rig.tick(Some(TARGET));
        }
        assert_eq!(rig.actor.timers.running_time, frozen);
    }

    #[test]
    fn latched_target_survives_missing_frames() {
        let mut rig = Rig::new();
        rig.state.start_animation();
        rig.tick(Some(TARGET));
        rig.tick_until(AnimationStage::Attacking, None, 500);
        assert_eq!(rig.actor.latched_target(), Some(TARGET));
    }

    #[test]
    fn attack_completion_fires_one_transition_without_weapon_update() {
        let mut rig = Rig::new();
        rig.state.start_animation();
        rig.tick_until(AnimationStage::Attacking, Some(TARGET), 500);
        rig.state.drain_events();

        let mut last_angle = rig.actor.weapon_angle(&rig.world).unwrap();
        while rig.state.stage() == AnimationStage::Attacking {
            last_angle = rig.actor.weapon_angle(&rig.world).unwrap();
            rig.tick(Some(TARGET));
        }
        assert_eq!(rig.state.stage(), AnimationStage::AfterAttack);
        assert!(rig.state.show_blood());
        // The transition tick left the blade where the last swing tick put it.
        assert_eq!(rig.actor.weapon_angle(&rig.world).unwrap(), last_angle);
        let changes = rig
            .state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, crate::state::StageEvent::StageChanged { .. }))
            .count();
        assert_eq!(changes, 1);
    }

    #[test]
    fn after_attack_recoils_toward_home_without_passing_it() {
        let mut rig = Rig::new();
        rig.state.start_animation();
        rig.tick_until(AnimationStage::AfterAttack, Some(TARGET), 800);
        let start = planar_distance(rig.position(), rig.actor.home());
        rig.tick(Some(TARGET));
        let after = planar_distance(rig.position(), rig.actor.home());
        assert!((start - after - RECOIL_STEP).abs() < 1e-4);
        assert_eq!(rig.actor.weapon_angle(&rig.world), Some(REST_ANGLE));
    }

    #[test]
    fn full_cycle_reaches_celebration_with_fireworks() {
        let mut rig = Rig::new();
        rig.state.start_animation();
        rig.tick_until(AnimationStage::Celebrating, Some(TARGET), 1000);
        assert!(rig.state.show_blood());
        assert!(rig.state.show_fireworks());
        let yaw = rig.world.get::<&Transform>(rig.actor.body().unwrap()).unwrap().orientation.y;
        rig.tick(Some(TARGET));
        let yaw2 = rig.world.get::<&Transform>(rig.actor.body().unwrap()).unwrap().orientation.y;
        assert!((yaw2 - yaw - CELEBRATION_SPIN).abs() < 1e-5);
    }

    #[test]
    fn reset_snaps_to_neutral_pose() {
        let mut rig = Rig::new();
        rig.state.start_animation();
        rig.tick_until(AnimationStage::Celebrating, Some(TARGET), 1000);
        rig.state.stop_animation();
        rig.tick(Some(TARGET));
        let body = *rig.world.get::<&Transform>(rig.actor.body().unwrap()).unwrap();
        assert_eq!(body.position, rig.actor.home());
        assert_eq!(body.orientation, Orientation::ZERO);
        assert_eq!(rig.actor.weapon_angle(&rig.world), Some(0.0));
        assert!(!rig.state.actor_reached_target());
    }

    #[test]
    fn unmaterialized_actor_is_a_noop() {
        let mut world = World::new();
        let mut state = AnimationState::new();
        let mut actor = Actor::new(Vec3::ZERO, 1.5);
        state.start_animation();
        for i in 0..200 {
            actor.update(&mut world, &mut state, Some(TARGET), i as f32 * NOMINAL_DT);
        }
        assert_eq!(state.stage(), AnimationStage::Preparation);
        assert!(actor.latched_target().is_none());
    }
}
