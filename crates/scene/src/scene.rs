//! The scene: owns the arena, the shared animation state and every system,
//! and runs them in order once per tick.
//!
//! Tick order: crowd steering, actor sequencer, crowd celebration, then the
//! emitters (spawn, integrate, cull). Stage events queued by the sequencer
//! are handled at the end of each tick: the splatter mounts when the blood
//! shows, the fireworks when the celebration starts, and both are torn down
//! (budget returned) when an animation starts or stops.

use glam::Vec3;
use hecs::World;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use engine_core::Transform;

use crate::actor::Actor;
use crate::budget::ParticleBudgets;
use crate::config::SceneConfig;
use crate::crowd::{Agent, Crowd, RosterDiff};
use crate::fireworks::FireworksEmitter;
use crate::render::{
    child_matrix, spark_batches, spark_trails, splatter_instances, AgentInstance, InstanceData,
    RenderFrame, ACTOR_COLOR, AGENT_COLOR, WEAPON_COLOR,
};
use crate::splatter::SplatterEmitter;
use crate::state::{AnimationState, StageEvent};
use crate::tier::{DeviceTier, TierParams};

pub struct Scene {
    world: World,
    state: AnimationState,
    tier: DeviceTier,
    budgets: ParticleBudgets,
    actor: Actor,
    crowd: Crowd,
    fireworks: Option<FireworksEmitter>,
    splatter: Option<SplatterEmitter>,
    winner: Option<String>,
    /// Seeds every subsystem RNG, including emitters mounted later.
    seeds: StdRng,
    /// Events handled since the last drain.
    outbox: Vec<StageEvent>,
}

impl Scene {
    pub fn new(config: &SceneConfig) -> Self {
        let tier = config.tier();
        let params = tier.params();
        let mut seeds = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut world = World::new();
        let mut actor = Actor::new(params.actor_home, config.attack_duration);
        actor.materialize(&mut world);
        let crowd = Crowd::with_seed(config.celebration_style, seeds.gen());

        log::info!(
            "Scene ready: {:?} tier, attack {:.2}s, {:?} celebration",
            tier,
            config.attack_duration,
            config.celebration_style
        );
        Self {
            world,
            state: AnimationState::new(),
            tier,
            budgets: ParticleBudgets::for_tier(params),
            actor,
            crowd,
            fireworks: None,
            splatter: None,
            winner: None,
            seeds,
            outbox: Vec::new(),
        }
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn tier(&self) -> DeviceTier {
        self.tier
    }

    pub fn params(&self) -> &'static TierParams {
        self.tier.params()
    }

    pub fn budgets(&self) -> &ParticleBudgets {
        &self.budgets
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn crowd(&self) -> &Crowd {
        &self.crowd
    }

    pub fn fireworks(&self) -> Option<&FireworksEmitter> {
        self.fireworks.as_ref()
    }

    pub fn splatter(&self) -> Option<&SplatterEmitter> {
        self.splatter.as_ref()
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn set_roster(&mut self, names: &[String]) -> RosterDiff {
        self.crowd.sync_roster(&mut self.world, names, self.tier.params())
    }

    pub fn set_winner(&mut self, winner: Option<String>) {
        if let Some(w) = &winner {
            if self.crowd.entity(w).is_none() {
                log::warn!("Winner {:?} has no agent; actor will use the fallback target", w);
            }
        }
        self.winner = winner;
    }

    /// Switch parameter tables. Budget caps change at once; live particles
    /// above a lowered cap are kept. The actor picks up its new home on the
    /// next idle tick.
    pub fn set_tier(&mut self, tier: DeviceTier) {
        if tier == self.tier {
            return;
        }
        log::info!("Device tier {:?} -> {:?}", self.tier, tier);
        self.tier = tier;
        self.budgets.retier(tier.params());
        self.actor.set_home(tier.params().actor_home);
    }

    /// Where the actor should run: the winner's agent, or the tier fallback
    /// when the winner has none yet. `None` without a winner.
    pub fn target(&self) -> Option<Vec3> {
        let winner = self.winner.as_deref()?;
        Some(
            self.crowd
                .position_of(&self.world, winner)
                .unwrap_or(self.tier.params().fallback_target),
        )
    }

    pub fn start(&mut self) {
        self.state.start_animation();
        self.actor.materialize(&mut self.world);
        self.pump_events();
    }

    pub fn stop(&mut self) {
        self.state.stop_animation();
        self.crowd.reset_pose(&mut self.world);
        self.pump_events();
    }

    /// Advance one tick at simulation time `now` (seconds). Returns the
    /// events raised during the tick.
    pub fn tick(&mut self, now: f32) -> Vec<StageEvent> {
        let params = self.tier.params();
        let winner = self.winner.clone();
        let winner = winner.as_deref();

        self.crowd.steer(&mut self.world, &self.state, winner, params);
        let target = self.target();
        self.actor.update(&mut self.world, &mut self.state, target, now);
        self.crowd.celebrate(&mut self.world, &self.state, winner, params);
        self.pump_events();

        if let Some(fireworks) = self.fireworks.as_mut() {
            fireworks.update(&mut self.budgets.explosion, params);
        }
        if let Some(splatter) = self.splatter.as_mut() {
            splatter.update();
        }

        self.drain_events()
    }

    /// Take the events handled since the last drain.
    pub fn drain_events(&mut self) -> Vec<StageEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn pump_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                StageEvent::Started | StageEvent::Stopped => self.teardown_emitters(),
                StageEvent::BloodShown => self.mount_splatter(),
                StageEvent::FireworksShown => self.mount_fireworks(),
                StageEvent::AnimationComplete => {
                    log::info!("Animation complete (cycle {})", self.state.cycle());
                }
                StageEvent::StageChanged { .. } => {}
            }
            self.outbox.push(event);
        }
    }

    fn mount_splatter(&mut self) {
        let Some(at) = self.target().or(self.actor.latched_target()) else {
            log::warn!("Blood shown with no target; skipping splatter");
            return;
        };
        let mut splatter = SplatterEmitter::with_seed(self.seeds.gen());
        let count = splatter.spawn(at, &mut self.budgets.splatter);
        log::info!("Splatter mounted ({} chunks)", count);
        self.splatter = Some(splatter);
    }

    fn mount_fireworks(&mut self) {
        if self.fireworks.is_none() {
            self.fireworks = Some(FireworksEmitter::with_seed(self.seeds.gen()));
            log::info!("Fireworks mounted");
        }
    }

    fn teardown_emitters(&mut self) {
        if let Some(mut fireworks) = self.fireworks.take() {
            fireworks.clear(&mut self.budgets.explosion);
            log::debug!("Fireworks torn down");
        }
        if let Some(mut splatter) = self.splatter.take() {
            splatter.clear(&mut self.budgets.splatter);
            log::debug!("Splatter torn down");
        }
    }

    /// Snapshot of everything visible this tick.
    pub fn frame(&self) -> RenderFrame {
        let mut frame = RenderFrame::default();

        if let Some(body) = self.actor.body().and_then(|e| self.world.get::<&Transform>(e).ok()) {
            frame.actor = Some(InstanceData::new(body.to_matrix(), ACTOR_COLOR));
            if let Some(local) = self.actor.weapon().and_then(|e| self.world.get::<&Transform>(e).ok()) {
                frame.weapon = Some(InstanceData::new(child_matrix(&body, &local), WEAPON_COLOR));
            }
        }

        let hidden = if self.state.show_blood() { self.winner.as_deref() } else { None };
        for name in self.crowd.names() {
            if Some(name.as_str()) == hidden {
                continue;
            }
            let Some(e) = self.crowd.entity(name) else {
                continue;
            };
            let (Ok(t), Ok(agent)) = (self.world.get::<&Transform>(e), self.world.get::<&Agent>(e)) else {
                continue;
            };
            frame.agents.push(AgentInstance {
                name: name.clone(),
                instance: InstanceData::new(t.to_matrix(), AGENT_COLOR),
                arm_swing: agent.arm_swing,
            });
        }

        if let Some(fireworks) = &self.fireworks {
            frame.spark_batches = spark_batches(fireworks);
            frame.trails = spark_trails(fireworks);
        }
        if let Some(splatter) = &self.splatter {
            frame.splatter = splatter_instances(splatter);
        }
        frame
    }
}
