//! Shared animation state: the stage machine's current stage and the flags
//! the crowd and emitters key off.
//!
//! One `AnimationState` is owned by the scene and handed to each system's
//! update call. Systems read it through getters. Only the sequencer (and the
//! start/stop entry points) write it, and only through the setters below.
//! Every change is also queued as a [`StageEvent`] so the scene can react
//! (mount emitters, report completion) without polling each field.

use std::fmt;

/// One stage of the actor's sequence, in order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnimationStage {
    #[default]
    Idle,
    Preparation,
    Running,
    Attacking,
    AfterAttack,
    Celebrating,
}

impl AnimationStage {
    pub const ALL: [AnimationStage; 6] = [
        Self::Idle,
        Self::Preparation,
        Self::Running,
        Self::Attacking,
        Self::AfterAttack,
        Self::Celebrating,
    ];

    /// The stage that follows this one. `Celebrating` is terminal.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Preparation),
            Self::Preparation => Some(Self::Running),
            Self::Running => Some(Self::Attacking),
            Self::Attacking => Some(Self::AfterAttack),
            Self::AfterAttack => Some(Self::Celebrating),
            Self::Celebrating => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Preparation => "preparation",
            Self::Running => "running",
            Self::Attacking => "attacking",
            Self::AfterAttack => "afterAttack",
            Self::Celebrating => "celebrating",
        }
    }
}

impl fmt::Display for AnimationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Notifications queued by [`AnimationState`] setters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageEvent {
    Started,
    Stopped,
    StageChanged {
        from: AnimationStage,
        to: AnimationStage,
    },
    BloodShown,
    FireworksShown,
    /// The sequence reached `Celebrating`. Emitted once per cycle.
    AnimationComplete,
}

/// Distance under which a published distance marks the target as reached.
pub const REACHED_FLAG_RADIUS: f32 = 1.2;

#[derive(Debug, Clone)]
pub struct AnimationState {
    stage: AnimationStage,
    is_animating: bool,
    show_blood: bool,
    show_fireworks: bool,
    actor_reached_target: bool,
    actor_distance_to_target: f32,
    /// Bumped on every start/stop; deadlines armed in an older cycle are stale.
    cycle: u64,
    events: Vec<StageEvent>,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationState {
    pub fn new() -> Self {
        Self {
            stage: AnimationStage::Idle,
            is_animating: false,
            show_blood: false,
            show_fireworks: false,
            actor_reached_target: false,
            actor_distance_to_target: f32::INFINITY,
            cycle: 0,
            events: Vec::new(),
        }
    }

    pub fn stage(&self) -> AnimationStage {
        self.stage
    }

    pub fn is_animating(&self) -> bool {
        self.is_animating
    }

    pub fn show_blood(&self) -> bool {
        self.show_blood
    }

    pub fn show_fireworks(&self) -> bool {
        self.show_fireworks
    }

    pub fn actor_reached_target(&self) -> bool {
        self.actor_reached_target
    }

    pub fn actor_distance_to_target(&self) -> f32 {
        self.actor_distance_to_target
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Begin a new cycle in `Preparation` with all flags cleared.
    pub fn start_animation(&mut self) {
        let from = self.stage;
        self.cycle += 1;
        self.is_animating = true;
        self.stage = AnimationStage::Preparation;
        self.show_blood = false;
        self.show_fireworks = false;
        self.actor_reached_target = false;
        self.actor_distance_to_target = f32::INFINITY;
        self.events.push(StageEvent::Started);
        if from != self.stage {
            self.events.push(StageEvent::StageChanged { from, to: self.stage });
        }
        log::info!("Animation started (cycle {})", self.cycle);
    }

    /// Return to `Idle` with every field at its default.
    ///
    /// Calling this twice leaves the same state as calling it once.
    pub fn stop_animation(&mut self) {
        let from = self.stage;
        let was_running = self.is_animating || from != AnimationStage::Idle;
        self.is_animating = false;
        self.stage = AnimationStage::Idle;
        self.show_blood = false;
        self.show_fireworks = false;
        self.actor_reached_target = false;
        self.actor_distance_to_target = f32::INFINITY;
        if was_running {
            self.cycle += 1;
            self.events.push(StageEvent::Stopped);
            if from != AnimationStage::Idle {
                self.events.push(StageEvent::StageChanged { from, to: AnimationStage::Idle });
            }
            log::info!("Animation stopped from {}", from);
        }
    }

    pub fn set_show_blood(&mut self, show: bool) {
        if show && !self.show_blood {
            self.events.push(StageEvent::BloodShown);
        }
        self.show_blood = show;
    }

    pub fn set_show_fireworks(&mut self, show: bool) {
        if show && !self.show_fireworks {
            self.events.push(StageEvent::FireworksShown);
        }
        self.show_fireworks = show;
    }

    pub fn set_actor_reached_target(&mut self, reached: bool) {
        self.actor_reached_target = reached;
    }

    /// Publish the actor's distance to its target. Also marks the target as
    /// reached while running and closer than [`REACHED_FLAG_RADIUS`].
    pub fn set_actor_distance_to_target(&mut self, distance: f32) {
        self.actor_distance_to_target = distance;
        self.actor_reached_target =
            distance < REACHED_FLAG_RADIUS && self.stage == AnimationStage::Running;
    }

    /// Move to the next stage.
    ///
    /// Leaving `Running` requires the reached flag. Entering `AfterAttack`
    /// shows the blood, entering `Celebrating` shows the fireworks.
    /// Returns true if the stage changed.
    pub fn advance_to_next_stage(&mut self) -> bool {
        let from = self.stage;
        if from == AnimationStage::Running && !self.actor_reached_target {
            return false;
        }
        let Some(to) = from.next() else {
            return false;
        };
        self.stage = to;
        self.events.push(StageEvent::StageChanged { from, to });
        log::info!("Stage {} -> {}", from, to);
        match to {
            AnimationStage::AfterAttack => self.set_show_blood(true),
            AnimationStage::Celebrating => {
                self.set_show_fireworks(true);
                self.events.push(StageEvent::AnimationComplete);
            }
            _ => {}
        }
        true
    }

    /// Take every event queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<StageEvent> {
        std::mem::take(&mut self.events)
    }
}
