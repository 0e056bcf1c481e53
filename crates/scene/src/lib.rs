//! Winner-pick crowd scene: the actor's stage machine, the crowd, and the
//! particle effects, stepped once per tick by [`Scene`].
//!
//! Rendering, input and persistence live outside this crate. The host feeds
//! in a roster, a winner and a clock, and reads back a [`RenderFrame`].

pub mod actor;
pub mod budget;
pub mod config;
pub mod crowd;
pub mod fireworks;
pub mod render;
pub mod scene;
pub mod splatter;
pub mod state;
pub mod tier;
pub mod weapon;

pub use actor::Actor;
pub use budget::{BudgetCategory, ParticleBudget, ParticleBudgets};
pub use config::{CelebrationStyle, SceneConfig};
pub use crowd::{Agent, Crowd, RosterDiff};
pub use fireworks::{ExplosionPattern, FireworksEmitter};
pub use render::{InstanceData, RenderFrame};
pub use scene::Scene;
pub use splatter::SplatterEmitter;
pub use state::{AnimationStage, AnimationState, StageEvent};
pub use tier::{DeviceTier, TierParams};
