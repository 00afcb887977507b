//! Squad tactics system - per-agent combat AI for a leader-following party
//!
//! Control flow each tick: Manager -> Blackboard refresh -> every
//! Controller (stable order). Controllers stagger their own thinking with
//! jittered countdowns and only read the shared blackboard plus their own
//! state, so update order between them does not matter.
//!
//! Movement execution, animation, and combat resolution live behind the
//! [`WorldAdapter`] boundary - this module only decides and issues intents.

pub mod agent;
pub mod blackboard;
pub mod controller;
pub mod healer;
pub mod manager;
pub mod selector;
pub mod world;

#[cfg(test)]
pub(crate) mod testkit;

pub use agent::{load_profile, AgentConfig, Role, Stance};
pub use blackboard::Blackboard;
pub use controller::{AiState, Controller, TargetSnapshot};
pub use healer::HealerScript;
pub use manager::{Manager, PartyMember};
pub use world::{
    AbilityKind, CharacterSnapshot, EnemyDescriptor, EnemyKind, LateralDir, WorldAdapter,
};

use crate::core::config::TacticsConfig;
use crate::core::types::AgentId;

/// Squad composition entry shared with role behaviors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterEntry {
    pub id: AgentId,
    pub role: Role,
}

/// Everything a controller needs for one think, borrowed from the manager
pub struct ThinkContext<'a> {
    pub blackboard: &'a Blackboard,
    pub tunables: &'a TacticsConfig,
    pub roster: &'a [RosterEntry],
    pub leader: AgentId,
}
