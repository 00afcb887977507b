//! World adapter - the boundary between the squad AI and the host engine
//!
//! The AI only issues intents; the host owns movement execution, animation,
//! and combat resolution. Implementations live outside this crate (the test
//! suite and the skirmish binary carry in-memory ones).

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, EnemyId, GridPos};

/// Coarse tactical tag for hostile entities
///
/// Used only for heuristics (kiting, focus priority), never for combat
/// resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Ranged,
    Melee,
}

/// Perceived hostile entity, refreshed by periodic blackboard scans
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyDescriptor {
    pub id: EnemyId,
    pub pos: GridPos,
    pub kind: EnemyKind,
}

/// Live state of a party member as the host engine sees it
#[derive(Debug, Clone, Copy)]
pub struct CharacterSnapshot {
    pub pos: GridPos,
    /// Current health as a percentage in [0, 100]
    pub hp_pct: f32,
    pub alive: bool,
}

/// Which role ability slot an invocation comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityKind {
    Attack,
    Defend,
    Heal,
    Buff,
}

/// Perpendicular escape direction for kiting sidesteps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LateralDir {
    Left,
    Right,
}

/// Interface the host engine implements for the squad AI
pub trait WorldAdapter {
    /// Resolve an agent id to its live world representation
    fn character_for_agent(&self, id: AgentId) -> Option<CharacterSnapshot>;

    /// Current hostile entities in the active encounter zone
    fn enemies_in_zone(&self) -> Vec<EnemyDescriptor>;

    /// Symmetric grid distance between two positions
    fn distance(&self, a: GridPos, b: GridPos) -> u32 {
        a.manhattan(&b)
    }

    /// Fire-and-forget movement intent toward a position
    fn move_toward(&mut self, agent: AgentId, target: GridPos);

    /// Fire-and-forget movement intent away from a position
    fn move_away(&mut self, agent: AgentId, target: GridPos);

    /// Lateral step perpendicular to the line toward `target`
    fn sidestep(&mut self, agent: AgentId, target: GridPos, dir: LateralDir);

    /// Attempt to trigger a role ability
    ///
    /// Returns whether an attempt was dispatched, not whether it
    /// mechanically succeeded.
    fn use_ability(&mut self, agent: AgentId, ability: &str, kind: AbilityKind) -> bool;

    /// Optional direct mechanical application of a heal/buff effect,
    /// independent of [`WorldAdapter::use_ability`]
    fn apply_support_effect(&mut self, user: AgentId, target: AgentId, effect: &str) -> bool {
        let _ = (user, target, effect);
        false
    }
}
