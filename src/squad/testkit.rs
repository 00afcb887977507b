//! In-memory scripted world for unit tests

use ahash::AHashMap;

use crate::core::types::{AgentId, EnemyId, GridPos};
use crate::squad::world::{
    AbilityKind, CharacterSnapshot, EnemyDescriptor, EnemyKind, LateralDir, WorldAdapter,
};

/// Everything the AI asked the world to do, in dispatch order
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    MoveToward(AgentId, GridPos),
    MoveAway(AgentId, GridPos),
    Sidestep(AgentId, GridPos, LateralDir),
    Ability(AgentId, String, AbilityKind),
    Support(AgentId, AgentId, String),
}

/// Scriptable adapter that records every intent the AI issues
pub struct ScriptedWorld {
    pub characters: AHashMap<AgentId, CharacterSnapshot>,
    pub enemies: Vec<EnemyDescriptor>,
    pub intents: Vec<Intent>,
    /// What use_ability reports back to the AI
    pub ability_result: bool,
}

impl ScriptedWorld {
    pub fn new() -> Self {
        Self {
            characters: AHashMap::new(),
            enemies: Vec::new(),
            intents: Vec::new(),
            ability_result: true,
        }
    }

    pub fn place_agent(&mut self, pos: GridPos, hp_pct: f32) -> AgentId {
        let id = AgentId::new();
        self.characters.insert(
            id,
            CharacterSnapshot {
                pos,
                hp_pct,
                alive: hp_pct > 0.0,
            },
        );
        id
    }

    pub fn add_enemy(&mut self, id: EnemyId, pos: GridPos, kind: EnemyKind) {
        self.enemies.push(EnemyDescriptor { id, pos, kind });
    }

    pub fn intents_for(&self, agent: AgentId) -> Vec<&Intent> {
        self.intents
            .iter()
            .filter(|i| match i {
                Intent::MoveToward(a, _)
                | Intent::MoveAway(a, _)
                | Intent::Sidestep(a, _, _)
                | Intent::Ability(a, _, _)
                | Intent::Support(a, _, _) => *a == agent,
            })
            .collect()
    }

    pub fn clear_intents(&mut self) {
        self.intents.clear();
    }
}

impl WorldAdapter for ScriptedWorld {
    fn character_for_agent(&self, id: AgentId) -> Option<CharacterSnapshot> {
        self.characters.get(&id).copied()
    }

    fn enemies_in_zone(&self) -> Vec<EnemyDescriptor> {
        self.enemies.clone()
    }

    fn move_toward(&mut self, agent: AgentId, target: GridPos) {
        self.intents.push(Intent::MoveToward(agent, target));
    }

    fn move_away(&mut self, agent: AgentId, target: GridPos) {
        self.intents.push(Intent::MoveAway(agent, target));
    }

    fn sidestep(&mut self, agent: AgentId, target: GridPos, dir: LateralDir) {
        self.intents.push(Intent::Sidestep(agent, target, dir));
    }

    fn use_ability(&mut self, agent: AgentId, ability: &str, kind: AbilityKind) -> bool {
        self.intents
            .push(Intent::Ability(agent, ability.to_string(), kind));
        self.ability_result
    }

    fn apply_support_effect(&mut self, user: AgentId, target: AgentId, effect: &str) -> bool {
        self.intents
            .push(Intent::Support(user, target, effect.to_string()));
        true
    }
}
