//! Squad manager - owns the blackboard and one controller per AI agent
//!
//! The manager is the single mutation point for the whole subsystem: the
//! host calls `tick` once per simulation step, `sync_roster` whenever party
//! membership may have changed, and `reset_zone` on encounter-zone
//! transitions. Controllers are never reachable through ambient globals.

use ahash::{AHashMap, AHashSet};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::config::TacticsConfig;
use crate::core::types::AgentId;
use crate::squad::agent::AgentConfig;
use crate::squad::blackboard::Blackboard;
use crate::squad::controller::Controller;
use crate::squad::world::WorldAdapter;
use crate::squad::{RosterEntry, ThinkContext};

/// One party member as the host currently sees it
#[derive(Debug, Clone)]
pub struct PartyMember {
    pub id: AgentId,
    pub config: AgentConfig,
}

/// Owner of all per-encounter AI state for one squad
pub struct Manager {
    tunables: TacticsConfig,
    leader: AgentId,
    blackboard: Blackboard,
    controllers: AHashMap<AgentId, Controller>,
    /// Stable update order (controller creation order)
    order: Vec<AgentId>,
    roster: Vec<RosterEntry>,
    rng: ChaCha8Rng,
}

impl Manager {
    /// Create a manager with the default seed
    pub fn new(tunables: TacticsConfig, leader: AgentId) -> Self {
        Self::with_seed(tunables, leader, 42) // Deterministic for testing
    }

    /// Create with a specific RNG seed for deterministic squad behavior
    ///
    /// Each controller's jitter and sidestep randomness derive from this
    /// seed, so a fixed seed fixes the whole squad.
    pub fn with_seed(tunables: TacticsConfig, leader: AgentId, seed: u64) -> Self {
        Self {
            tunables,
            leader,
            blackboard: Blackboard::new(),
            controllers: AHashMap::new(),
            order: Vec::new(),
            roster: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn leader(&self) -> AgentId {
        self.leader
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn controller(&self, id: AgentId) -> Option<&Controller> {
        self.controllers.get(&id)
    }

    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    /// Advance one simulation step
    ///
    /// The blackboard refreshes exactly once before any controller thinks,
    /// so every controller in this tick observes the same enemy snapshot
    /// and combat state.
    pub fn tick(&mut self, world: &mut dyn WorldAdapter) {
        self.blackboard.refresh(world, self.leader, &self.tunables);
        for id in &self.order {
            if let Some(controller) = self.controllers.get_mut(id) {
                let ctx = ThinkContext {
                    blackboard: &self.blackboard,
                    tunables: &self.tunables,
                    roster: &self.roster,
                    leader: self.leader,
                };
                controller.update(&ctx, world);
            }
        }
    }

    /// Reconcile controllers against current party membership
    ///
    /// Idempotent; safe to call every tick or only on roster-change events.
    /// The leader never gets a controller. A member whose role changed is
    /// given a fresh controller (state resets to Follow).
    pub fn sync_roster(&mut self, party: &[PartyMember]) {
        self.roster = party
            .iter()
            .map(|m| RosterEntry {
                id: m.id,
                role: m.config.role,
            })
            .collect();

        let wanted: AHashSet<AgentId> = party
            .iter()
            .filter(|m| m.config.enabled && m.id != self.leader)
            .map(|m| m.id)
            .collect();

        for id in self.order.iter() {
            if !wanted.contains(id) {
                tracing::debug!(agent = ?id, "controller destroyed");
            }
        }
        self.order.retain(|id| wanted.contains(id));
        self.controllers.retain(|id, _| wanted.contains(id));

        for member in party {
            if !member.config.enabled || member.id == self.leader {
                continue;
            }
            let stale_role = self
                .controllers
                .get(&member.id)
                .map_or(false, |c| c.role() != member.config.role);
            if stale_role {
                self.controllers.remove(&member.id);
            }
            if self.controllers.contains_key(&member.id) {
                continue;
            }
            let seed = self.rng.gen::<u64>();
            tracing::debug!(agent = ?member.id, role = ?member.config.role, "controller created");
            self.controllers.insert(
                member.id,
                Controller::new(
                    member.id,
                    member.config.clone(),
                    self.tunables.think_interval,
                    seed,
                ),
            );
            if !self.order.contains(&member.id) {
                self.order.push(member.id);
            }
        }
    }

    /// Discard the blackboard and every controller
    ///
    /// Invoked when the encounter zone changes; the next `sync_roster`
    /// rebuilds controllers against the new roster.
    pub fn reset_zone(&mut self) {
        tracing::debug!("zone reset, discarding cached perception and controllers");
        self.blackboard = Blackboard::new();
        self.controllers.clear();
        self.order.clear();
        self.roster.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{EnemyId, GridPos};
    use crate::squad::agent::{Role, Stance};
    use crate::squad::controller::AiState;
    use crate::squad::testkit::{Intent, ScriptedWorld};
    use crate::squad::world::EnemyKind;

    fn fast_tunables() -> TacticsConfig {
        let mut tunables = TacticsConfig::default();
        tunables.think_interval = 1;
        tunables.enemy_scan_interval = 1;
        tunables
    }

    fn member(world: &mut ScriptedWorld, pos: GridPos, role: Role) -> PartyMember {
        let id = world.place_agent(pos, 100.0);
        PartyMember {
            id,
            config: AgentConfig::for_role(role),
        }
    }

    #[test]
    fn test_sync_roster_is_idempotent() {
        let mut world = ScriptedWorld::new();
        let leader = member(&mut world, GridPos::new(0, 0), Role::Melee);
        let fighter = member(&mut world, GridPos::new(1, 0), Role::Melee);
        let party = vec![leader.clone(), fighter.clone()];

        let mut manager = Manager::new(fast_tunables(), leader.id);
        manager.sync_roster(&party);
        assert_eq!(manager.controller_count(), 1);

        manager.sync_roster(&party);
        manager.sync_roster(&party);
        assert_eq!(manager.controller_count(), 1);
        assert!(manager.controller(fighter.id).is_some());
        assert!(manager.controller(leader.id).is_none());
    }

    #[test]
    fn test_disabled_member_loses_controller() {
        let mut world = ScriptedWorld::new();
        let leader = member(&mut world, GridPos::new(0, 0), Role::Melee);
        let mut fighter = member(&mut world, GridPos::new(1, 0), Role::Melee);
        let mut manager = Manager::new(fast_tunables(), leader.id);

        manager.sync_roster(&[leader.clone(), fighter.clone()]);
        assert_eq!(manager.controller_count(), 1);

        fighter.config.enabled = false;
        manager.sync_roster(&[leader.clone(), fighter.clone()]);
        assert_eq!(manager.controller_count(), 0);
    }

    #[test]
    fn test_role_change_recreates_controller() {
        let mut world = ScriptedWorld::new();
        let leader = member(&mut world, GridPos::new(0, 0), Role::Melee);
        let mut fighter = member(&mut world, GridPos::new(1, 0), Role::Melee);
        let mut manager = Manager::new(fast_tunables(), leader.id);

        manager.sync_roster(&[leader.clone(), fighter.clone()]);
        assert_eq!(manager.controller(fighter.id).unwrap().role(), Role::Melee);

        fighter.config = AgentConfig::for_role(Role::Healer);
        manager.sync_roster(&[leader.clone(), fighter.clone()]);
        let controller = manager.controller(fighter.id).unwrap();
        assert_eq!(controller.role(), Role::Healer);
        assert_eq!(controller.state(), AiState::Follow);
    }

    #[test]
    fn test_tick_drives_followers_toward_leader() {
        let mut world = ScriptedWorld::new();
        let leader = member(&mut world, GridPos::new(10, 0), Role::Melee);
        let fighter = member(&mut world, GridPos::new(0, 0), Role::Melee);
        let mut manager = Manager::new(fast_tunables(), leader.id);
        manager.sync_roster(&[leader.clone(), fighter.clone()]);

        manager.tick(&mut world);

        assert!(matches!(
            world.intents_for(fighter.id)[0],
            Intent::MoveToward(_, pos) if *pos == GridPos::new(10, 0)
        ));
    }

    #[test]
    fn test_reset_zone_discards_everything() {
        let mut world = ScriptedWorld::new();
        let leader = member(&mut world, GridPos::new(0, 0), Role::Melee);
        let fighter = member(&mut world, GridPos::new(1, 0), Role::Melee);
        world.add_enemy(EnemyId(1), GridPos::new(3, 0), EnemyKind::Melee);

        let mut manager = Manager::new(fast_tunables(), leader.id);
        manager.sync_roster(&[leader.clone(), fighter.clone()]);
        manager.tick(&mut world);
        assert!(manager.blackboard().combat_active());

        manager.reset_zone();
        assert_eq!(manager.controller_count(), 0);
        assert!(!manager.blackboard().combat_active());
        assert_eq!(manager.blackboard().current_tick(), 0);

        // Resync rebuilds fresh controllers in Follow state
        manager.sync_roster(&[leader.clone(), fighter.clone()]);
        assert_eq!(manager.controller_count(), 1);
        assert_eq!(
            manager.controller(fighter.id).unwrap().state(),
            AiState::Follow
        );
    }

    #[test]
    fn test_controllers_update_in_creation_order() {
        let mut world = ScriptedWorld::new();
        let leader = member(&mut world, GridPos::new(10, 0), Role::Melee);
        let a = member(&mut world, GridPos::new(0, 0), Role::Melee);
        let b = member(&mut world, GridPos::new(0, 1), Role::Melee);
        let c = member(&mut world, GridPos::new(0, 2), Role::Melee);

        let mut manager = Manager::new(fast_tunables(), leader.id);
        manager.sync_roster(&[leader.clone(), a.clone(), b.clone(), c.clone()]);
        manager.tick(&mut world);

        let movers: Vec<AgentId> = world
            .intents
            .iter()
            .map(|i| match i {
                Intent::MoveToward(id, _) => *id,
                _ => panic!("expected only movement intents"),
            })
            .collect();
        assert_eq!(movers, vec![a.id, b.id, c.id]);
    }

    #[test]
    fn test_hold_stance_member_stays_put() {
        let mut world = ScriptedWorld::new();
        let leader = member(&mut world, GridPos::new(10, 0), Role::Melee);
        let mut sentry = member(&mut world, GridPos::new(0, 0), Role::Melee);
        sentry.config.stance = Stance::Hold;

        let mut manager = Manager::new(fast_tunables(), leader.id);
        manager.sync_roster(&[leader.clone(), sentry.clone()]);
        manager.tick(&mut world); // Follow -> Hold
        manager.tick(&mut world);

        assert!(world.intents_for(sentry.id).is_empty());
        assert_eq!(
            manager.controller(sentry.id).unwrap().state(),
            AiState::Hold
        );
    }
}
