//! Per-agent finite-state controller
//!
//! One controller per AI-enabled party member. Each carries its own think
//! countdown, jittered at creation, and runs its decision logic only when
//! the countdown expires. The leash check pre-empts every state: an agent
//! that drifts too far from the leader is forced into recovery no matter
//! what it was doing.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::types::{AgentId, EnemyId, GridPos};
use crate::squad::agent::{AgentConfig, Role, Stance};
use crate::squad::blackboard::Blackboard;
use crate::squad::healer::HealerScript;
use crate::squad::selector;
use crate::squad::world::{AbilityKind, CharacterSnapshot, EnemyDescriptor, EnemyKind, LateralDir, WorldAdapter};
use crate::squad::ThinkContext;

/// Controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiState {
    /// Trail the leader, watching for combat
    #[default]
    Follow,
    /// Pick a target through the role policy
    Acquire,
    /// Run the role behavior against the current target
    Act,
    /// Forced march back to the leader after breaking the leash
    Recover,
    /// Stand fast, engaging only what comes close
    Hold,
}

/// Weak reference to the current target: id plus last known position
///
/// Never an owning handle - the enemy may vanish between ticks, and the
/// snapshot is re-resolved against the blackboard on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSnapshot {
    pub id: EnemyId,
    pub pos: GridPos,
}

/// Finite-state controller for a single agent
pub struct Controller {
    agent: AgentId,
    config: AgentConfig,
    state: AiState,
    think_interval: u32,
    think_countdown: u32,
    target: Option<TargetSnapshot>,
    healer: Option<HealerScript>,
    rng: StdRng,
}

impl Controller {
    /// Create a controller in Follow state with a jittered think countdown
    pub fn new(agent: AgentId, config: AgentConfig, think_interval: u32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let think_countdown = rng.gen_range(0..think_interval.max(1));
        let healer = (config.role == Role::Healer).then(HealerScript::new);
        Self {
            agent,
            config,
            state: AiState::Follow,
            think_interval: think_interval.max(1),
            think_countdown,
            target: None,
            healer,
            rng,
        }
    }

    pub fn agent(&self) -> AgentId {
        self.agent
    }

    pub fn role(&self) -> Role {
        self.config.role
    }

    pub fn state(&self) -> AiState {
        self.state
    }

    /// Current think countdown, always within `[0, think_interval)`
    pub fn think_countdown(&self) -> u32 {
        self.think_countdown
    }

    pub fn target(&self) -> Option<TargetSnapshot> {
        self.target
    }

    /// Advance one tick; runs decision logic only when the countdown expires
    pub fn update(&mut self, ctx: &ThinkContext, world: &mut dyn WorldAdapter) {
        if self.think_countdown > 0 {
            self.think_countdown -= 1;
            return;
        }
        self.think_countdown = self.think_interval - 1;
        self.think(ctx, world);
    }

    fn think(&mut self, ctx: &ThinkContext, world: &mut dyn WorldAdapter) {
        // Resolve our own live character; a missing or dead agent simply
        // does nothing this cycle and retries next think
        let me = match world.character_for_agent(self.agent) {
            Some(c) if c.alive => c,
            _ => return,
        };

        // Healer combat-window bookkeeping runs every think, before the
        // state switch
        if let Some(script) = self.healer.as_mut() {
            script.sync_combat_window(ctx);
        }

        // Leash pre-empts any in-progress state
        if self.state != AiState::Recover {
            if let Some(leader) = world.character_for_agent(ctx.leader) {
                if world.distance(me.pos, leader.pos) > self.config.leash_radius {
                    tracing::debug!(agent = ?self.agent, "leash exceeded, recovering");
                    self.state = AiState::Recover;
                    self.target = None;
                }
            }
        }

        match self.state {
            AiState::Follow => self.follow(ctx, &me, world),
            AiState::Hold => self.hold(ctx, &me, world),
            AiState::Recover => self.recover(ctx, &me, world),
            AiState::Acquire => self.acquire(ctx, &me, world),
            AiState::Act => self.act(ctx, &me, world),
        }
    }

    fn follow(&mut self, ctx: &ThinkContext, me: &CharacterSnapshot, world: &mut dyn WorldAdapter) {
        if self.config.stance == Stance::Hold {
            self.state = AiState::Hold;
            return;
        }
        if ctx.blackboard.combat_active() {
            self.state = AiState::Acquire;
            return;
        }
        // Aggressive agents pull early when something wanders into their
        // personal aggro radius, without waiting for the squad-wide flag
        if self.config.stance == Stance::Aggressive {
            let provoked = selector::nearest(ctx.blackboard.enemies(), me.pos)
                .map_or(false, |e| world.distance(me.pos, e.pos) <= self.config.aggro_radius);
            if provoked {
                self.state = AiState::Acquire;
                return;
            }
        }
        if let Some(leader) = world.character_for_agent(ctx.leader) {
            if world.distance(me.pos, leader.pos) > ctx.tunables.follow_threshold {
                world.move_toward(self.agent, leader.pos);
            }
        }
    }

    fn hold(&mut self, ctx: &ThinkContext, me: &CharacterSnapshot, world: &mut dyn WorldAdapter) {
        if let Some(enemy) = selector::nearest(ctx.blackboard.enemies(), me.pos) {
            if world.distance(me.pos, enemy.pos) <= ctx.tunables.hold_defend_radius {
                self.target = Some(TargetSnapshot {
                    id: enemy.id,
                    pos: enemy.pos,
                });
                self.state = AiState::Act;
            }
        }
    }

    fn recover(&mut self, ctx: &ThinkContext, me: &CharacterSnapshot, world: &mut dyn WorldAdapter) {
        let Some(leader) = world.character_for_agent(ctx.leader) else {
            return;
        };
        if world.distance(me.pos, leader.pos) <= ctx.tunables.follow_threshold {
            self.state = if self.config.stance == Stance::Hold {
                AiState::Hold
            } else {
                AiState::Follow
            };
            return;
        }
        world.move_toward(self.agent, leader.pos);
    }

    /// Target acquisition; on a hit the role behavior runs in the same think
    fn acquire(&mut self, ctx: &ThinkContext, me: &CharacterSnapshot, world: &mut dyn WorldAdapter) {
        // Healers act even without a hostile target
        if self.config.role == Role::Healer {
            self.state = AiState::Act;
            self.act(ctx, me, world);
            return;
        }
        match selector::select_target(self.config.role, ctx.blackboard.enemies(), me.pos) {
            Some(enemy) => {
                self.target = Some(TargetSnapshot {
                    id: enemy.id,
                    pos: enemy.pos,
                });
                self.state = AiState::Act;
                self.act(ctx, me, world);
            }
            None => {
                self.target = None;
                self.state = if self.config.stance == Stance::Hold {
                    AiState::Hold
                } else {
                    AiState::Follow
                };
            }
        }
    }

    /// Role behavior dispatch; at most one think's worth of intents, then
    /// back to Acquire to re-evaluate next think
    fn act(&mut self, ctx: &ThinkContext, me: &CharacterSnapshot, world: &mut dyn WorldAdapter) {
        match self.config.role {
            Role::Ranged => self.act_ranged(ctx, me, world),
            Role::Melee => self.act_melee(ctx, world),
            Role::Tank => self.act_tank(ctx, me, world),
            Role::Healer => {
                if let Some(script) = self.healer.as_mut() {
                    script.think(self.agent, &self.config, me, ctx, world);
                }
            }
        }
        self.state = AiState::Acquire;
    }

    fn act_ranged(&mut self, ctx: &ThinkContext, me: &CharacterSnapshot, world: &mut dyn WorldAdapter) {
        let Some(target) = self.refresh_target(ctx.blackboard) else {
            return;
        };
        let dist = world.distance(me.pos, target.pos);
        if target.kind == EnemyKind::Melee && dist <= self.config.keep_distance {
            // Kite: open distance and break the pursuit line sideways
            world.move_away(self.agent, target.pos);
            let dir = if self.rng.gen::<bool>() {
                LateralDir::Left
            } else {
                LateralDir::Right
            };
            world.sidestep(self.agent, target.pos, dir);
        } else if dist > self.config.preferred_range {
            world.move_toward(self.agent, target.pos);
        }
        self.use_slot(&self.config.attack_ability, AbilityKind::Attack, world);
    }

    fn act_melee(&mut self, ctx: &ThinkContext, world: &mut dyn WorldAdapter) {
        let Some(target) = self.refresh_target(ctx.blackboard) else {
            return;
        };
        world.move_toward(self.agent, target.pos);
        self.use_slot(&self.config.attack_ability, AbilityKind::Attack, world);
    }

    fn act_tank(&mut self, ctx: &ThinkContext, me: &CharacterSnapshot, world: &mut dyn WorldAdapter) {
        // Peel priority: a threat inside the protect radius of the nearest
        // ranged/healer ally outranks whatever the tank itself acquired
        let chosen = match self.find_peel_target(ctx, me, world) {
            Some(enemy) => Some(enemy),
            None => self.refresh_target(ctx.blackboard),
        };
        let Some(target) = chosen else {
            return;
        };
        self.target = Some(TargetSnapshot {
            id: target.id,
            pos: target.pos,
        });
        world.move_toward(self.agent, target.pos);
        self.use_slot(&self.config.attack_ability, AbilityKind::Attack, world);
    }

    /// Nearest enemy threatening the nearest protected (ranged/healer) ally
    fn find_peel_target(
        &self,
        ctx: &ThinkContext,
        me: &CharacterSnapshot,
        world: &dyn WorldAdapter,
    ) -> Option<EnemyDescriptor> {
        let mut ward: Option<(u32, CharacterSnapshot)> = None;
        for entry in ctx.roster {
            if entry.id == self.agent || !matches!(entry.role, Role::Ranged | Role::Healer) {
                continue;
            }
            let Some(snap) = world.character_for_agent(entry.id) else {
                continue;
            };
            if !snap.alive {
                continue;
            }
            let dist = world.distance(me.pos, snap.pos);
            if ward.map_or(true, |(best, _)| dist < best) {
                ward = Some((dist, snap));
            }
        }
        let (_, ward) = ward?;
        ctx.blackboard
            .enemies()
            .iter()
            .filter(|e| world.distance(ward.pos, e.pos) <= self.config.protect_radius)
            .min_by_key(|e| world.distance(ward.pos, e.pos))
            .copied()
    }

    /// Re-resolve the weak target against the latest scan
    ///
    /// A vanished id drops the target; a live one refreshes the stored
    /// position snapshot.
    fn refresh_target(&mut self, blackboard: &Blackboard) -> Option<EnemyDescriptor> {
        let current = self.target?;
        match blackboard.enemies().iter().find(|e| e.id == current.id) {
            Some(enemy) => {
                self.target = Some(TargetSnapshot {
                    id: enemy.id,
                    pos: enemy.pos,
                });
                Some(*enemy)
            }
            None => {
                self.target = None;
                None
            }
        }
    }

    fn use_slot(&self, ability: &Option<String>, kind: AbilityKind, world: &mut dyn WorldAdapter) {
        if let Some(name) = ability {
            if !world.use_ability(self.agent, name, kind) {
                tracing::warn!(agent = ?self.agent, ability = %name, "ability dispatch failed");
            }
        }
    }
}
