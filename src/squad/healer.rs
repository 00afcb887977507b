//! Healer support scripting - triage, opening buffs, self-defense
//!
//! Heal urgency always outranks the scripted buff rotation. The rotation is
//! built once per combat window and abandoned when the window closes;
//! whatever progress was made is rebuilt from scratch on the next window.

use std::collections::VecDeque;

use ahash::AHashSet;

use crate::core::types::{AgentId, Tick};
use crate::squad::agent::{AgentConfig, Role};
use crate::squad::selector;
use crate::squad::world::{AbilityKind, CharacterSnapshot, WorldAdapter};
use crate::squad::{RosterEntry, ThinkContext};

/// Per-combat-window support state for one healer agent
#[derive(Debug, Default)]
pub struct HealerScript {
    buff_queue: VecDeque<AgentId>,
    buffed: AHashSet<AgentId>,
    last_combat_start: Option<Tick>,
}

impl HealerScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the opening rotation when a new combat window begins
    ///
    /// Queue order: leader, then melee/tank agents, then ranged agents,
    /// then healers, with the leader excluded from the later groups.
    pub fn sync_combat_window(&mut self, ctx: &ThinkContext) {
        if !ctx.blackboard.combat_active() {
            return;
        }
        let start = ctx.blackboard.combat_start_tick();
        if start == self.last_combat_start {
            return;
        }
        self.last_combat_start = start;
        self.buffed.clear();
        self.buff_queue.clear();

        self.buff_queue.push_back(ctx.leader);
        for group in [
            &[Role::Melee, Role::Tank][..],
            &[Role::Ranged][..],
            &[Role::Healer][..],
        ] {
            for entry in ctx.roster {
                if entry.id != ctx.leader && group.contains(&entry.role) {
                    self.buff_queue.push_back(entry.id);
                }
            }
        }
    }

    /// One support decision: heal, buff, defend, or reposition (first match wins)
    pub fn think(
        &mut self,
        agent: AgentId,
        config: &AgentConfig,
        me: &CharacterSnapshot,
        ctx: &ThinkContext,
        world: &mut dyn WorldAdapter,
    ) {
        // Triage first: the lowest-HP living ally interrupts everything
        if let Some((ally, snap)) = lowest_hp_ally(ctx.roster, world) {
            if snap.hp_pct <= ctx.tunables.critical_threshold_pct
                || snap.hp_pct <= ctx.tunables.heal_threshold_pct
            {
                self.cast_support(agent, config, me, ally, &snap, AbilityKind::Heal, world);
                return;
            }
        }

        // Scripted opening buffs inside the window
        if ctx.blackboard.combat_active() {
            let in_window = ctx
                .blackboard
                .ticks_since_combat_start()
                .map_or(false, |elapsed| elapsed <= ctx.tunables.buff_window_ticks);
            if in_window {
                if let Some((ally, snap)) = self.next_buff_target(world) {
                    self.cast_support(agent, config, me, ally, &snap, AbilityKind::Buff, world);
                    return;
                }
            }
        }

        // Self-defense against adjacent threats
        if let Some(enemy) = selector::nearest(ctx.blackboard.enemies(), me.pos) {
            if world.distance(me.pos, enemy.pos) <= ctx.tunables.melee_threshold {
                if let Some(ability) = &config.defend_ability {
                    dispatch_ability(agent, ability, AbilityKind::Defend, world);
                } else if let Some(ability) = &config.attack_ability {
                    dispatch_ability(agent, ability, AbilityKind::Attack, world);
                } else {
                    world.move_away(agent, enemy.pos);
                }
                return;
            }
        }

        // Nothing urgent: drift back into support range of the leader
        if let Some(leader) = world.character_for_agent(ctx.leader) {
            if world.distance(me.pos, leader.pos) > config.preferred_range {
                world.move_toward(agent, leader.pos);
            }
        }
    }

    /// First queued ally that is alive and not yet buffed this window
    fn next_buff_target(&self, world: &dyn WorldAdapter) -> Option<(AgentId, CharacterSnapshot)> {
        for id in &self.buff_queue {
            if self.buffed.contains(id) {
                continue;
            }
            match world.character_for_agent(*id) {
                Some(snap) if snap.alive => return Some((*id, snap)),
                _ => continue,
            }
        }
        None
    }

    /// Move into range, then trigger the role ability and apply the effect
    ///
    /// Out of range: one move-toward intent and the cast is deferred to a
    /// later think. Buffs are marked done only when an attempt actually
    /// dispatched, so a failed dispatch is retried on a later think.
    fn cast_support(
        &mut self,
        agent: AgentId,
        config: &AgentConfig,
        me: &CharacterSnapshot,
        ally: AgentId,
        ally_snap: &CharacterSnapshot,
        kind: AbilityKind,
        world: &mut dyn WorldAdapter,
    ) {
        if world.distance(me.pos, ally_snap.pos) > config.preferred_range {
            world.move_toward(agent, ally_snap.pos);
            return;
        }

        let ability = match kind {
            AbilityKind::Heal => &config.heal_ability,
            AbilityKind::Buff => &config.buff_ability,
            _ => &None,
        };

        match ability {
            Some(name) => {
                let dispatched = dispatch_ability(agent, name, kind, world);
                world.apply_support_effect(agent, ally, name);
                if kind == AbilityKind::Buff && dispatched {
                    self.buffed.insert(ally);
                }
            }
            // No ability slot configured: nothing to trigger, but the
            // rotation must still advance past this ally
            None => {
                if kind == AbilityKind::Buff {
                    self.buffed.insert(ally);
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn buff_queue(&self) -> &VecDeque<AgentId> {
        &self.buff_queue
    }

    #[cfg(test)]
    pub(crate) fn is_buffed(&self, id: AgentId) -> bool {
        self.buffed.contains(&id)
    }
}

/// Living ally with the numerically lowest HP percentage, scan order ties
fn lowest_hp_ally(
    roster: &[RosterEntry],
    world: &dyn WorldAdapter,
) -> Option<(AgentId, CharacterSnapshot)> {
    let mut best: Option<(AgentId, CharacterSnapshot)> = None;
    for entry in roster {
        if let Some(snap) = world.character_for_agent(entry.id) {
            if !snap.alive {
                continue;
            }
            let lower = match &best {
                Some((_, current)) => snap.hp_pct < current.hp_pct,
                None => true,
            };
            if lower {
                best = Some((entry.id, snap));
            }
        }
    }
    best
}

fn dispatch_ability(
    agent: AgentId,
    ability: &str,
    kind: AbilityKind,
    world: &mut dyn WorldAdapter,
) -> bool {
    let dispatched = world.use_ability(agent, ability, kind);
    if !dispatched {
        tracing::warn!(?agent, ability, ?kind, "ability dispatch failed");
    }
    dispatched
}
