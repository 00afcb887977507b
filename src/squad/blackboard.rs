//! Shared perception cache for one encounter zone
//!
//! Enemy scans run at low frequency to bound adapter query cost; the combat
//! flag is recomputed every tick against the most recent scan. The combat
//! flag therefore reacts one scan late to enemy movement - an accepted
//! smoothing trade, not a bug.

use crate::core::config::TacticsConfig;
use crate::core::types::{AgentId, Tick};
use crate::squad::world::{EnemyDescriptor, WorldAdapter};

/// Per-encounter shared state that every controller reads
#[derive(Debug, Default)]
pub struct Blackboard {
    current_tick: Tick,
    scan_countdown: u32,
    enemies: Vec<EnemyDescriptor>,
    combat_active: bool,
    combat_start_tick: Option<Tick>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one tick: rescan on countdown expiry, recompute the combat flag
    ///
    /// A failed or empty adapter query yields an empty enemy list and an
    /// inactive combat flag; there are no error conditions.
    pub fn refresh(&mut self, world: &dyn WorldAdapter, leader: AgentId, config: &TacticsConfig) {
        self.current_tick += 1;

        if self.scan_countdown == 0 {
            self.enemies = world.enemies_in_zone();
            self.scan_countdown = config.enemy_scan_interval.saturating_sub(1);
        } else {
            self.scan_countdown -= 1;
        }

        let leader_pos = world
            .character_for_agent(leader)
            .filter(|c| c.alive)
            .map(|c| c.pos);

        let in_combat = match leader_pos {
            Some(pos) => self
                .enemies
                .iter()
                .any(|e| world.distance(pos, e.pos) <= config.global_aggro_radius),
            None => false,
        };

        if in_combat && !self.combat_active {
            self.combat_start_tick = Some(self.current_tick);
            tracing::debug!(tick = self.current_tick, "combat window opened");
        } else if !in_combat && self.combat_active {
            tracing::debug!(tick = self.current_tick, "combat window closed");
        }
        self.combat_active = in_combat;
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    /// Enemy list from the most recent scan (intentionally slightly stale)
    pub fn enemies(&self) -> &[EnemyDescriptor] {
        &self.enemies
    }

    pub fn combat_active(&self) -> bool {
        self.combat_active
    }

    /// Tick at which the current combat window began
    pub fn combat_start_tick(&self) -> Option<Tick> {
        self.combat_start_tick
    }

    /// Elapsed ticks since the current combat window began
    pub fn ticks_since_combat_start(&self) -> Option<u64> {
        self.combat_start_tick
            .map(|start| self.current_tick.saturating_sub(start))
    }
}
