//! Squad-wide tunables with documented constants
//!
//! All magic numbers for the tactics system are collected here with
//! explanations of their purpose and how they interact with each other.

/// Global tunables for the squad tactics system
///
/// These values have been tuned to produce believable small-squad behavior.
/// Changing them will affect engagement pacing and healer responsiveness.
#[derive(Debug, Clone)]
pub struct TacticsConfig {
    // === SCHEDULING ===
    /// Ticks between an agent's decision evaluations
    ///
    /// Each controller carries its own countdown, jittered at creation so
    /// that the squad does not recompute decisions on the same tick.
    /// Lower = more responsive agents, higher per-tick cost.
    pub think_interval: u32,

    /// Ticks between enemy rescans on the blackboard
    ///
    /// The combat flag is recomputed every tick against the most recent
    /// scan; only the scan itself runs at this interval. Larger values
    /// bound adapter query cost at the price of slightly stale positions.
    pub enemy_scan_interval: u32,

    // === COMBAT DETECTION ===
    /// Distance from the leader at which any enemy starts combat (tiles)
    ///
    /// Drives the squad-wide combat flag; individual agents may still pull
    /// early via their personal aggro radius.
    pub global_aggro_radius: u32,

    // === HEALER THRESHOLDS ===
    /// HP percentage at or below which an ally receives a normal heal
    pub heal_threshold_pct: f32,

    /// HP percentage at or below which a heal becomes critical
    ///
    /// Critical heals interrupt the scripted buff rotation. Must be below
    /// heal_threshold_pct.
    pub critical_threshold_pct: f32,

    /// Ticks after combat start during which scripted buffing is attempted
    ///
    /// Outside this window the healer reverts to pure reactive behavior.
    pub buff_window_ticks: u64,

    // === FIXED SMALL DISTANCES ===
    /// Distance to the leader considered "close enough" (tiles)
    ///
    /// Used by follow repositioning and as the recovery arrival check.
    pub follow_threshold: u32,

    /// Radius within which a holding agent defends its position (tiles)
    pub hold_defend_radius: u32,

    /// Distance at which an enemy counts as a melee threat to a healer (tiles)
    pub melee_threshold: u32,
}

impl Default for TacticsConfig {
    fn default() -> Self {
        Self {
            think_interval: 10,
            enemy_scan_interval: 30,

            global_aggro_radius: 12,

            heal_threshold_pct: 70.0,
            critical_threshold_pct: 35.0,
            buff_window_ticks: 200,

            follow_threshold: 2,
            hold_defend_radius: 4,
            melee_threshold: 2,
        }
    }
}

impl TacticsConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.think_interval == 0 {
            return Err("think_interval must be at least 1".into());
        }

        if self.enemy_scan_interval == 0 {
            return Err("enemy_scan_interval must be at least 1".into());
        }

        // Critical heals must fire before normal heals stop mattering
        if self.critical_threshold_pct >= self.heal_threshold_pct {
            return Err(format!(
                "critical_threshold_pct ({}) should be < heal_threshold_pct ({})",
                self.critical_threshold_pct, self.heal_threshold_pct
            ));
        }

        if !(0.0..=100.0).contains(&self.heal_threshold_pct)
            || !(0.0..=100.0).contains(&self.critical_threshold_pct)
        {
            return Err("Heal thresholds must be percentages in [0, 100]".into());
        }

        Ok(())
    }
}
