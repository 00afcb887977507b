//! Role-biased nearest-target selection
//!
//! Pure distance heuristics over the blackboard's enemy snapshot. Selection
//! is stable: the first encountered minimum wins, and iteration order is
//! scan order. No randomization.

use crate::core::types::GridPos;
use crate::squad::agent::Role;
use crate::squad::world::{EnemyDescriptor, EnemyKind};

/// Nearest enemy by manhattan distance, scan order breaking ties
pub fn nearest<'a>(enemies: &'a [EnemyDescriptor], from: GridPos) -> Option<&'a EnemyDescriptor> {
    enemies.iter().min_by_key(|e| e.pos.manhattan(&from))
}

/// Best target for a role, or none if the enemy list is empty
///
/// Ranged agents hunt enemy ranged first and fall back to nearest overall.
/// Tanks get a provisional nearest pick here; peel priority is applied by
/// the tank behavior itself.
pub fn select_target<'a>(
    role: Role,
    enemies: &'a [EnemyDescriptor],
    from: GridPos,
) -> Option<&'a EnemyDescriptor> {
    match role {
        Role::Ranged => enemies
            .iter()
            .filter(|e| e.kind == EnemyKind::Ranged)
            .min_by_key(|e| e.pos.manhattan(&from))
            .or_else(|| nearest(enemies, from)),
        Role::Melee | Role::Tank | Role::Healer => nearest(enemies, from),
    }
}
