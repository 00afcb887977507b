//! Retinue - Tactical squad AI for leader-following combat parties
//!
//! A small squad of AI agents follows a human-controlled leader through a
//! shared world. Each agent carries a role (ranged, melee, tank, healer)
//! and decides tick by tick whether to reposition, engage, support an ally,
//! or recover toward the leader. Movement execution and combat resolution
//! stay with the host engine behind the [`squad::WorldAdapter`] boundary.

pub mod core;
pub mod squad;
