//! Per-kind movement and kill ranges
//!
//! Distances are pure functions of the kind, never stored per agent.
//! Rangers cover ground quickly and threaten at long range; Predators
//! are slow but dangerous up close; Thieves are fast with a short reach.

use crate::core::types::AgentKind;

/// Maximum per-tick displacement magnitude for a kind
pub fn move_distance(kind: AgentKind) -> i32 {
    match kind {
        AgentKind::Predator => 5,
        AgentKind::Ranger => 10,
        AgentKind::Thief => 10,
    }
}

/// Maximum distance at which a kind may attempt an attack
pub fn kill_distance(kind: AgentKind) -> i32 {
    match kind {
        AgentKind::Predator => 10,
        AgentKind::Ranger => 50,
        AgentKind::Thief => 10,
    }
}
