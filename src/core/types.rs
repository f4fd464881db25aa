//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Map edge length. Positions live in `[0, MAP_SIZE]` on both axes.
pub const MAP_SIZE: i32 = 100;

/// Unique identifier for agents
///
/// Assigned monotonically at spawn time. Doubles as the total order used
/// when two agents' locks must be taken together, so it must never change
/// for the lifetime of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u64);

/// Agent kind, fixed at construction
///
/// The integer codes are the on-disk roster representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    Predator,
    Ranger,
    Thief,
}

impl AgentKind {
    /// All kinds, in roster-code order
    pub const ALL: [AgentKind; 3] = [AgentKind::Predator, AgentKind::Ranger, AgentKind::Thief];

    /// Roster wire code for this kind
    pub fn code(self) -> i32 {
        match self {
            AgentKind::Predator => 1,
            AgentKind::Ranger => 2,
            AgentKind::Thief => 3,
        }
    }

    /// Parse a roster wire code; unknown codes fail fast
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            1 => Ok(AgentKind::Predator),
            2 => Ok(AgentKind::Ranger),
            3 => Ok(AgentKind::Thief),
            other => Err(SimError::UnknownAgentKind(other)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AgentKind::Predator => "Predator",
            AgentKind::Ranger => "Ranger",
            AgentKind::Thief => "Thief",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Integer position on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Build a position, clamping both coordinates into `[0, MAP_SIZE]`
    pub fn clamped(x: i32, y: i32) -> Self {
        Self {
            x: x.clamp(0, MAP_SIZE),
            y: y.clamp(0, MAP_SIZE),
        }
    }

    /// True when both coordinates already lie within the map
    pub fn in_bounds(x: i32, y: i32) -> bool {
        (0..=MAP_SIZE).contains(&x) && (0..=MAP_SIZE).contains(&y)
    }

    /// Squared Euclidean distance; avoids the square root for range checks
    pub fn distance_squared(self, other: Position) -> i64 {
        let dx = i64::from(self.x - other.x);
        let dy = i64::from(self.y - other.y);
        dx * dx + dy * dy
    }
}
