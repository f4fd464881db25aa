//! Agents and their thread-safe state
//!
//! An [`Agent`] is one registry entry: immutable identity plus mutable
//! position/alive state behind its own readers-writer lock. Concurrent
//! position reads never block each other; any mutation is exclusive.
//! The registry owns agents via `Arc`; combat tasks and observer lists
//! hold non-owning-in-spirit clones that never outlive the run.

pub mod stats;

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, AgentKind, Position};
use crate::observer::FightObserver;

/// Mutable agent fields, guarded together so position and liveness are
/// always observed consistently.
#[derive(Debug, Clone, Copy)]
struct AgentState {
    position: Position,
    alive: bool,
}

/// One simulated agent
pub struct Agent {
    id: AgentId,
    name: String,
    kind: AgentKind,
    state: RwLock<AgentState>,
    observers: Mutex<Vec<Arc<dyn FightObserver>>>,
}

impl Agent {
    /// Create an agent at the given coordinates
    ///
    /// Construction fails fast on out-of-bounds coordinates; there is no
    /// half-initialized agent state.
    pub fn new(id: AgentId, kind: AgentKind, name: impl Into<String>, x: i32, y: i32) -> Result<Self> {
        if !Position::in_bounds(x, y) {
            return Err(SimError::InvalidCoordinates { x, y });
        }
        Ok(Self {
            id,
            name: name.into(),
            kind,
            state: RwLock::new(AgentState {
                position: Position { x, y },
                alive: true,
            }),
            observers: Mutex::new(Vec::new()),
        })
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn position(&self) -> Position {
        self.state.read().position
    }

    pub fn is_alive(&self) -> bool {
        self.state.read().alive
    }

    /// Maximum per-tick displacement for this agent's kind
    pub fn move_distance(&self) -> i32 {
        stats::move_distance(self.kind)
    }

    /// Maximum attack range for this agent's kind
    pub fn kill_distance(&self) -> i32 {
        stats::kill_distance(self.kind)
    }

    /// Move to the given coordinates, clamped to the map
    ///
    /// Dead agents never move; their position is frozen at the spot where
    /// they fell.
    pub fn move_to(&self, x: i32, y: i32) {
        let mut state = self.state.write();
        if !state.alive {
            return;
        }
        state.position = Position::clamped(x, y);
    }

    /// Mark the agent dead
    ///
    /// Idempotent. Returns `true` only for the call that actually flipped
    /// the flag, so racing combat consumers resolve to exactly one kill.
    pub fn kill(&self) -> bool {
        let mut state = self.state.write();
        let killed = state.alive;
        state.alive = false;
        killed
    }

    /// True iff the Euclidean distance to `other` is at most `distance`
    ///
    /// Compares squared distances to stay in integer arithmetic. Both
    /// agents' locks are taken in `AgentId` order, which is stable across
    /// runs, so concurrent symmetric checks cannot deadlock.
    pub fn is_close(&self, other: &Agent, distance: i32) -> bool {
        if self.id == other.id {
            return true;
        }
        let (first, second) = if self.id < other.id {
            (self, other)
        } else {
            (other, self)
        };
        let first_state = first.state.read();
        let second_state = second.state.read();
        let limit = i64::from(distance) * i64::from(distance);
        first_state.position.distance_squared(second_state.position) <= limit
    }

    /// Append an observer to this agent's subscriber list
    ///
    /// Subscribers added mid-run only see notifications fired after the
    /// subscription took effect.
    pub fn subscribe(&self, observer: Arc<dyn FightObserver>) {
        self.observers.lock().push(observer);
    }

    /// Notify subscribers of a fight outcome
    ///
    /// The subscriber list is snapshotted under the lock and each observer
    /// is invoked outside it, so observer work can re-enter the agent
    /// without deadlocking.
    pub fn notify_fight(&self, attacker: &Agent, defender: &Agent, won: bool) {
        let snapshot: Vec<Arc<dyn FightObserver>> = self.observers.lock().clone();
        for observer in snapshot {
            observer.on_fight(attacker, defender, won);
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = *self.state.read();
        write!(
            f,
            "{} \"{}\" at ({}, {})",
            self.kind, self.name, state.position.x, state.position.y
        )?;
        if !state.alive {
            write!(f, " [DEAD]")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = *self.state.read();
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("position", &state.position)
            .field("alive", &state.alive)
            .finish()
    }
}
