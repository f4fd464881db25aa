//! Bounded producer-consumer queue of pending combat tasks
//!
//! Backpressure policy is drop-newest: a saturated combat pipeline never
//! blocks the movement loop, it just sheds tasks (they regenerate next
//! tick while the agents stay in range). Consumers block on `pop` until a
//! task arrives or the queue is closed; closing wakes every blocked
//! consumer so shutdown cannot hang on an empty queue.

use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use tracing::trace;

use crate::agent::Agent;

/// A pending attacker/defender pairing awaiting resolution
///
/// Transient: enqueued by the movement loop, consumed exactly once by a
/// combat consumer. Carries no identity beyond its queue position.
pub struct CombatTask {
    pub attacker: Arc<Agent>,
    pub defender: Arc<Agent>,
}

/// Bounded FIFO of combat tasks
pub struct CombatQueue {
    // Taken on close so the channel disconnects and wakes consumers.
    sender: Mutex<Option<Sender<CombatTask>>>,
    receiver: Receiver<CombatTask>,
}

impl CombatQueue {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender: Mutex::new(Some(sender)),
            receiver,
        }
    }

    /// Enqueue a task without blocking
    ///
    /// Returns `false` when the task was shed (queue full or closed);
    /// the producer treats that as a non-event.
    pub fn push(&self, task: CombatTask) -> bool {
        let sender = self.sender.lock();
        let Some(sender) = sender.as_ref() else {
            return false;
        };
        match sender.try_send(task) {
            Ok(()) => true,
            Err(TrySendError::Full(task)) => {
                trace!(
                    attacker = %task.attacker.name(),
                    defender = %task.defender.name(),
                    "combat queue full, task dropped"
                );
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Dequeue the oldest task, blocking until one arrives
    ///
    /// Returns `None` once the queue is closed and drained.
    pub fn pop(&self) -> Option<CombatTask> {
        self.receiver.recv().ok()
    }

    /// Close the queue; idempotent
    pub fn close(&self) {
        self.sender.lock().take();
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}
