//! Combat rule table and dice resolution
//!
//! Who can kill whom is a fixed asymmetric relation queried through
//! [`can_kill`], never inlined per kind: adding a fourth kind means
//! touching this table and nothing else. Contested kills roll independent
//! d6s, tie to the defender.

use std::sync::Arc;

use rand::Rng;

use crate::agent::Agent;
use crate::combat::queue::CombatTask;
use crate::core::types::AgentKind;

/// Source of d6 rolls for combat contests
///
/// Production dice wrap a per-thread generator; tests substitute a
/// scripted sequence to force outcomes.
pub trait Dice {
    /// Uniform roll in `[1, 6]`
    fn roll(&mut self) -> u8;
}

/// Dice backed by any [`Rng`]
pub struct SixSided<R: Rng> {
    rng: R,
}

impl<R: Rng> SixSided<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Dice for SixSided<R> {
    fn roll(&mut self) -> u8 {
        self.rng.gen_range(1..=6)
    }
}

/// Dice that replay a fixed sequence, cycling when exhausted
///
/// Used by deterministic tests that need to force a contest outcome.
pub struct ScriptedDice {
    rolls: Vec<u8>,
    next: usize,
}

impl ScriptedDice {
    pub fn new(rolls: impl Into<Vec<u8>>) -> Self {
        let rolls = rolls.into();
        assert!(!rolls.is_empty(), "scripted dice need at least one roll");
        Self { rolls, next: 0 }
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self) -> u8 {
        let roll = self.rolls[self.next % self.rolls.len()];
        self.next += 1;
        roll
    }
}

/// Fixed kill relation: Predator hunts Ranger, Ranger hunts Thief, Thief
/// turns on other Thieves. Every other pairing never kills.
pub fn can_kill(attacker: AgentKind, defender: AgentKind) -> bool {
    use AgentKind::{Predator, Ranger, Thief};
    matches!(
        (attacker, defender),
        (Predator, Ranger) | (Ranger, Thief) | (Thief, Thief)
    )
}

/// Dice contest: the attacker wins only by rolling strictly higher
pub fn duel(attack: u8, defense: u8) -> bool {
    attack > defense
}

/// One directed kill attempt
///
/// Pairs outside the kill relation never reach the dice.
fn attempt_kill(attacker: &Agent, defender: &Agent, dice: &mut dyn Dice) -> bool {
    if !can_kill(attacker.kind(), defender.kind()) {
        return false;
    }
    duel(dice.roll(), dice.roll())
}

/// Outcome of a resolved combat task, for reporting
pub struct KillReport {
    pub winner: Arc<Agent>,
    pub victim: Arc<Agent>,
}

/// Resolve one combat task bidirectionally
///
/// A task whose participants died since enqueue is silently discarded;
/// that is a normal outcome of the movement/combat race, not an error.
/// The forward attempt runs first; the defender gets an independent
/// retaliation roll only when it survived and the attacker still stands,
/// so a single resolution can never kill both participants.
pub fn resolve_task(task: &CombatTask, dice: &mut dyn Dice) -> Option<KillReport> {
    let attacker = &task.attacker;
    let defender = &task.defender;

    if !attacker.is_alive() || !defender.is_alive() {
        return None;
    }

    if attempt_kill(attacker, defender, dice) {
        // kill() arbitrates between racing consumers; only the call that
        // flipped the flag reports the event.
        if defender.kill() {
            attacker.notify_fight(attacker, defender, true);
            return Some(KillReport {
                winner: attacker.clone(),
                victim: defender.clone(),
            });
        }
        return None;
    }

    if attacker.is_alive() && defender.is_alive() && attempt_kill(defender, attacker, dice) {
        if attacker.kill() {
            defender.notify_fight(defender, attacker, true);
            return Some(KillReport {
                winner: defender.clone(),
                victim: attacker.clone(),
            });
        }
    }

    None
}
