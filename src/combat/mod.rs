pub mod queue;
pub mod rules;

pub use queue::{CombatQueue, CombatTask};
pub use rules::{can_kill, duel, resolve_task, Dice, KillReport, ScriptedDice, SixSided};
