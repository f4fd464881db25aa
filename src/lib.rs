//! Wildmark - Concurrent NPC Skirmish Simulation

pub mod agent;
pub mod combat;
pub mod core;
pub mod observer;
pub mod roster;
pub mod simulation;
