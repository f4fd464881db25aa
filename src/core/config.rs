//! Simulation configuration with documented constants
//!
//! All timing and capacity constants are collected here. The shipped
//! binary runs with `SimulationConfig::default()`; tests shorten the
//! durations to keep runs fast.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for one simulation run
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Number of agents seeded at initialization
    pub agent_count: usize,

    /// Movement loop tick interval
    ///
    /// Every tick each live agent is displaced once and scanned for
    /// combat range against every other live agent.
    pub tick_interval: Duration,

    /// Wall-clock duration of the run, checked by the reporting loop
    ///
    /// This is a soft deadline: movement and combat stop only when they
    /// next observe the running flag, so shutdown lags by at most one
    /// tick plus one queue wakeup.
    pub run_duration: Duration,

    /// Interval between live-map reports
    pub report_interval: Duration,

    /// Combat queue capacity
    ///
    /// When the queue is full, new tasks are dropped rather than blocking
    /// the movement loop. Dropped tasks are regenerated naturally on the
    /// next tick if the agents are still in range.
    pub queue_capacity: usize,

    /// Master seed; each loop derives its own generator from it
    pub seed: u64,

    /// Kill log file appended to by the file observer
    pub log_path: PathBuf,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            agent_count: 50,
            tick_interval: Duration::from_millis(100),
            run_duration: Duration::from_secs(30),
            report_interval: Duration::from_secs(1),
            queue_capacity: 500,
            seed: rand::random(),
            log_path: PathBuf::from("wildmark_kills.log"),
        }
    }
}
