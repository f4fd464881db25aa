//! Simulation controller and its execution loops
//!
//! The controller owns the agent registry and runs three concurrent
//! loops for a fixed wall-clock duration:
//!
//! - **movement**: every tick, displace each live agent in a random
//!   direction and enqueue combat tasks for every other live agent in
//!   kill range;
//! - **combat**: drain the queue, resolving each task bidirectionally;
//! - **reporting**: print the live map each interval and flip the
//!   running flag once the run duration elapses.
//!
//! Two lock tiers protect shared state: the registry lock guards the
//! list's shape and is released before any per-agent work; each agent's
//! own lock guards its fields. Shutdown is cooperative: a shared atomic
//! flag observed at every loop iteration, plus closing the combat queue
//! to wake any blocked consumer.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::agent::Agent;
use crate::combat::{resolve_task, CombatQueue, CombatTask, SixSided};
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, AgentKind, MAP_SIZE};
use crate::observer::{ConsoleObserver, FightObserver, FileObserver};
use crate::roster::{self, RosterRecord};

/// Controller lifecycle; transitions are one-way
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Stopped,
}

/// Final accounting of a run
#[derive(Debug, Serialize)]
pub struct SurvivorReport {
    pub duration_secs: f64,
    pub initial_count: usize,
    pub survivor_count: usize,
    pub survivors: Vec<SurvivorRecord>,
}

/// One surviving agent, in its serializable form
#[derive(Debug, Serialize)]
pub struct SurvivorRecord {
    pub kind: AgentKind,
    pub name: String,
    pub x: i32,
    pub y: i32,
}

/// The simulation engine
pub struct Simulation {
    config: SimulationConfig,
    agents: RwLock<Vec<Arc<Agent>>>,
    queue: CombatQueue,
    running: AtomicBool,
    state: Mutex<RunState>,
    next_id: AtomicU64,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        let queue = CombatQueue::new(config.queue_capacity);
        Self {
            config,
            agents: RwLock::new(Vec::new()),
            queue,
            running: AtomicBool::new(false),
            state: Mutex::new(RunState::Idle),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        *self.state.lock()
    }

    fn running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn alloc_id(&self) -> AgentId {
        AgentId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Seed the registry with `count` agents of random kind and position
    pub fn initialize(&self, count: usize) -> Result<()> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let records = (0..count)
            .map(|i| RosterRecord {
                kind: AgentKind::ALL[rng.gen_range(0..AgentKind::ALL.len())],
                name: format!("NPC{i}"),
                x: rng.gen_range(0..=MAP_SIZE),
                y: rng.gen_range(0..=MAP_SIZE),
            })
            .collect();
        self.populate(records)
    }

    /// Seed the registry from a saved roster file
    pub fn initialize_from_roster(&self, path: &Path) -> Result<()> {
        let records = roster::load(path)?;
        self.populate(records)
    }

    /// Admit records into the registry, subscribing each agent to the
    /// console and file logging collaborators
    fn populate(&self, records: Vec<RosterRecord>) -> Result<()> {
        if self.state() != RunState::Idle {
            return Err(SimError::InvalidState { expected: "idle" });
        }

        // Observer construction fails fast, before any agent exists.
        let console: Arc<dyn FightObserver> = Arc::new(ConsoleObserver);
        let file: Arc<dyn FightObserver> = Arc::new(FileObserver::create(&self.config.log_path)?);

        let mut agents = self.agents.write();
        agents.clear();
        agents.reserve(records.len());
        for record in records {
            let agent = Agent::new(self.alloc_id(), record.kind, record.name, record.x, record.y)?;
            agent.subscribe(Arc::clone(&console));
            agent.subscribe(Arc::clone(&file));
            agents.push(Arc::new(agent));
        }
        info!(count = agents.len(), "registry seeded");
        Ok(())
    }

    /// Run the simulation to completion
    ///
    /// Spawns the three loops, waits for all of them to finish, then
    /// reports the survivors. The reporting loop ends the run after the
    /// configured duration; `stop()` ends it early.
    pub fn run(&self) -> Result<SurvivorReport> {
        {
            let mut state = self.state.lock();
            if *state != RunState::Idle {
                return Err(SimError::InvalidState { expected: "idle" });
            }
            *state = RunState::Running;
        }
        self.running.store(true, Ordering::SeqCst);
        let started = Instant::now();
        info!(agents = self.agents.read().len(), "simulation running");

        thread::scope(|scope| {
            scope.spawn(|| self.movement_loop());
            scope.spawn(|| self.combat_loop());
            scope.spawn(|| self.reporting_loop(started));
        });

        // Normally the reporting loop already did both of these; stop()
        // is idempotent so an early external stop is also covered.
        self.stop();
        *self.state.lock() = RunState::Stopped;

        let report = self.survivor_report(started.elapsed().as_secs_f64());
        info!(
            survivors = report.survivor_count,
            duration_secs = report.duration_secs,
            "simulation finished"
        );
        Ok(report)
    }

    /// End the run; idempotent and safe from any thread
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            debug!("running flag lowered");
        }
        self.queue.close();
    }

    /// Movement loop: perturb every live agent, then enqueue combat
    /// tasks for proximate pairs
    fn movement_loop(&self) {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed.wrapping_add(1));
        while self.running() {
            thread::sleep(self.config.tick_interval);

            // Snapshot under the registry read lock, release it before
            // touching any per-agent lock.
            let snapshot: Vec<Arc<Agent>> = self.agents.read().clone();

            for agent in &snapshot {
                if !agent.is_alive() {
                    continue;
                }

                let reach = f64::from(agent.move_distance());
                let angle = rng.gen_range(0.0..std::f64::consts::TAU);
                let pos = agent.position();
                let new_x = pos.x + (reach * angle.cos()).round() as i32;
                let new_y = pos.y + (reach * angle.sin()).round() as i32;
                agent.move_to(new_x, new_y);

                // The agent may have been killed between the move and the
                // proximity scan; a stale task is still acceptable, the
                // combat loop re-checks liveness.
                if !agent.is_alive() {
                    continue;
                }
                let kill_range = agent.kill_distance();
                for other in &snapshot {
                    if other.id() == agent.id() || !other.is_alive() {
                        continue;
                    }
                    if agent.is_close(other, kill_range) {
                        self.queue.push(CombatTask {
                            attacker: Arc::clone(agent),
                            defender: Arc::clone(other),
                        });
                    }
                }
            }
        }
        debug!("movement loop exited");
    }

    /// Combat loop: drain the queue until shutdown
    ///
    /// May run replicated; the liveness re-check inside `resolve_task`
    /// (under each agent's own lock) is the sole cross-consumer
    /// correctness mechanism.
    fn combat_loop(&self) {
        let mut dice = SixSided::new(ChaCha8Rng::seed_from_u64(self.config.seed.wrapping_add(2)));
        while let Some(task) = self.queue.pop() {
            if !self.running() {
                break;
            }
            if let Some(report) = resolve_task(&task, &mut dice) {
                info!(winner = %report.winner.name(), victim = %report.victim.name(), "kill resolved");
            }
        }
        debug!("combat loop exited");
    }

    /// Reporting loop: periodic map print, and the run's soft deadline
    fn reporting_loop(&self, started: Instant) {
        while self.running() {
            if started.elapsed() >= self.config.run_duration {
                self.stop();
                break;
            }
            self.print_map();
            thread::sleep(self.config.report_interval);
        }
        debug!("reporting loop exited");
    }

    /// Print every live agent to stdout
    pub fn print_map(&self) {
        let snapshot: Vec<Arc<Agent>> = self.agents.read().clone();
        println!("\n=== Map ===");
        for agent in &snapshot {
            if agent.is_alive() {
                println!("{agent}");
            }
        }
    }

    /// Snapshot of the full registry
    pub fn agents(&self) -> Vec<Arc<Agent>> {
        self.agents.read().clone()
    }

    /// Snapshot of the agents still alive
    pub fn alive_agents(&self) -> Vec<Arc<Agent>> {
        self.agents
            .read()
            .iter()
            .filter(|agent| agent.is_alive())
            .cloned()
            .collect()
    }

    fn survivor_report(&self, duration_secs: f64) -> SurvivorReport {
        let initial_count = self.agents.read().len();
        let survivors: Vec<SurvivorRecord> = self
            .alive_agents()
            .iter()
            .map(|agent| {
                let pos = agent.position();
                SurvivorRecord {
                    kind: agent.kind(),
                    name: agent.name().to_string(),
                    x: pos.x,
                    y: pos.y,
                }
            })
            .collect();
        SurvivorReport {
            duration_secs,
            initial_count,
            survivor_count: survivors.len(),
            survivors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config(dir: &tempfile::TempDir) -> SimulationConfig {
        SimulationConfig {
            agent_count: 10,
            tick_interval: Duration::from_millis(10),
            run_duration: Duration::from_millis(120),
            report_interval: Duration::from_millis(40),
            queue_capacity: 500,
            seed: 42,
            log_path: dir.path().join("kills.log"),
        }
    }

    #[test]
    fn test_initialize_requires_idle() {
        let dir = tempfile::tempdir().unwrap();
        let sim = Simulation::new(test_config(&dir));
        sim.initialize(5).unwrap();
        assert_eq!(sim.agents().len(), 5);
        sim.run().unwrap();
        assert!(sim.initialize(5).is_err());
    }

    #[test]
    fn test_run_only_from_idle() {
        let dir = tempfile::tempdir().unwrap();
        let sim = Simulation::new(test_config(&dir));
        sim.initialize(3).unwrap();
        sim.run().unwrap();
        assert_eq!(sim.state(), RunState::Stopped);
        assert!(sim.run().is_err());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let sim = Simulation::new(test_config(&dir));
        sim.stop();
        sim.stop();
        assert!(!sim.running());
    }

    #[test]
    fn test_seeded_agents_get_unique_ids_and_names() {
        let dir = tempfile::tempdir().unwrap();
        let sim = Simulation::new(test_config(&dir));
        sim.initialize(10).unwrap();
        let agents = sim.agents();
        for (i, agent) in agents.iter().enumerate() {
            assert_eq!(agent.name(), format!("NPC{i}"));
        }
        let mut ids: Vec<_> = agents.iter().map(|a| a.id()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }
}
