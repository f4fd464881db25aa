//! Simulation engine integration tests
//!
//! These exercise the concurrent engine end-to-end: seeded runs that
//! terminate cleanly, the asymmetric kill relation observed through real
//! combat resolution, and the liveness re-check that keeps racing combat
//! consumers from double-killing.

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use wildmark::agent::Agent;
use wildmark::combat::{resolve_task, CombatTask, ScriptedDice};
use wildmark::core::config::SimulationConfig;
use wildmark::core::types::{AgentId, AgentKind, Position};
use wildmark::observer::FightObserver;
use wildmark::simulation::{RunState, Simulation};

fn short_config(dir: &tempfile::TempDir, seed: u64) -> SimulationConfig {
    SimulationConfig {
        agent_count: 20,
        tick_interval: Duration::from_millis(10),
        run_duration: Duration::from_millis(200),
        report_interval: Duration::from_millis(50),
        queue_capacity: 500,
        seed,
        log_path: dir.path().join("kills.log"),
    }
}

struct CountingObserver {
    fired: AtomicUsize,
}

impl CountingObserver {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            fired: AtomicUsize::new(0),
        })
    }

    fn count(&self) -> usize {
        self.fired.load(Ordering::SeqCst)
    }
}

impl FightObserver for CountingObserver {
    fn on_fight(&self, _attacker: &Agent, _defender: &Agent, won: bool) {
        if won {
            self.fired.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn agent(id: u64, kind: AgentKind, x: i32, y: i32) -> Arc<Agent> {
    Arc::new(Agent::new(AgentId(id), kind, format!("NPC{id}"), x, y).unwrap())
}

#[test]
fn test_short_run_terminates_with_invariants_intact() {
    let dir = tempfile::tempdir().unwrap();
    let sim = Simulation::new(short_config(&dir, 7));
    sim.initialize(20).unwrap();

    let report = sim.run().unwrap();

    assert_eq!(sim.state(), RunState::Stopped);
    assert_eq!(report.initial_count, 20);
    assert!(report.survivor_count <= 20);
    assert_eq!(report.survivor_count, sim.alive_agents().len());
    for agent in sim.agents() {
        let pos = agent.position();
        assert!(Position::in_bounds(pos.x, pos.y), "{agent} escaped the map");
    }
}

#[test]
fn test_predators_only_run_produces_no_kills() {
    // No valid attacker-defender pair exists among Predators, so even a
    // crowd on one tile must end without a single kill event.
    let dir = tempfile::tempdir().unwrap();

    let roster_path = dir.path().join("predators.txt");
    fs::write(&roster_path, "3\n1 NPC0 50 50\n1 NPC1 50 50\n1 NPC2 50 50\n").unwrap();

    let sim = Simulation::new(short_config(&dir, 11));
    sim.initialize_from_roster(&roster_path).unwrap();
    let report = sim.run().unwrap();

    assert_eq!(report.survivor_count, 3);
    let log = fs::read_to_string(dir.path().join("kills.log")).unwrap();
    assert!(log.is_empty(), "unexpected kill events: {log}");
}

#[test]
fn test_forced_predator_ranger_resolution_single_kill() {
    let predator = agent(1, AgentKind::Predator, 30, 30);
    let ranger = agent(2, AgentKind::Ranger, 30, 30);

    let predator_events = CountingObserver::new();
    let ranger_events = CountingObserver::new();
    predator.subscribe(predator_events.clone());
    ranger.subscribe(ranger_events.clone());

    let task = CombatTask {
        attacker: Arc::clone(&predator),
        defender: Arc::clone(&ranger),
    };
    // attack roll fixed above defense roll: the Predator must win, and
    // no reverse event may fire
    let mut dice = ScriptedDice::new([6, 1]);
    let report = resolve_task(&task, &mut dice).unwrap();

    assert_eq!(report.winner.id(), predator.id());
    assert_eq!(report.victim.id(), ranger.id());
    assert!(predator.is_alive());
    assert!(!ranger.is_alive());
    assert_eq!(predator_events.count(), 1);
    assert_eq!(ranger_events.count(), 0);
}

#[test]
fn test_opposing_tasks_cannot_mutually_kill_in_sequence() {
    // Two thieves with tasks in both directions: whichever resolves
    // first kills, the second is discarded as stale.
    let a = agent(1, AgentKind::Thief, 10, 10);
    let b = agent(2, AgentKind::Thief, 10, 10);

    let forward = CombatTask {
        attacker: Arc::clone(&a),
        defender: Arc::clone(&b),
    };
    let reverse = CombatTask {
        attacker: Arc::clone(&b),
        defender: Arc::clone(&a),
    };

    let mut dice = ScriptedDice::new([6, 1]);
    assert!(resolve_task(&forward, &mut dice).is_some());
    assert!(resolve_task(&reverse, &mut dice).is_none());

    assert!(a.is_alive());
    assert!(!b.is_alive());
}

#[test]
fn test_racing_consumers_kill_shared_defender_exactly_once() {
    // Many attackers aimed at one victim, resolved from several
    // consumer threads with always-winning dice. The re-check under the
    // victim's own lock must collapse the pile-up to exactly one kill.
    let victim = agent(100, AgentKind::Thief, 50, 50);
    let attackers: Vec<_> = (0..8)
        .map(|i| agent(i, AgentKind::Ranger, 50, 50))
        .collect();

    let tasks: Vec<CombatTask> = attackers
        .iter()
        .map(|attacker| CombatTask {
            attacker: Arc::clone(attacker),
            defender: Arc::clone(&victim),
        })
        .collect();

    let kills = AtomicUsize::new(0);
    thread::scope(|scope| {
        for task in &tasks {
            let kills = &kills;
            scope.spawn(move || {
                let mut dice = ScriptedDice::new([6, 1]);
                if resolve_task(task, &mut dice).is_some() {
                    kills.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(kills.load(Ordering::SeqCst), 1);
    assert!(!victim.is_alive());
    for attacker in &attackers {
        assert!(attacker.is_alive());
    }
}

#[test]
fn test_mixed_population_run_respects_kill_table() {
    // Rangers cannot be killed by Thieves and Predators cannot be killed
    // by anyone, so in a Predator+Thief world every Predator survives.
    let dir = tempfile::tempdir().unwrap();

    let roster_path = dir.path().join("mixed.txt");
    fs::write(
        &roster_path,
        "4\n1 NPC0 50 50\n1 NPC1 52 52\n3 NPC2 50 50\n3 NPC3 51 51\n",
    )
    .unwrap();

    let sim = Simulation::new(short_config(&dir, 23));
    sim.initialize_from_roster(&roster_path).unwrap();
    sim.run().unwrap();

    for agent in sim.agents() {
        if agent.kind() == AgentKind::Predator {
            assert!(agent.is_alive(), "{agent} should be unkillable here");
        }
    }
}
