//! Wildmark - Entry Point
//!
//! Seeds the registry with a fixed number of random agents, runs the
//! simulation for the configured duration, then prints the survivors and
//! writes the survivor roster and a JSON run report.

use std::path::Path;

use wildmark::core::config::SimulationConfig;
use wildmark::core::error::Result;
use wildmark::roster;
use wildmark::simulation::Simulation;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("wildmark=info")),
        )
        .init();

    let config = SimulationConfig::default();
    tracing::info!(agents = config.agent_count, "Wildmark starting");

    let sim = Simulation::new(config.clone());
    sim.initialize(config.agent_count)?;
    let report = sim.run()?;

    println!("\n=== Simulation Over ===");
    println!("Survivors: {}", report.survivor_count);
    for agent in sim.alive_agents() {
        println!("  {agent}");
    }

    roster::save(Path::new("survivors.txt"), &sim.alive_agents())?;
    std::fs::write("report.json", serde_json::to_string_pretty(&report)?)?;

    Ok(())
}
