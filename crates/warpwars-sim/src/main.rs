//! Headless WarpWars match runner.
//!
//! Loads a match configuration, lets the autopilot play every side and logs
//! what happened. Nothing is rendered.
//!
//! Run with: `cargo run -p warpwars-sim -- --config match.json --ticks 2000`

mod autopilot;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use warpwars_core::{GameConfig, GameEvent, MapConfig, Simulation};

use crate::autopilot::Autopilot;

/// Play a scripted WarpWars match without a screen
#[derive(Parser, Debug)]
#[command(name = "warpwars-sim")]
#[command(about = "Headless WarpWars match runner", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON match configuration; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of ticks to run
    #[arg(short, long, default_value_t = 2000)]
    ticks: u64,

    /// Time step per tick, in time units
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Scatter a random map with this seed (overrides the config's map seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Print every event as a JSON line on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;
    if let Some(seed) = cli.seed {
        let map = config.map.get_or_insert_with(MapConfig::default);
        map.seed = seed;
    }

    let mut sim = Simulation::new(config);
    sim.start().context("failed to start match")?;
    report(&mut sim, cli.json)?;

    let autopilot = Autopilot;
    while sim.tick() < cli.ticks && sim.turns().len() > 1 {
        let frame = autopilot.next_frame(&sim);
        sim.step(&frame, cli.dt);
        report(&mut sim, cli.json)?;
    }

    match sim.turns().roster() {
        [winner] => {
            let name = sim.arena().player(*winner).map_or("?", |p| p.name());
            info!(winner = %winner, name, ticks = sim.tick(), "match decided");
        }
        [] => info!(ticks = sim.tick(), "no players left"),
        roster => warn!(
            remaining = roster.len(),
            ticks = sim.tick(),
            "tick limit reached without a winner"
        ),
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    GameConfig::from_json_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn report(sim: &mut Simulation, json: bool) -> Result<()> {
    let tick = sim.tick();
    for event in sim.take_events() {
        if json {
            println!("{}", serde_json::to_string(&event)?);
            continue;
        }
        match &event {
            GameEvent::TurnStarted { name, .. } => info!(tick, "{name}'s turn"),
            GameEvent::PlayerEliminated { player } => info!(tick, player = %player, "eliminated"),
            GameEvent::Colonized { planet, owner, .. } => {
                info!(tick, planet = %planet, owner = %owner, "colonized");
            }
            GameEvent::ShipsBuilt { planet, ships } => {
                info!(tick, planet = %planet, count = ships.len(), "ships built");
            }
            GameEvent::ShipDestroyed { ship } => info!(tick, ship = %ship, "ship destroyed"),
            GameEvent::PlanetDestroyed { planet } => {
                info!(tick, planet = %planet, "planet destroyed");
            }
            other => tracing::debug!(tick, ?other, "event"),
        }
    }
    Ok(())
}
