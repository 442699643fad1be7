use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use trail_sim::{
    load_simulation_config_from_env, overlay, MemoryStore, Sandbox, SimulationConfig,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless trail simulation sandbox", long_about = None)]
struct Args {
    /// Number of ticks to run
    #[arg(long, default_value_t = 500)]
    ticks: u64,

    /// World seed
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Number of agents placed around the home (at most 100)
    #[arg(long, default_value_t = 12)]
    agents: usize,

    /// Simulation config JSON (defaults to TRAIL_SIM_CONFIG_PATH, then builtin)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the named layer as overlay circles (JSON) after the run
    #[arg(long = "dump-layer")]
    dump_layer: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("Failed to load config at {}", path.display()))?,
        None => load_simulation_config_from_env().0,
    };

    let mut sandbox = Sandbox::demo(args.seed, args.agents, config);
    let mut store = MemoryStore::new();
    let mut moved = 0u64;
    let mut blocked = 0u64;
    for _ in 0..args.ticks {
        let report = sandbox.step();
        moved += report.moved as u64;
        blocked += report.blocked as u64;
    }
    let synced = sandbox
        .sync(&mut store)
        .context("Failed to persist sandbox state")?;

    info!(
        ticks = sandbox.tick(),
        moved,
        blocked,
        stored = sandbox.world.stored_total(),
        upgraded = sandbox.world.upgrade_progress(),
        synced_layers = synced,
        store_bytes = store.encoded_len(),
        "trail_sim headless run complete"
    );

    if let Some(name) = &args.dump_layer {
        let layer = sandbox
            .region
            .grid
            .layer(name)
            .with_context(|| format!("Unknown layer `{name}`"))?;
        let circles = overlay(layer, "#ffffff");
        println!("{}", serde_json::to_string_pretty(&circles)?);
    }

    Ok(())
}
