//! tb-topology: writes the network document for a randomly wired tank network.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use tb_01_topology::{generate, NetworkDocument, TopologyConfig, DEFAULT_OUTBOUND};
use tb_telemetry::{init_telemetry, TelemetryConfig};

/// Random outbound-link topology generator
#[derive(Parser, Debug)]
#[command(name = "tb-topology")]
#[command(about = "Generate a random tank network document")]
struct Args {
    /// Number of tanks that accept inbound connections (tank-0000 upward)
    #[arg(long)]
    reachable: usize,

    /// Total number of tanks
    #[arg(long)]
    size: usize,

    /// Outbound connections per tank
    #[arg(long, default_value_t = DEFAULT_OUTBOUND)]
    outbound: usize,

    /// RNG seed; drawn from entropy when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Output file
    #[arg(short, long, default_value = tb_01_topology::DEFAULT_OUTPUT_PATH)]
    output: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_telemetry(&TelemetryConfig::for_service("tb-topology"))
        .context("Failed to initialize logging")?;

    let config = TopologyConfig::new(args.size, args.reachable, args.outbound);
    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!(
        size = config.size,
        reachable = config.reachable,
        outbound = config.outbound,
        seed,
        "Generating topology"
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let graph = generate(&config, &mut rng).context("Topology generation failed")?;

    NetworkDocument::from_graph(&graph)
        .write_to(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    Ok(())
}
