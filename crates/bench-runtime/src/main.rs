//! # Tank-Bench Runtime
//!
//! Runs the transaction relay experiment against a tank network and prints
//! the aggregated report as JSON on stdout. Logs go to stderr.
//!
//! ## Startup Sequence
//!
//! 1. Parse the command line
//! 2. Initialize logging from the environment
//! 3. Load the network descriptor, or start the simulated network
//! 4. Run every iteration; Ctrl+C cancels the running phase
//! 5. Print the report and exit 0, or exit non-zero on the first fault

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use bench_runtime::{Args, BenchRuntime};
use tb_telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_telemetry(&TelemetryConfig::for_service("bench-runtime"))
        .context("Failed to initialize logging")?;

    let runtime = BenchRuntime::new(&args)?;

    let cancel = runtime.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling experiment");
            cancel.cancel();
        }
    });

    let result = runtime.run().await;
    interrupt.abort();
    let report = result?;

    let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
    println!("{json}");
    info!("Experiment finished");
    Ok(())
}
