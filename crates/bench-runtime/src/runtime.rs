//! Wiring of one run: network source, experiment, report.

use anyhow::{bail, Context, Result};
use shared_types::Network;
use tb_04_propagation::TracerKind;
use tb_05_experiment::{Experiment, ExperimentReport};
use tb_sim::{SimConfig, SimNetwork};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::Args;
use crate::config::NetworkDescriptor;

/// The simulated network always funds from its first tank.
const SIMULATED_MINER: usize = 0;

/// One configured experiment, ready to run.
pub struct BenchRuntime {
    experiment: Experiment,
    /// Keeps the in-process network alive for `--simulate` runs.
    _simulated: Option<SimNetwork>,
}

impl BenchRuntime {
    pub fn new(args: &Args) -> Result<Self> {
        let (network, simulated) = match (&args.network, args.simulate) {
            (Some(path), _) => {
                let descriptor = NetworkDescriptor::load(path)
                    .with_context(|| format!("Failed to load {}", path.display()))?;
                if args.tracer == TracerKind::Log && !descriptor.has_logs() {
                    bail!("The log tracer needs a log_path for every tank");
                }
                let network = descriptor
                    .into_network(args.rpc_timeout())
                    .context("Invalid network descriptor")?;
                (network, None)
            }
            (None, Some(tanks)) => {
                let (network, simulated) = simulated_network(tanks, args.seed)?;
                (network, Some(simulated))
            }
            (None, None) => bail!("Either --network or --simulate is required"),
        };

        info!(
            tanks = network.len(),
            miner = %network.miner().name,
            simulated = simulated.is_some(),
            "Tank network ready"
        );

        let experiment = Experiment::new(network, args.experiment_config())
            .context("Invalid experiment configuration")?;
        Ok(Self {
            experiment,
            _simulated: simulated,
        })
    }

    /// Cancelling the token aborts the current barrier or trace round.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.experiment.cancellation_token()
    }

    pub async fn run(&self) -> Result<ExperimentReport> {
        self.experiment.run().await.context("Experiment failed")
    }
}

fn simulated_network(tanks: usize, seed: Option<u64>) -> Result<(Network, SimNetwork)> {
    let mut config = SimConfig::ring(tanks);
    if let Some(seed) = seed {
        config.seed = seed;
    }
    let simulated = SimNetwork::new(config).context("Invalid simulated network")?;
    let network = simulated
        .network(SIMULATED_MINER)
        .context("Invalid simulated network")?;
    Ok((network, simulated))
}
