//! Command line of the orchestrator.

use std::num::{NonZeroU32, NonZeroUsize};
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgGroup, Parser};
use tb_02_sync_barrier::{BarrierConfig, ConvergenceConfig};
use tb_04_propagation::TracerKind;
use tb_05_experiment::ExperimentConfig;

/// Bandwidth and propagation experiment against a tank network
#[derive(Parser, Debug, Clone)]
#[command(name = "bench-runtime")]
#[command(about = "Run the transaction relay experiment and report traffic and propagation")]
#[command(group(ArgGroup::new("source").required(true).args(["network", "simulate"])))]
pub struct Args {
    /// Transactions broadcast per iteration
    #[arg(long = "tx_count", default_value = "80")]
    pub tx_count: NonZeroUsize,

    /// Number of iterations
    #[arg(long = "n", default_value = "1")]
    pub iterations: NonZeroU32,

    /// TOML network descriptor of a deployed network
    #[arg(long, value_name = "PATH")]
    pub network: Option<PathBuf>,

    /// Run against an in-process ring of this many simulated tanks
    #[arg(long, value_name = "NODES")]
    pub simulate: Option<usize>,

    /// Propagation tracer: `state` or `log`
    #[arg(long, default_value = "state")]
    pub tracer: TracerKind,

    /// Deadline of the connectivity and height barriers
    #[arg(long)]
    pub barrier_deadline_secs: Option<u64>,

    /// Deadline of the mempool convergence barrier
    #[arg(long)]
    pub convergence_deadline_secs: Option<u64>,

    /// Polls at one short of the target tolerated as a filter false positive
    #[arg(long, default_value_t = 10)]
    pub stall_budget: u32,

    /// How long the log tracer keeps reading after convergence
    #[arg(long, default_value_t = 2000)]
    pub log_linger_ms: u64,

    /// HTTP timeout of every RPC call
    #[arg(long, default_value_t = 30)]
    pub rpc_timeout_secs: u64,

    /// Seed of the simulated network
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Args {
    pub fn experiment_config(&self) -> ExperimentConfig {
        let barrier = BarrierConfig {
            deadline: self.barrier_deadline_secs.map(Duration::from_secs),
            ..Default::default()
        };
        ExperimentConfig {
            tx_count: self.tx_count.get(),
            iterations: self.iterations.get(),
            connectivity: barrier.clone(),
            height: barrier,
            convergence: ConvergenceConfig {
                stall_budget: self.stall_budget,
                deadline: self.convergence_deadline_secs.map(Duration::from_secs),
                ..Default::default()
            },
            tracer: self.tracer,
            log_linger: Duration::from_millis(self.log_linger_ms),
            ..Default::default()
        }
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("bench-runtime").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--simulate", "4"]).unwrap();
        let config = args.experiment_config();
        assert_eq!(config.tx_count, 80);
        assert_eq!(config.iterations, 1);
        assert_eq!(config.tracer, TracerKind::State);
        assert_eq!(config.convergence.stall_budget, 10);
        assert_eq!(config.connectivity.deadline, None);
        assert_eq!(config.convergence.deadline, None);
        assert_eq!(args.rpc_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_flags() {
        let args = parse(&[
            "--network",
            "net.toml",
            "--tx_count",
            "4",
            "--n",
            "3",
            "--tracer",
            "log",
            "--barrier-deadline-secs",
            "60",
            "--convergence-deadline-secs",
            "120",
            "--stall-budget",
            "0",
        ])
        .unwrap();
        let config = args.experiment_config();
        assert_eq!(args.network, Some(PathBuf::from("net.toml")));
        assert_eq!(config.tx_count, 4);
        assert_eq!(config.iterations, 3);
        assert_eq!(config.tracer, TracerKind::Log);
        assert_eq!(config.height.deadline, Some(Duration::from_secs(60)));
        assert_eq!(config.convergence.deadline, Some(Duration::from_secs(120)));
        assert_eq!(config.convergence.stall_budget, 0);
    }

    #[test]
    fn test_zero_counts_rejected() {
        assert!(parse(&["--simulate", "4", "--tx_count", "0"]).is_err());
        assert!(parse(&["--simulate", "4", "--n", "0"]).is_err());
    }

    #[test]
    fn test_exactly_one_source() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--network", "net.toml", "--simulate", "4"]).is_err());
    }

    #[test]
    fn test_unknown_tracer() {
        assert!(parse(&["--simulate", "4", "--tracer", "pcap"]).is_err());
    }
}
