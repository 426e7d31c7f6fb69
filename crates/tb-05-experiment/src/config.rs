//! Experiment parameters.

use std::time::Duration;

use shared_types::Amount;
use tb_02_sync_barrier::{BarrierConfig, ConvergenceConfig};
use tb_04_propagation::TracerKind;

use crate::errors::ExperimentError;

/// Smallest output used to fund a transaction: 0.0002 coin.
pub const DEFAULT_MIN_UTXO: Amount = Amount::from_units(20_000);

/// Fee withheld from the change output: 0.00001 coin.
pub const DEFAULT_FEE: Amount = Amount::from_units(1_000);

/// Name of the miner's wallet, loaded or created on demand.
pub const DEFAULT_WALLET: &str = "miner";

#[derive(Clone, Debug)]
pub struct ExperimentConfig {
    /// Transactions per iteration.
    pub tx_count: usize,
    pub iterations: u32,
    pub min_utxo: Amount,
    pub fee: Amount,
    pub wallet: String,
    pub connectivity: BarrierConfig,
    pub height: BarrierConfig,
    pub convergence: ConvergenceConfig,
    pub tracer: TracerKind,
    /// How long the log tracer keeps reading after convergence.
    pub log_linger: Duration,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            tx_count: 80,
            iterations: 1,
            min_utxo: DEFAULT_MIN_UTXO,
            fee: DEFAULT_FEE,
            wallet: DEFAULT_WALLET.to_string(),
            connectivity: BarrierConfig::default(),
            height: BarrierConfig::default(),
            convergence: ConvergenceConfig::default(),
            tracer: TracerKind::default(),
            log_linger: Duration::from_secs(2),
        }
    }
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<(), ExperimentError> {
        if self.tx_count == 0 {
            return Err(ExperimentError::InvalidConfig(
                "tx_count must be positive".into(),
            ));
        }
        if self.iterations == 0 {
            return Err(ExperimentError::InvalidConfig(
                "iteration count must be positive".into(),
            ));
        }
        if self.wallet.trim().is_empty() {
            return Err(ExperimentError::InvalidConfig(
                "wallet name must not be empty".into(),
            ));
        }
        Ok(())
    }
}
