//! Experiment errors. Every variant aborts the run.

use shared_types::{Amount, NodeError, TankId};
use tb_02_sync_barrier::BarrierError;
use tb_03_traffic::TrafficError;
use tb_04_propagation::TraceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExperimentError {
    /// Fewer eligible outputs than transactions requested.
    #[error("Insufficient funds: {requested} outputs of at least {min_value} requested, {available} available")]
    InsufficientFunds {
        requested: usize,
        available: usize,
        min_value: Amount,
    },

    #[error(transparent)]
    Barrier(#[from] BarrierError),

    #[error("{operation} failed on {tank}: {source}")]
    Node {
        tank: TankId,
        operation: &'static str,
        #[source]
        source: NodeError,
    },

    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error(transparent)]
    Traffic(#[from] TrafficError),

    #[error("Invalid experiment configuration: {0}")]
    InvalidConfig(String),
}
