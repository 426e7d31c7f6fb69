//! # Experiment Orchestrator (tb-05)
//!
//! Runs the bandwidth and propagation experiment against a [`Network`] of
//! tanks:
//!
//! ```text
//! AwaitingConnectivity
//!   └─ per iteration:
//!        ReplenishFunds → SnapshotBefore → GenerateTxs → SelectMarkedTx
//!        → Broadcast → AwaitConvergence → SnapshotAfter → TraceMarkedTx
//!        → FoldStatistics
//! Reporting
//! ```
//!
//! Every transaction spends one output of the miner's wallet into three or
//! four fresh outputs, so each iteration leaves more outputs for the next.
//! Senders rotate round-robin starting at tank 0; the first transaction is
//! the marked one and its origin is excluded from tracing.
//!
//! [`Network`]: shared_types::Network

pub mod config;
pub mod domain;
pub mod errors;
pub mod service;

pub use config::{ExperimentConfig, DEFAULT_FEE, DEFAULT_MIN_UTXO, DEFAULT_WALLET};
pub use domain::{
    blocks_to_mine, eligible_utxos, split_outputs, BroadcastSchedule, ExperimentAggregate,
    ExperimentReport, GeneratedTransaction, IterationSummary, Phase, TransactionPlan,
    COINBASE_MATURITY,
};
pub use errors::ExperimentError;
pub use service::Experiment;
