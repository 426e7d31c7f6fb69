use std::fmt;

/// Orchestrator state. Every transition is logged with the iteration number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    AwaitingConnectivity,
    ReplenishFunds,
    SnapshotBefore,
    GenerateTxs,
    SelectMarkedTx,
    Broadcast,
    AwaitConvergence,
    SnapshotAfter,
    TraceMarkedTx,
    FoldStatistics,
    Reporting,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::AwaitingConnectivity => "awaiting_connectivity",
            Phase::ReplenishFunds => "replenish_funds",
            Phase::SnapshotBefore => "snapshot_before",
            Phase::GenerateTxs => "generate_txs",
            Phase::SelectMarkedTx => "select_marked_tx",
            Phase::Broadcast => "broadcast",
            Phase::AwaitConvergence => "await_convergence",
            Phase::SnapshotAfter => "snapshot_after",
            Phase::TraceMarkedTx => "trace_marked_tx",
            Phase::FoldStatistics => "fold_statistics",
            Phase::Reporting => "reporting",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
