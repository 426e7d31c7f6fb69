//! Barrier errors.

use shared_types::{NodeError, TankId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BarrierError {
    /// The deadline expired; `pending` lists the tanks still polling.
    #[error("{barrier} barrier timed out waiting for {} tank(s): {pending:?}", .pending.len())]
    Timeout {
        barrier: &'static str,
        pending: Vec<TankId>,
    },

    /// The caller cancelled the round.
    #[error("{barrier} barrier cancelled")]
    Cancelled { barrier: &'static str },

    #[error("{tank} failed during {barrier} barrier: {source}")]
    Node {
        barrier: &'static str,
        tank: TankId,
        #[source]
        source: NodeError,
    },

    /// A poller task panicked.
    #[error("{barrier} poller aborted: {reason}")]
    Join {
        barrier: &'static str,
        reason: String,
    },
}
