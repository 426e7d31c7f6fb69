//! Tracing errors. A missing timestamp is not an error; see
//! [`crate::PropagationEstimate::precision_warning`].

use shared_types::{NodeError, TankId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("Failed to trace on {tank}: {source}")]
    Node {
        tank: TankId,
        #[source]
        source: NodeError,
    },

    #[error("Tracer task aborted: {0}")]
    Join(String),

    #[error("Trace round cancelled with {collected}/{traced} records collected")]
    Cancelled { collected: usize, traced: usize },

    #[error("Unknown tracer '{0}' (expected 'state' or 'log')")]
    UnknownStrategy(String),
}
