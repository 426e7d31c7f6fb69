//! Capture errors.

use shared_types::{NodeError, TankId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrafficError {
    #[error("Failed to read traffic counters of {tank}: {source}")]
    Node {
        tank: TankId,
        #[source]
        source: NodeError,
    },

    #[error("Counter capture task aborted: {0}")]
    Join(String),
}
