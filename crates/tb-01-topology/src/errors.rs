//! Topology errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopologyError {
    /// Parameters that can never yield a graph; rejected before sampling.
    #[error("Invalid topology configuration: {0}")]
    Configuration(String),

    /// The mirror constraint kept starving nodes of candidates.
    #[error(
        "No topology found after {attempts} attempts \
         (size={size}, reachable={reachable}, outbound={outbound})"
    )]
    Unsatisfiable {
        attempts: usize,
        size: usize,
        reachable: usize,
        outbound: usize,
    },

    #[error("Failed to write network document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize network document: {0}")]
    Serialize(#[from] serde_yaml::Error),
}
