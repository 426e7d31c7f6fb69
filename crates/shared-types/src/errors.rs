//! # Error Types
//!
//! Errors shared by every node adapter and by the network descriptor.

use thiserror::Error;

/// Failure of a call against a node.
#[derive(Debug, Clone, Error)]
pub enum NodeError {
    /// The node answered with an RPC-level error.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The request never produced a usable response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response could not be interpreted.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The adapter does not offer this capability.
    #[error("Unsupported capability: {0}")]
    Unsupported(&'static str),

    /// The node's log stream ended.
    #[error("Log stream closed")]
    LogStreamClosed,
}

/// Invalid network descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("Network has no tanks")]
    Empty,

    #[error("Miner {miner} is out of range for {tanks} tanks")]
    MinerOutOfRange { miner: usize, tanks: usize },

    #[error("Tank at position {position} carries id {id}")]
    IdMismatch { position: usize, id: usize },
}
