//! Topology parameters.

use crate::errors::TopologyError;

/// Outbound connections per node when not specified.
pub const DEFAULT_OUTBOUND: usize = 8;

/// Shape of the network to generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TopologyConfig {
    /// Total number of nodes.
    pub size: usize,
    /// Nodes `0..reachable` accept inbound connections.
    pub reachable: usize,
    /// Outbound connections per node.
    pub outbound: usize,
}

impl TopologyConfig {
    pub fn new(size: usize, reachable: usize, outbound: usize) -> Self {
        Self {
            size,
            reachable,
            outbound,
        }
    }

    /// Reject parameters the rejection sampler could never satisfy.
    pub fn validate(&self) -> Result<(), TopologyError> {
        if self.reachable == 0 {
            return Err(TopologyError::Configuration(
                "reachable must be greater than 0".into(),
            ));
        }
        if self.size < self.reachable {
            return Err(TopologyError::Configuration(format!(
                "size ({}) must be at least reachable ({})",
                self.size, self.reachable
            )));
        }
        if self.outbound >= self.reachable {
            return Err(TopologyError::Configuration(format!(
                "outbound ({}) must be lower than reachable ({})",
                self.outbound, self.reachable
            )));
        }
        Ok(())
    }
}
