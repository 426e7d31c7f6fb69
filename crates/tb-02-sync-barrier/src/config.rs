//! Barrier timing.

use std::time::Duration;

/// Timing of the connectivity and height barriers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BarrierConfig {
    /// Delay between two reads of the same tank.
    pub poll_interval: Duration,
    /// Turns a hang into [`crate::BarrierError::Timeout`]. `None` waits forever.
    pub deadline: Option<Duration>,
}

impl Default for BarrierConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            deadline: None,
        }
    }
}

/// Timing and false-positive tolerance of the convergence barrier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvergenceConfig {
    pub poll_interval: Duration,
    /// Consecutive polls at `target − 1` accepted as a filter false positive.
    /// Zero disables the tolerance.
    pub stall_budget: u32,
    pub deadline: Option<Duration>,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            stall_budget: 10,
            deadline: None,
        }
    }
}
