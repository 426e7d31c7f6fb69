//! Round-robin assignment of transactions to sending tanks.

use shared_types::TankId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BroadcastSchedule {
    tanks: usize,
}

impl BroadcastSchedule {
    /// `tanks` must be non-zero; a [`shared_types::Network`] never is.
    pub fn new(tanks: usize) -> Self {
        Self {
            tanks: tanks.max(1),
        }
    }

    /// Sender of the `index`-th transaction, starting at tank 0.
    pub fn sender(&self, index: usize) -> TankId {
        TankId(index % self.tanks)
    }

    /// Upper bound on transactions any one tank sends out of `count`.
    pub fn max_per_tank(&self, count: usize) -> usize {
        count.div_ceil(self.tanks)
    }
}
