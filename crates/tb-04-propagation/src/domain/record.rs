//! Marked transaction and per-tank observations.

use shared_types::{PendingEntry, TankId, Timestamp};

/// The transaction whose propagation is timed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkedTransaction {
    pub txid: String,
    pub wtxid: String,
    /// Tank that broadcasts it; excluded from tracing.
    pub origin: TankId,
}

/// What one traced tank saw of the marked transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropagationRecord {
    pub tank: TankId,
    pub first_announce: Option<Timestamp>,
    pub accepted: Option<Timestamp>,
}

impl PropagationRecord {
    pub fn empty(tank: TankId) -> Self {
        Self {
            tank,
            first_announce: None,
            accepted: None,
        }
    }

    pub fn from_entry(tank: TankId, entry: PendingEntry) -> Self {
        Self {
            tank,
            first_announce: entry.first_announce_time,
            accepted: entry.accepted_time,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.first_announce.is_some() && self.accepted.is_some()
    }
}
