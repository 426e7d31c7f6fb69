//! Outcome of a completed barrier round.

use std::collections::BTreeMap;
use std::time::Duration;

use shared_types::TankId;

/// How a single tank satisfied the barrier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TankOutcome {
    Reached { polls: u32 },
    /// Accepted at `observed = target − 1` after the stall budget ran out.
    ToleratedFalsePositive { observed: usize, polls: u32 },
}

impl TankOutcome {
    pub fn polls(&self) -> u32 {
        match self {
            TankOutcome::Reached { polls } | TankOutcome::ToleratedFalsePositive { polls, .. } => {
                *polls
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct BarrierReport {
    pub barrier: &'static str,
    pub outcomes: BTreeMap<TankId, TankOutcome>,
    pub elapsed: Duration,
}

impl BarrierReport {
    /// Tanks accepted through the false-positive path.
    pub fn tolerated(&self) -> Vec<TankId> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, TankOutcome::ToleratedFalsePositive { .. }))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn all_reached(&self) -> bool {
        self.outcomes
            .values()
            .all(|outcome| matches!(outcome, TankOutcome::Reached { .. }))
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
