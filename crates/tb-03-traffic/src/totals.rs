//! Running traffic totals across iterations.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::diff::TrafficDiff;
use crate::snapshot::Direction;

/// Mean change of one message type per iteration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct AverageCounter {
    pub count: f64,
    pub bytes: f64,
}

#[derive(Clone, Debug, Default)]
pub struct TrafficTotals {
    iterations: u32,
    traffic: TrafficDiff,
    inv_entries: i64,
}

impl TrafficTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one iteration's diff and its inventory estimate.
    pub fn fold(&mut self, diff: &TrafficDiff) {
        self.iterations += 1;
        self.inv_entries += diff.inv_entry_estimate();
        self.traffic += diff;
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Summed diff of every folded iteration.
    pub fn total(&self) -> &TrafficDiff {
        &self.traffic
    }

    /// Per-type averages over the folded iterations.
    pub fn averages(&self, direction: Direction) -> BTreeMap<String, AverageCounter> {
        if self.iterations == 0 {
            return BTreeMap::new();
        }
        let n = f64::from(self.iterations);
        self.traffic
            .direction(direction)
            .map(|(message, delta)| {
                let average = AverageCounter {
                    count: delta.count as f64 / n,
                    bytes: delta.bytes as f64 / n,
                };
                (message.to_string(), average)
            })
            .collect()
    }

    /// Mean inventory entries per iteration; `None` before the first fold.
    pub fn mean_inv_entries(&self) -> Option<f64> {
        (self.iterations > 0).then(|| self.inv_entries as f64 / f64::from(self.iterations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::TrafficSnapshot;
    use shared_types::{MessageCounter, MessageStats};

    fn sent_inv(count: u64, bytes: u64) -> TrafficDiff {
        let before = TrafficSnapshot::default();
        let after = TrafficSnapshot::from_stats([MessageStats {
            sent: BTreeMap::from([("inv".to_string(), MessageCounter { count, bytes })]),
            recv: BTreeMap::new(),
        }]);
        TrafficDiff::between(&before, &after)
    }

    #[test]
    fn test_empty_totals() {
        let totals = TrafficTotals::new();
        assert!(totals.averages(Direction::Sent).is_empty());
        assert_eq!(totals.mean_inv_entries(), None);
    }

    #[test]
    fn test_averages_over_iterations() {
        let mut totals = TrafficTotals::new();
        totals.fold(&sent_inv(4, 1000));
        totals.fold(&sent_inv(2, 800));

        let averages = totals.averages(Direction::Sent);
        assert_eq!(averages["inv"].count, 3.0);
        assert_eq!(averages["inv"].bytes, 900.0);
        // (25 + 21) / 2
        assert_eq!(totals.mean_inv_entries(), Some(23.0));
        assert_eq!(totals.iterations(), 2);
        assert_eq!(totals.total().get(Direction::Sent, "inv").count, 6);
    }
}
