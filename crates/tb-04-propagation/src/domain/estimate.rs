//! Reduction of per-tank records to one propagation time.

use tracing::warn;

use super::PropagationRecord;

#[derive(Clone, Debug, PartialEq)]
pub struct PropagationEstimate {
    /// Latest acceptance minus earliest announcement, in seconds. `None`
    /// when no announcement or no acceptance was observed.
    pub seconds: Option<f64>,
    pub announcements: usize,
    pub acceptances: usize,
    /// Tanks that were traced.
    pub traced: usize,
}

impl PropagationEstimate {
    /// Some tank is missing a timestamp; the estimate may be too short.
    pub fn precision_warning(&self) -> bool {
        self.announcements != self.traced || self.acceptances != self.traced
    }
}

/// `max(acceptances) − min(announcements)` over every record.
pub fn reduce(records: &[PropagationRecord], traced: usize) -> PropagationEstimate {
    let earliest = records.iter().filter_map(|r| r.first_announce).min();
    let latest = records.iter().filter_map(|r| r.accepted).max();

    let estimate = PropagationEstimate {
        seconds: earliest
            .zip(latest)
            .and_then(|(first, last)| (last - first).num_microseconds())
            .map(|micros| micros as f64 / 1_000_000.0),
        announcements: records.iter().filter(|r| r.first_announce.is_some()).count(),
        acceptances: records.iter().filter(|r| r.accepted.is_some()).count(),
        traced,
    };

    if estimate.precision_warning() {
        warn!(
            traced,
            announcements = estimate.announcements,
            acceptances = estimate.acceptances,
            "Timestamp count does not match traced tanks, propagation time may be imprecise"
        );
    }
    estimate
}
