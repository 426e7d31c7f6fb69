//! State carried across iterations and the final report.

use std::collections::BTreeMap;

use serde::Serialize;
use tb_03_traffic::{Direction, TrafficDiff, TrafficTotals};
use tb_04_propagation::PropagationEstimate;

/// What one iteration contributed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IterationSummary {
    /// 1-based.
    pub iteration: u32,
    pub submitted: usize,
    pub inv_entries: i64,
    pub propagation_secs: Option<f64>,
    pub announcements: usize,
    pub acceptances: usize,
    pub traced: usize,
    pub precision_warning: bool,
}

impl IterationSummary {
    pub fn new(
        iteration: u32,
        submitted: usize,
        sent: &TrafficDiff,
        estimate: &PropagationEstimate,
    ) -> Self {
        Self {
            iteration,
            submitted,
            inv_entries: sent.inv_entry_estimate(),
            propagation_secs: estimate.seconds,
            announcements: estimate.announcements,
            acceptances: estimate.acceptances,
            traced: estimate.traced,
            precision_warning: estimate.precision_warning(),
        }
    }
}

/// Running totals. Written only by the orchestrator between iterations.
#[derive(Clone, Debug, Default)]
pub struct ExperimentAggregate {
    traffic: TrafficTotals,
    iterations: Vec<IterationSummary>,
}

impl ExperimentAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one iteration. Only the `sent` half of `diff` is accumulated.
    pub fn fold(&mut self, submitted: usize, diff: &TrafficDiff, estimate: &PropagationEstimate) {
        let sent = diff.only(Direction::Sent);
        let iteration = self.traffic.iterations() + 1;
        self.iterations
            .push(IterationSummary::new(iteration, submitted, &sent, estimate));
        self.traffic.fold(&sent);
    }

    pub fn iterations(&self) -> u32 {
        self.traffic.iterations()
    }

    pub fn report(&self) -> ExperimentReport {
        let averages = self.traffic.averages(Direction::Sent);
        let samples: Vec<f64> = self
            .iterations
            .iter()
            .filter_map(|summary| summary.propagation_secs)
            .collect();
        let mean_propagation_secs =
            (!samples.is_empty()).then(|| samples.iter().sum::<f64>() / samples.len() as f64);

        ExperimentReport {
            iterations: self.traffic.iterations(),
            message_counts: averages.iter().map(|(m, a)| (m.clone(), a.count)).collect(),
            message_bytes: averages.iter().map(|(m, a)| (m.clone(), a.bytes)).collect(),
            mean_inv_entries: self.traffic.mean_inv_entries(),
            mean_propagation_secs,
            propagation_samples: samples.len(),
            precision_warnings: self
                .iterations
                .iter()
                .filter(|summary| summary.precision_warning)
                .count(),
            per_iteration: self.iterations.clone(),
        }
    }
}

/// Averages over every iteration of a run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExperimentReport {
    pub iterations: u32,
    /// Mean messages sent per iteration, by type.
    pub message_counts: BTreeMap<String, f64>,
    /// Mean bytes sent per iteration, by type.
    pub message_bytes: BTreeMap<String, f64>,
    pub mean_inv_entries: Option<f64>,
    /// Mean over iterations that produced a sample.
    pub mean_propagation_secs: Option<f64>,
    pub propagation_samples: usize,
    pub precision_warnings: usize,
    pub per_iteration: Vec<IterationSummary>,
}
