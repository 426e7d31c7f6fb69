//! # Tracer Strategies
//!
//! A tracer is armed before the broadcast and returns a [`TraceRound`]. The
//! round owns one task per traced tank. [`TraceRound::collect`] opens the
//! release gate once the network has converged, joins every task and reduces
//! the records. Cancelling the run's token while collecting aborts the tasks.

mod log;
mod state;

pub use log::LogTracer;
pub use state::StateQueryTracer;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use shared_types::Tank;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::{reduce, MarkedTransaction, PropagationEstimate, PropagationRecord};
use crate::errors::TraceError;

#[async_trait]
pub trait PropagationTracer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Start one task per tank in `tanks`. Must return before the marked
    /// transaction is broadcast.
    async fn arm(
        &self,
        tanks: &[Tank],
        marked: &MarkedTransaction,
    ) -> Result<TraceRound, TraceError>;
}

/// Result of a collected round.
#[derive(Clone, Debug)]
pub struct TraceOutcome {
    /// One record per traced tank, by tank id.
    pub records: Vec<PropagationRecord>,
    pub estimate: PropagationEstimate,
}

/// Armed tracer tasks waiting for the release gate.
pub struct TraceRound {
    gate: watch::Sender<bool>,
    tasks: JoinSet<Result<PropagationRecord, TraceError>>,
    traced: usize,
}

impl TraceRound {
    /// A round with its gate closed. Tasks subscribe with [`Self::gate`].
    pub(crate) fn new() -> Self {
        let (gate, _) = watch::channel(false);
        Self {
            gate,
            tasks: JoinSet::new(),
            traced: 0,
        }
    }

    pub(crate) fn gate(&self) -> watch::Receiver<bool> {
        self.gate.subscribe()
    }

    pub(crate) fn spawn<F>(&mut self, task: F)
    where
        F: std::future::Future<Output = Result<PropagationRecord, TraceError>> + Send + 'static,
    {
        self.traced += 1;
        self.tasks.spawn(task);
    }

    pub fn traced(&self) -> usize {
        self.traced
    }

    /// Release the gate and wait for every tracer task (AND-join).
    ///
    /// Returns [`TraceError::Cancelled`] once `cancel` fires; the remaining
    /// tasks are aborted with the round.
    pub async fn collect(mut self, cancel: &CancellationToken) -> Result<TraceOutcome, TraceError> {
        self.gate.send_replace(true);

        let traced = self.traced;
        let mut records = Vec::with_capacity(traced);
        loop {
            let joined = tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(TraceError::Cancelled {
                        collected: records.len(),
                        traced,
                    });
                }
                joined = self.tasks.join_next() => joined,
            };
            let Some(joined) = joined else { break };
            let record = joined.map_err(|e| TraceError::Join(e.to_string()))??;
            records.push(record);
        }
        records.sort_by_key(|record| record.tank);

        let estimate = reduce(&records, self.traced);
        debug!(
            traced = self.traced,
            seconds = ?estimate.seconds,
            "Trace round collected"
        );
        Ok(TraceOutcome { records, estimate })
    }
}

/// Wait until `collect` opens the gate. A dropped round counts as open.
pub(crate) async fn released(mut gate: watch::Receiver<bool>) {
    let _ = gate.wait_for(|open| *open).await;
}

/// Which tracer a run uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TracerKind {
    /// Query each tank's pending-set record after convergence.
    #[default]
    State,
    /// Follow each tank's live log.
    Log,
}

impl TracerKind {
    pub fn build(self, log_linger: Duration) -> Box<dyn PropagationTracer> {
        match self {
            TracerKind::State => Box::new(StateQueryTracer),
            TracerKind::Log => Box::new(LogTracer::new(log_linger)),
        }
    }
}

impl FromStr for TracerKind {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "state" => Ok(TracerKind::State),
            "log" => Ok(TracerKind::Log),
            other => Err(TraceError::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for TracerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TracerKind::State => write!(f, "state"),
            TracerKind::Log => write!(f, "log"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracer_kind_parsing() {
        assert_eq!("state".parse::<TracerKind>().unwrap(), TracerKind::State);
        assert_eq!("LOG".parse::<TracerKind>().unwrap(), TracerKind::Log);
        assert!(matches!(
            "gossip".parse::<TracerKind>(),
            Err(TraceError::UnknownStrategy(_))
        ));
        assert_eq!(TracerKind::default().to_string(), "state");
    }

    #[test]
    fn test_build_names() {
        let linger = Duration::from_secs(1);
        assert_eq!(TracerKind::State.build(linger).name(), "state");
        assert_eq!(TracerKind::Log.build(linger).name(), "log");
    }

    #[tokio::test]
    async fn test_empty_round_collects() {
        let outcome = TraceRound::new()
            .collect(&CancellationToken::new())
            .await
            .unwrap();
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.estimate.seconds, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_round_stops_waiting() {
        let mut round = TraceRound::new();
        let gate = round.gate();
        round.spawn(async move {
            released(gate).await;
            std::future::pending::<()>().await;
            Ok(PropagationRecord::empty(shared_types::TankId(1)))
        });

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            trigger.cancel();
        });

        let err = round.collect(&cancel).await.unwrap_err();
        assert!(matches!(
            err,
            TraceError::Cancelled {
                collected: 0,
                traced: 1
            }
        ));
    }
}
