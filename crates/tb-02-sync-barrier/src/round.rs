//! One fan-out round: a poller per tank, AND-joined, cancelled as a unit.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use shared_types::{Tank, TankId};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::domain::{BarrierReport, TankOutcome};
use crate::errors::BarrierError;

type PollerResult = (TankId, Result<TankOutcome, BarrierError>);

/// Spawn `poller` once per tank and wait for all of them.
///
/// The first poller error, or expiry of `deadline`, cancels the remaining
/// pollers and is returned.
pub(crate) async fn run_round<F, Fut>(
    barrier: &'static str,
    tanks: &[Tank],
    deadline: Option<Duration>,
    cancel: &CancellationToken,
    poller: F,
) -> Result<BarrierReport, BarrierError>
where
    F: Fn(Tank, CancellationToken) -> Fut,
    Fut: Future<Output = Result<TankOutcome, BarrierError>> + Send + 'static,
{
    let started = Instant::now();
    let round = cancel.child_token();

    let mut set: JoinSet<PollerResult> = JoinSet::new();
    for tank in tanks {
        let id = tank.id;
        let poll = poller(tank.clone(), round.clone());
        set.spawn(async move { (id, poll.await) });
    }

    let mut outcomes = BTreeMap::new();
    let joined = match deadline {
        Some(limit) => {
            tokio::time::timeout(limit, collect_outcomes(barrier, &mut set, &mut outcomes))
                .await
                .ok()
        }
        None => Some(collect_outcomes(barrier, &mut set, &mut outcomes).await),
    };

    let result = match joined {
        Some(Ok(())) => Ok(BarrierReport {
            barrier,
            outcomes,
            elapsed: started.elapsed(),
        }),
        Some(Err(error)) => Err(error),
        None => {
            let pending: Vec<TankId> = tanks
                .iter()
                .map(|tank| tank.id)
                .filter(|id| !outcomes.contains_key(id))
                .collect();
            warn!(
                barrier,
                pending = pending.len(),
                completed = outcomes.len(),
                "Barrier deadline expired"
            );
            Err(BarrierError::Timeout { barrier, pending })
        }
    };

    if result.is_err() {
        round.cancel();
        set.shutdown().await;
    }
    result
}

async fn collect_outcomes(
    barrier: &'static str,
    set: &mut JoinSet<PollerResult>,
    outcomes: &mut BTreeMap<TankId, TankOutcome>,
) -> Result<(), BarrierError> {
    while let Some(joined) = set.join_next().await {
        let (id, outcome) = joined.map_err(|e| BarrierError::Join {
            barrier,
            reason: e.to_string(),
        })?;
        outcomes.insert(id, outcome?);
    }
    Ok(())
}

/// Sleep one poll interval unless the round is cancelled first.
pub(crate) async fn pause(
    barrier: &'static str,
    interval: Duration,
    token: &CancellationToken,
) -> Result<(), BarrierError> {
    tokio::select! {
        _ = token.cancelled() => Err(BarrierError::Cancelled { barrier }),
        _ = tokio::time::sleep(interval) => Ok(()),
    }
}
