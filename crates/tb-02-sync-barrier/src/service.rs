//! # Barrier Operations
//!
//! Every operation takes the tanks to wait on explicitly; callers exclude
//! the miner from the height barrier themselves.

use shared_types::Tank;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{BarrierConfig, ConvergenceConfig};
use crate::domain::{BarrierReport, StallOutcome, StallTracker, TankOutcome};
use crate::errors::BarrierError;
use crate::round::{pause, run_round};

const CONNECTIVITY: &str = "connectivity";
const HEIGHT: &str = "height";
const MEMPOOL: &str = "mempool";

/// Wait until every tank holds at least `init_peers` manual peers with a
/// completed handshake.
pub async fn wait_for_connectivity(
    tanks: &[Tank],
    config: &BarrierConfig,
    cancel: &CancellationToken,
) -> Result<BarrierReport, BarrierError> {
    info!(tanks = tanks.len(), "Waiting for manual peer connections");
    let interval = config.poll_interval;

    let report = run_round(CONNECTIVITY, tanks, config.deadline, cancel, move |tank, token| {
        async move {
            let mut polls = 0;
            loop {
                polls += 1;
                let peers = tank.handle.peers().await.map_err(|source| BarrierError::Node {
                    barrier: CONNECTIVITY,
                    tank: tank.id,
                    source,
                })?;
                let connected = peers
                    .iter()
                    .filter(|peer| peer.is_manual() && peer.handshake_complete)
                    .count();
                debug!(tank = %tank.id, "connected {}/{}", connected, tank.init_peers);
                if connected >= tank.init_peers {
                    return Ok(TankOutcome::Reached { polls });
                }
                pause(CONNECTIVITY, interval, &token).await?;
            }
        }
    })
    .await?;

    info!(elapsed_ms = report.elapsed.as_millis() as u64, "All tanks connected");
    Ok(report)
}

/// Wait until every tank reports chain height `≥ target`.
pub async fn wait_for_height(
    tanks: &[Tank],
    target: u64,
    config: &BarrierConfig,
    cancel: &CancellationToken,
) -> Result<BarrierReport, BarrierError> {
    info!(target, tanks = tanks.len(), "Waiting for chain height");
    let interval = config.poll_interval;

    let report = run_round(HEIGHT, tanks, config.deadline, cancel, move |tank, token| {
        async move {
            let mut polls = 0;
            loop {
                polls += 1;
                let height = tank
                    .handle
                    .chain_height()
                    .await
                    .map_err(|source| BarrierError::Node {
                        barrier: HEIGHT,
                        tank: tank.id,
                        source,
                    })?;
                if height >= target {
                    debug!(tank = %tank.id, height, polls, "Height reached");
                    return Ok(TankOutcome::Reached { polls });
                }
                pause(HEIGHT, interval, &token).await?;
            }
        }
    })
    .await?;

    info!(
        target,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "All tanks at target height"
    );
    Ok(report)
}

/// Wait until every tank's pending set holds `≥ target` transactions, or is
/// stuck at `target − 1` for the configured stall budget.
pub async fn wait_for_mempool(
    tanks: &[Tank],
    target: usize,
    config: &ConvergenceConfig,
    cancel: &CancellationToken,
) -> Result<BarrierReport, BarrierError> {
    info!(target, tanks = tanks.len(), "Waiting for pending sets to converge");
    let interval = config.poll_interval;
    let budget = config.stall_budget;

    let report = run_round(MEMPOOL, tanks, config.deadline, cancel, move |tank, token| {
        async move {
            let mut tracker = StallTracker::new(target, budget);
            let mut polls = 0;
            loop {
                polls += 1;
                let size = tank
                    .handle
                    .pending_transactions()
                    .await
                    .map_err(|source| BarrierError::Node {
                        barrier: MEMPOOL,
                        tank: tank.id,
                        source,
                    })?
                    .len();

                match tracker.observe(size) {
                    StallOutcome::Reached => {
                        debug!(tank = %tank.id, size, polls, "Pending set converged");
                        return Ok(TankOutcome::Reached { polls });
                    }
                    StallOutcome::ToleratedFalsePositive => {
                        warn!(
                            tank = %tank.id,
                            observed = size,
                            target,
                            polls,
                            "Pending set stuck one below target, accepting as filter false positive"
                        );
                        return Ok(TankOutcome::ToleratedFalsePositive {
                            observed: size,
                            polls,
                        });
                    }
                    StallOutcome::Pending => {}
                }
                pause(MEMPOOL, interval, &token).await?;
            }
        }
    })
    .await?;

    info!(
        target,
        tolerated = report.tolerated().len(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "All pending sets converged"
    );
    Ok(report)
}
