//! Live log following.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;
use futures::StreamExt;
use shared_types::{LogLines, NodeError, Tank, TankId};
use tokio::sync::watch;
use tracing::debug;

use super::{released, PropagationTracer, TraceRound};
use crate::domain::{MarkedTransaction, PropagationRecord};
use crate::errors::TraceError;
use crate::log_scan::{LogPatterns, LogScanner};

/// Scans each tank's log for the announcement and acceptance lines of the
/// marked transaction.
///
/// A tank that never logs one of the lines would keep its task waiting, so
/// once the round is released every task gets `linger` to read what is
/// still buffered and then reports what it has.
#[derive(Clone, Debug)]
pub struct LogTracer {
    linger: Duration,
}

impl LogTracer {
    pub fn new(linger: Duration) -> Self {
        Self { linger }
    }
}

#[async_trait]
impl PropagationTracer for LogTracer {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn arm(
        &self,
        tanks: &[Tank],
        marked: &MarkedTransaction,
    ) -> Result<TraceRound, TraceError> {
        // Every stream is open before this returns.
        let streams = try_join_all(tanks.iter().map(|tank| async move {
            let lines = tank
                .handle
                .log_lines()
                .await
                .map_err(|source| TraceError::Node {
                    tank: tank.id,
                    source,
                })?;
            Ok::<_, TraceError>((tank.id, lines))
        }))
        .await?;

        let patterns = LogPatterns::for_transaction(marked);
        let mut round = TraceRound::new();
        for (tank, lines) in streams {
            let scanner = LogScanner::new(tank, patterns.clone());
            round.spawn(follow(tank, lines, scanner, round.gate(), self.linger));
        }
        Ok(round)
    }
}

async fn follow(
    tank: TankId,
    mut lines: LogLines,
    mut scanner: LogScanner,
    gate: watch::Receiver<bool>,
    linger: Duration,
) -> Result<PropagationRecord, TraceError> {
    let release = released(gate);
    tokio::pin!(release);

    let finished = tokio::select! {
        finished = scan(tank, &mut lines, &mut scanner) => Some(finished?),
        _ = &mut release => None,
    };

    if finished.is_none() {
        // Released before both lines showed up: drain what is buffered.
        if let Ok(result) = tokio::time::timeout(linger, scan(tank, &mut lines, &mut scanner)).await {
            result?;
        }
    }

    if !scanner.is_done() {
        debug!(tank = %tank, "Log trace incomplete");
    }
    Ok(scanner.into_record())
}

/// Feed lines until both are found or the stream ends.
async fn scan(
    tank: TankId,
    lines: &mut LogLines,
    scanner: &mut LogScanner,
) -> Result<(), TraceError> {
    while !scanner.is_done() {
        match lines.next().await {
            Some(Ok(line)) => {
                scanner.feed(&line);
            }
            Some(Err(NodeError::LogStreamClosed)) | None => break,
            Some(Err(source)) => return Err(TraceError::Node { tank, source }),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use futures::stream;
    use shared_types::test_utils::ScriptedNode;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    fn marked() -> MarkedTransaction {
        MarkedTransaction {
            txid: "aa11".into(),
            wtxid: "bb22".into(),
            origin: TankId(0),
        }
    }

    fn tank(id: usize, node: ScriptedNode) -> Tank {
        Tank {
            id: TankId(id),
            name: TankId(id).to_string(),
            init_peers: 0,
            handle: Arc::new(node),
        }
    }

    fn log(announce_sec: u32, accept_sec: u32) -> Vec<String> {
        vec![
            "2024-05-01T10:00:00.000000Z [net] got inv: wtx 0000 peer=0".to_string(),
            format!("2024-05-01T10:00:{announce_sec:02}.000000Z [net] got inv: wtx bb22 peer=0"),
            format!(
                "2024-05-01T10:00:{accept_sec:02}.000000Z [mempool] AcceptToMemoryPool: peer=0: accepted aa11 (wtxid=bb22)"
            ),
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn test_log_round_collects_both_tanks() {
        let tanks = vec![
            tank(1, ScriptedNode::new().with_log(log(1, 2))),
            tank(2, ScriptedNode::new().with_log(log(3, 7))),
        ];

        let round = LogTracer::new(Duration::from_secs(1))
            .arm(&tanks, &marked())
            .await
            .unwrap();
        let outcome = round.collect(&CancellationToken::new()).await.unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[1].accepted.unwrap().second(), 7);
        assert_eq!(outcome.estimate.seconds, Some(6.0));
        assert!(!outcome.estimate.precision_warning());
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_tank_is_released_with_warning() {
        // Never ends and never mentions the transaction.
        let silent = stream::pending::<Result<String, NodeError>>();
        let mut round = TraceRound::new();
        let scanner = LogScanner::new(TankId(4), LogPatterns::for_transaction(&marked()));
        round.spawn(follow(
            TankId(4),
            silent.boxed(),
            scanner,
            round.gate(),
            Duration::from_millis(250),
        ));

        let outcome = round.collect(&CancellationToken::new()).await.unwrap();
        assert_eq!(outcome.records[0].first_announce, None);
        assert_eq!(outcome.estimate.seconds, None);
        assert!(outcome.estimate.precision_warning());
    }

    #[tokio::test]
    async fn test_tank_without_log_source_fails_to_arm() {
        let tanks = vec![tank(1, ScriptedNode::new())];
        let result = LogTracer::new(Duration::from_secs(1))
            .arm(&tanks, &marked())
            .await;
        assert!(matches!(
            result,
            Err(TraceError::Node {
                source: NodeError::Unsupported(_),
                ..
            })
        ));
    }
}
