//! Network-wide counter snapshot.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use shared_types::{MessageCounter, MessageStats, Tank, STATS_AGGREGATION_DIMS};
use tokio::task::JoinSet;
use tracing::debug;

use crate::errors::TrafficError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sent,
    Recv,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Sent, Direction::Recv];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Sent => write!(f, "sent"),
            Direction::Recv => write!(f, "recv"),
        }
    }
}

/// Counters summed over every tank at one point in time. Immutable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrafficSnapshot {
    sent: BTreeMap<String, MessageCounter>,
    recv: BTreeMap<String, MessageCounter>,
    tanks: usize,
}

impl TrafficSnapshot {
    /// Sum per-tank counters.
    pub fn from_stats(stats: impl IntoIterator<Item = MessageStats>) -> Self {
        let mut snapshot = Self::default();
        for tank in stats {
            merge(&mut snapshot.sent, tank.sent);
            merge(&mut snapshot.recv, tank.recv);
            snapshot.tanks += 1;
        }
        snapshot
    }

    pub fn direction(&self, direction: Direction) -> &BTreeMap<String, MessageCounter> {
        match direction {
            Direction::Sent => &self.sent,
            Direction::Recv => &self.recv,
        }
    }

    /// Counter of one message type; zero when the type was never seen.
    pub fn get(&self, direction: Direction, message: &str) -> MessageCounter {
        self.direction(direction)
            .get(message)
            .copied()
            .unwrap_or_default()
    }

    /// Number of tanks summed into this snapshot.
    pub fn tanks(&self) -> usize {
        self.tanks
    }
}

fn merge(into: &mut BTreeMap<String, MessageCounter>, from: BTreeMap<String, MessageCounter>) {
    for (message, counter) in from {
        let slot = into.entry(message).or_default();
        *slot = *slot + counter;
    }
}

/// Read every tank's counters concurrently and sum them.
pub async fn capture(tanks: &[Tank]) -> Result<TrafficSnapshot, TrafficError> {
    let mut set = JoinSet::new();
    for tank in tanks {
        let tank = tank.clone();
        set.spawn(async move {
            tank.handle
                .message_stats(&STATS_AGGREGATION_DIMS)
                .await
                .map_err(|source| TrafficError::Node {
                    tank: tank.id,
                    source,
                })
        });
    }

    let mut stats = Vec::with_capacity(tanks.len());
    while let Some(joined) = set.join_next().await {
        let tank_stats = joined.map_err(|e| TrafficError::Join(e.to_string()))??;
        stats.push(tank_stats);
    }

    let snapshot = TrafficSnapshot::from_stats(stats);
    debug!(
        tanks = snapshot.tanks(),
        sent_types = snapshot.sent.len(),
        recv_types = snapshot.recv.len(),
        "Traffic snapshot captured"
    );
    Ok(snapshot)
}
