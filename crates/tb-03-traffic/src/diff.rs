//! Element-wise difference of two snapshots.
//!
//! Differences form a group under addition: `diff(a, c) == diff(a, b) +
//! diff(b, c)`. Zero deltas are never stored, so equal diffs compare equal
//! regardless of which message types the snapshots happened to list.

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign};

use serde::Serialize;

use crate::snapshot::{Direction, TrafficSnapshot};

/// Message header plus the one-byte entry count of an `inv` message.
pub const INV_MESSAGE_OVERHEAD: i64 = 21 + 1;

/// Size of one inventory entry (type + hash).
pub const INV_ENTRY_BYTES: i64 = 36;

/// Change of one counter. Negative only if a node restarted mid-run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CounterDelta {
    pub count: i64,
    pub bytes: i64,
}

impl CounterDelta {
    pub fn is_zero(&self) -> bool {
        self.count == 0 && self.bytes == 0
    }
}

impl Add for CounterDelta {
    type Output = CounterDelta;

    fn add(self, rhs: CounterDelta) -> CounterDelta {
        CounterDelta {
            count: self.count + rhs.count,
            bytes: self.bytes + rhs.bytes,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrafficDiff {
    deltas: BTreeMap<Direction, BTreeMap<String, CounterDelta>>,
}

impl TrafficDiff {
    /// `after − before` for every direction and message type. A type missing
    /// from one side counts as zero there.
    pub fn between(before: &TrafficSnapshot, after: &TrafficSnapshot) -> Self {
        let mut diff = TrafficDiff::default();
        for direction in Direction::ALL {
            let earlier = before.direction(direction);
            let later = after.direction(direction);
            for message in earlier.keys().chain(later.keys()) {
                let old = before.get(direction, message);
                let new = after.get(direction, message);
                let delta = CounterDelta {
                    count: new.count as i64 - old.count as i64,
                    bytes: new.bytes as i64 - old.bytes as i64,
                };
                diff.set(direction, message, delta);
            }
        }
        diff
    }

    fn set(&mut self, direction: Direction, message: &str, delta: CounterDelta) {
        let per_type = self.deltas.entry(direction).or_default();
        if delta.is_zero() {
            per_type.remove(message);
        } else {
            per_type.insert(message.to_string(), delta);
        }
        if per_type.is_empty() {
            self.deltas.remove(&direction);
        }
    }

    pub fn get(&self, direction: Direction, message: &str) -> CounterDelta {
        self.deltas
            .get(&direction)
            .and_then(|per_type| per_type.get(message))
            .copied()
            .unwrap_or_default()
    }

    /// Non-zero deltas of one direction, by message type.
    pub fn direction(&self, direction: Direction) -> impl Iterator<Item = (&str, CounterDelta)> {
        self.deltas
            .get(&direction)
            .into_iter()
            .flat_map(|per_type| per_type.iter().map(|(m, d)| (m.as_str(), *d)))
    }

    /// Keep a single direction.
    pub fn only(&self, direction: Direction) -> TrafficDiff {
        let mut deltas = BTreeMap::new();
        if let Some(per_type) = self.deltas.get(&direction) {
            deltas.insert(direction, per_type.clone());
        }
        TrafficDiff { deltas }
    }

    pub fn is_zero(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Inventory entries announced, derived from the sent `inv` counters.
    /// Truncates toward zero.
    pub fn inv_entry_estimate(&self) -> i64 {
        let inv = self.get(Direction::Sent, "inv");
        (inv.bytes - inv.count * INV_MESSAGE_OVERHEAD) / INV_ENTRY_BYTES
    }
}

impl AddAssign<&TrafficDiff> for TrafficDiff {
    fn add_assign(&mut self, rhs: &TrafficDiff) {
        for (direction, per_type) in &rhs.deltas {
            for (message, delta) in per_type {
                let sum = self.get(*direction, message) + *delta;
                self.set(*direction, message, sum);
            }
        }
    }
}

impl Add for TrafficDiff {
    type Output = TrafficDiff;

    fn add(mut self, rhs: TrafficDiff) -> TrafficDiff {
        self += &rhs;
        self
    }
}
