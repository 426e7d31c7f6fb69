//! # Traffic Accounting (tb-03)
//!
//! Captures the per-message-type counters of every tank, sums them into a
//! network-wide [`TrafficSnapshot`], and subtracts two snapshots into a
//! [`TrafficDiff`].
//!
//! Snapshots are taken while the network is live. Sent and received totals
//! may disagree slightly because messages are in flight; this is accepted
//! and never retried.

pub mod diff;
pub mod errors;
pub mod snapshot;
pub mod totals;

pub use diff::{CounterDelta, TrafficDiff, INV_ENTRY_BYTES, INV_MESSAGE_OVERHEAD};
pub use errors::TrafficError;
pub use snapshot::{capture, Direction, TrafficSnapshot};
pub use totals::{AverageCounter, TrafficTotals};
