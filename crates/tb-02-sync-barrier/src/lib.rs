//! # Sync Barriers (tb-02)
//!
//! Reusable "every tank is ready" primitives built only on polling.
//!
//! | Barrier | Condition per tank | Poll interval |
//! |---------|--------------------|---------------|
//! | Connectivity | manual peers with completed handshake `≥ init_peers` | 1 s |
//! | Height | chain height `≥ target` | 1 s |
//! | Convergence | pending set `≥ target`, or stuck at `target − 1` for the stall budget | 500 ms |
//!
//! ## Concurrency
//!
//! Each barrier spawns exactly one poller per tank into a `JoinSet` and
//! completes only once every poller has completed. Pollers observe a child
//! of the caller's `CancellationToken`; the round is cancelled as a whole on
//! the first node error or when the optional deadline expires.

pub mod config;
pub mod domain;
pub mod errors;
mod round;
pub mod service;

pub use config::{BarrierConfig, ConvergenceConfig};
pub use domain::{BarrierReport, StallOutcome, StallTracker, TankOutcome};
pub use errors::BarrierError;
pub use service::{wait_for_connectivity, wait_for_height, wait_for_mempool};
