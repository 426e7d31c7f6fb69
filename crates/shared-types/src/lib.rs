//! # Shared Types Crate
//!
//! The node capability port, the immutable network descriptor and the
//! entities exchanged between the experiment crates and the node adapters.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type crossing a crate boundary lives here.
//! - **Port, not client**: experiment crates only see [`NodeHandle`]; the RPC
//!   and simulated adapters live in their own crates.
//! - **No ambient state**: a run's tanks are enumerated once into a [`Network`]
//!   and passed explicitly.

pub mod entities;
pub mod errors;
pub mod network;
pub mod node;

/// Scripted `NodeHandle` for downstream tests.
///
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use entities::*;
pub use errors::*;
pub use network::{Network, Tank};
pub use node::{LogLines, NodeHandle, STATS_AGGREGATION_DIMS};
