//! # Simulated Tank Network
//!
//! An in-process stand-in for a cluster of ledger nodes, good enough to
//! drive a full experiment without containers.
//!
//! ## Model
//!
//! - One shared chain. Blocks mined on one tank reach every other tank
//!   after `relay_delay`; coinbase outputs mature after `coinbase_maturity`
//!   confirmations.
//! - Transactions spread over the configured links with an
//!   `inv → getdata → tx` exchange per hop, each leg taking `relay_delay`.
//!   Every message is counted on both ends.
//! - Each tank writes `got inv` and `accepted` lines to a live log and keeps
//!   first-announcement and acceptance times per pending transaction.
//! - With `false_positive_rate > 0` a receiving tank may drop a transaction
//!   for good, as an overeager duplicate filter would.

mod config;
mod errors;
mod network;
mod node;
mod relay;
mod state;

pub use config::SimConfig;
pub use errors::SimError;
pub use network::SimNetwork;
pub use node::SimNode;
