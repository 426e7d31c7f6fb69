//! # JSON-RPC Tank Adapter
//!
//! [`RpcNode`] implements the node capability port against a
//! Bitcoin-Core-style JSON-RPC endpoint. Wallet calls go to
//! `/wallet/<name>` once [`shared_types::NodeHandle::ensure_wallet`] has
//! selected a wallet. The live log is served by tailing the tank's debug log
//! when its path is known.

mod client;
pub mod log_tail;
mod node;
mod responses;

pub use client::{RpcClient, RpcConfig};
pub use node::RpcNode;
