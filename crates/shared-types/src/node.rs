//! # Node Capability Port
//!
//! Outbound port implemented by every node adapter (JSON-RPC, simulated).
//! All calls are remote and fallible.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::entities::{
    DecodedTransaction, MessageStats, PeerConnection, PendingEntry, RawTransaction,
    SignedTransaction, UnspentOutput,
};
use crate::errors::NodeError;

/// Live stream of a node's log lines.
pub type LogLines = BoxStream<'static, Result<String, NodeError>>;

/// Dimensions collapsed when reading traffic counters.
pub const STATS_AGGREGATION_DIMS: [&str; 2] = ["network", "connection_type"];

/// One simulated ledger node.
#[async_trait]
pub trait NodeHandle: Send + Sync {
    /// Current chain height.
    async fn chain_height(&self) -> Result<u64, NodeError>;

    /// Load or create the named wallet and use it for wallet calls.
    async fn ensure_wallet(&self, name: &str) -> Result<(), NodeError>;

    /// Wallet outputs with at least `min_confirmations` confirmations.
    async fn list_unspent(&self, min_confirmations: u32) -> Result<Vec<UnspentOutput>, NodeError>;

    /// Mine `count` blocks paying to `address`; returns the block hashes.
    async fn generate_blocks(&self, count: u64, address: &str) -> Result<Vec<String>, NodeError>;

    /// Fresh wallet address.
    async fn new_address(&self) -> Result<String, NodeError>;

    /// Construct and sign a transaction with the wallet's keys.
    async fn sign_transaction(&self, raw: &RawTransaction)
        -> Result<SignedTransaction, NodeError>;

    /// Derive the identifiers of a signed transaction.
    async fn decode_transaction(
        &self,
        signed: &SignedTransaction,
    ) -> Result<DecodedTransaction, NodeError>;

    /// Submit a signed transaction to this node; returns its txid.
    async fn submit_transaction(&self, signed: &SignedTransaction) -> Result<String, NodeError>;

    /// Ids of every transaction in the pending set.
    async fn pending_transactions(&self) -> Result<Vec<String>, NodeError>;

    /// Current peer connections.
    async fn peers(&self) -> Result<Vec<PeerConnection>, NodeError>;

    /// Cumulative per-message traffic counters, collapsed over `dims`.
    async fn message_stats(&self, dims: &[&str]) -> Result<MessageStats, NodeError>;

    /// The pending-set record of `txid`.
    async fn pending_entry(&self, txid: &str) -> Result<PendingEntry, NodeError>;

    /// Follow the node's log from now on.
    async fn log_lines(&self) -> Result<LogLines, NodeError> {
        Err(NodeError::Unsupported("log stream"))
    }
}
