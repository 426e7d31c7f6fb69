//! Test utilities for crates that consume [`NodeHandle`].
//!
//! Enable with the `test-utils` feature flag.
//!
//! # Example
//!
//! ```rust,ignore
//! use shared_types::test_utils::ScriptedNode;
//!
//! // Height reads 3, then 5, then stays at 7.
//! let node = ScriptedNode::new().with_heights([3, 5, 7]);
//! assert_eq!(node.height_polls(), 0);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;

use crate::entities::{
    DecodedTransaction, MessageStats, PeerConnection, PendingEntry, RawTransaction,
    SignedTransaction, UnspentOutput,
};
use crate::errors::NodeError;
use crate::node::{LogLines, NodeHandle};

/// Successive answers to one query. The last answer repeats forever.
#[derive(Debug)]
struct Script<T> {
    answers: Mutex<VecDeque<T>>,
}

impl<T: Clone> Script<T> {
    fn new(answers: impl IntoIterator<Item = T>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
        }
    }

    fn next(&self, what: &'static str) -> Result<T, NodeError> {
        let mut answers = self.answers.lock();
        let answer = if answers.len() > 1 {
            answers.pop_front()
        } else {
            answers.front().cloned()
        };
        answer.ok_or(NodeError::Unsupported(what))
    }
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
        }
    }
}

/// A node whose observable state follows a fixed script.
///
/// Queries without a script fail with [`NodeError::Unsupported`]; wallet
/// operations always do.
#[derive(Debug, Default)]
pub struct ScriptedNode {
    heights: Script<u64>,
    pending_sizes: Script<usize>,
    peers: Script<Vec<PeerConnection>>,
    stats: Script<MessageStats>,
    entries: HashMap<String, PendingEntry>,
    log: Option<Vec<String>>,
    failure: Option<NodeError>,
    height_polls: AtomicUsize,
    pending_polls: AtomicUsize,
    peer_polls: AtomicUsize,
}

impl ScriptedNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_heights(mut self, heights: impl IntoIterator<Item = u64>) -> Self {
        self.heights = Script::new(heights);
        self
    }

    /// Pending-set sizes; the node reports that many synthetic txids.
    pub fn with_pending_sizes(mut self, sizes: impl IntoIterator<Item = usize>) -> Self {
        self.pending_sizes = Script::new(sizes);
        self
    }

    pub fn with_peers(mut self, peers: impl IntoIterator<Item = Vec<PeerConnection>>) -> Self {
        self.peers = Script::new(peers);
        self
    }

    pub fn with_stats(mut self, stats: impl IntoIterator<Item = MessageStats>) -> Self {
        self.stats = Script::new(stats);
        self
    }

    pub fn with_entry(mut self, txid: &str, entry: PendingEntry) -> Self {
        self.entries.insert(txid.to_string(), entry);
        self
    }

    /// Lines replayed by `log_lines`, followed by end of stream.
    pub fn with_log(mut self, lines: impl IntoIterator<Item = String>) -> Self {
        self.log = Some(lines.into_iter().collect());
        self
    }

    /// Every query fails with `error`.
    pub fn failing(mut self, error: NodeError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn height_polls(&self) -> usize {
        self.height_polls.load(Ordering::SeqCst)
    }

    pub fn pending_polls(&self) -> usize {
        self.pending_polls.load(Ordering::SeqCst)
    }

    pub fn peer_polls(&self) -> usize {
        self.peer_polls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), NodeError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

/// A peer entry as added through the network document.
pub fn manual_peer() -> PeerConnection {
    PeerConnection {
        connection_type: "manual".to_string(),
        handshake_complete: true,
        addnode: true,
    }
}

#[async_trait]
impl NodeHandle for ScriptedNode {
    async fn chain_height(&self) -> Result<u64, NodeError> {
        self.height_polls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.heights.next("chain height")
    }

    async fn ensure_wallet(&self, _name: &str) -> Result<(), NodeError> {
        Err(NodeError::Unsupported("wallet"))
    }

    async fn list_unspent(&self, _min_confirmations: u32) -> Result<Vec<UnspentOutput>, NodeError> {
        Err(NodeError::Unsupported("wallet"))
    }

    async fn generate_blocks(&self, _count: u64, _address: &str) -> Result<Vec<String>, NodeError> {
        Err(NodeError::Unsupported("mining"))
    }

    async fn new_address(&self) -> Result<String, NodeError> {
        Err(NodeError::Unsupported("wallet"))
    }

    async fn sign_transaction(
        &self,
        _raw: &RawTransaction,
    ) -> Result<SignedTransaction, NodeError> {
        Err(NodeError::Unsupported("wallet"))
    }

    async fn decode_transaction(
        &self,
        _signed: &SignedTransaction,
    ) -> Result<DecodedTransaction, NodeError> {
        Err(NodeError::Unsupported("decode"))
    }

    async fn submit_transaction(&self, _signed: &SignedTransaction) -> Result<String, NodeError> {
        Err(NodeError::Unsupported("submit"))
    }

    async fn pending_transactions(&self) -> Result<Vec<String>, NodeError> {
        self.pending_polls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let size = self.pending_sizes.next("pending set")?;
        Ok((0..size).map(|i| format!("{i:064x}")).collect())
    }

    async fn peers(&self) -> Result<Vec<PeerConnection>, NodeError> {
        self.peer_polls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.peers.next("peers")
    }

    async fn message_stats(&self, _dims: &[&str]) -> Result<MessageStats, NodeError> {
        self.check()?;
        self.stats.next("message stats")
    }

    async fn pending_entry(&self, txid: &str) -> Result<PendingEntry, NodeError> {
        self.check()?;
        self.entries.get(txid).cloned().ok_or_else(|| NodeError::Rpc {
            code: -5,
            message: "Transaction not in mempool".to_string(),
        })
    }

    async fn log_lines(&self) -> Result<LogLines, NodeError> {
        self.check()?;
        match &self.log {
            Some(lines) => Ok(stream::iter(lines.clone().into_iter().map(Ok::<_, NodeError>)).boxed()),
            None => Err(NodeError::Unsupported("log stream")),
        }
    }
}
