//! `NodeHandle` over one simulated tank.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use shared_types::{
    DecodedTransaction, LogLines, MessageStats, NodeError, NodeHandle, PeerConnection,
    PendingEntry, RawTransaction, SignedTransaction, UnspentOutput,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::relay::{announce_block, announce_transaction};
use crate::state::Shared;

/// One tank of a [`crate::SimNetwork`].
#[derive(Clone)]
pub struct SimNode {
    shared: Arc<Shared>,
    id: usize,
}

impl SimNode {
    pub(crate) fn new(shared: Arc<Shared>, id: usize) -> Self {
        Self { shared, id }
    }

    pub fn id(&self) -> usize {
        self.id
    }
}

impl std::fmt::Debug for SimNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimNode").field("id", &self.id).finish()
    }
}

#[async_trait]
impl NodeHandle for SimNode {
    async fn chain_height(&self) -> Result<u64, NodeError> {
        Ok(self.shared.state.lock().nodes[self.id].height)
    }

    async fn ensure_wallet(&self, name: &str) -> Result<(), NodeError> {
        self.shared.state.lock().nodes[self.id].wallet = Some(name.to_string());
        Ok(())
    }

    async fn list_unspent(&self, min_confirmations: u32) -> Result<Vec<UnspentOutput>, NodeError> {
        let state = self.shared.state.lock();
        state.nodes[self.id].require_wallet()?;
        Ok(state.wallet_coins(
            self.id,
            min_confirmations,
            self.shared.config.coinbase_maturity,
        ))
    }

    async fn generate_blocks(&self, count: u64, address: &str) -> Result<Vec<String>, NodeError> {
        let mut state = self.shared.state.lock();
        state.nodes[self.id].require_wallet()?;

        let (hashes, confirmed) =
            state.mine(self.id, count, address, self.shared.config.block_reward);
        if count > 0 {
            let tip = state.tip;
            debug!(tank = self.id, tip, confirmed = confirmed.len(), "Simulated blocks mined");
            announce_block(&self.shared, &mut state, self.id, tip);
        }
        Ok(hashes)
    }

    async fn new_address(&self) -> Result<String, NodeError> {
        let mut state = self.shared.state.lock();
        state.nodes[self.id].require_wallet()?;
        Ok(state.new_address(self.id))
    }

    async fn sign_transaction(
        &self,
        raw: &RawTransaction,
    ) -> Result<SignedTransaction, NodeError> {
        let mut state = self.shared.state.lock();
        state.nodes[self.id].require_wallet()?;
        let hex = state.sign(self.id, raw)?;
        Ok(SignedTransaction { hex })
    }

    async fn decode_transaction(
        &self,
        signed: &SignedTransaction,
    ) -> Result<DecodedTransaction, NodeError> {
        let state = self.shared.state.lock();
        let tx = state.decode(&signed.hex)?;
        Ok(DecodedTransaction {
            txid: tx.txid.clone(),
            wtxid: tx.wtxid.clone(),
        })
    }

    async fn submit_transaction(&self, signed: &SignedTransaction) -> Result<String, NodeError> {
        let mut state = self.shared.state.lock();
        let txid = state.decode(&signed.hex)?.txid.clone();

        if state.confirmed.contains_key(&txid) {
            return Err(NodeError::Rpc {
                code: -27,
                message: "Transaction already in block chain".to_string(),
            });
        }
        if state.nodes[self.id].mempool.contains_key(&txid) {
            return Ok(txid);
        }

        // Inputs are already spent if another tank accepted it first.
        let relayed = state.nodes.iter().any(|node| node.mempool.contains_key(&txid));
        if !relayed {
            state.apply_spend(&txid)?;
        }
        state.accept(self.id, &txid, None);
        announce_transaction(&self.shared, &mut state, self.id, &txid, None);
        Ok(txid)
    }

    async fn pending_transactions(&self) -> Result<Vec<String>, NodeError> {
        let state = self.shared.state.lock();
        Ok(state.nodes[self.id].mempool.keys().cloned().collect())
    }

    async fn peers(&self) -> Result<Vec<PeerConnection>, NodeError> {
        let handshake_complete =
            self.shared.started.elapsed() >= self.shared.config.handshake_delay;
        let state = self.shared.state.lock();
        let tank = &state.nodes[self.id];

        let outbound = tank.outbound.iter().map(|_| PeerConnection {
            connection_type: "manual".to_string(),
            handshake_complete,
            addnode: true,
        });
        let inbound = tank.inbound.iter().map(|_| PeerConnection {
            connection_type: "inbound".to_string(),
            handshake_complete,
            addnode: false,
        });
        Ok(outbound.chain(inbound).collect())
    }

    async fn message_stats(&self, _dims: &[&str]) -> Result<MessageStats, NodeError> {
        Ok(self.shared.state.lock().nodes[self.id].stats.clone())
    }

    async fn pending_entry(&self, txid: &str) -> Result<PendingEntry, NodeError> {
        let state = self.shared.state.lock();
        state.nodes[self.id]
            .mempool
            .get(txid)
            .cloned()
            .ok_or_else(|| NodeError::Rpc {
                code: -5,
                message: "Transaction not in mempool".to_string(),
            })
    }

    async fn log_lines(&self) -> Result<LogLines, NodeError> {
        let receiver = self.shared.state.lock().nodes[self.id].log.subscribe();
        let lines = stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(line) => return Some((Ok(line), receiver)),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => return None,
                }
            }
        });
        Ok(lines.boxed())
    }
}
