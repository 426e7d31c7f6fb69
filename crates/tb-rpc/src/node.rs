//! `NodeHandle` over JSON-RPC.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::json;
use shared_types::{
    DecodedTransaction, LogLines, MessageStats, NodeError, NodeHandle, PeerConnection,
    PendingEntry, RawTransaction, SignedTransaction, UnspentOutput,
};
use tracing::{debug, info};

use crate::client::{RpcClient, RpcConfig};
use crate::log_tail;
use crate::responses::{DecodedRaw, MempoolEntry, PeerInfo, SignedRaw};

/// `RPC_WALLET_NOT_FOUND`.
const WALLET_NOT_FOUND: i64 = -18;

/// One tank reached over JSON-RPC, optionally with its debug log on disk.
pub struct RpcNode {
    client: RpcClient,
    /// Wallet selected by [`NodeHandle::ensure_wallet`].
    wallet: RwLock<Option<String>>,
    log_path: Option<PathBuf>,
    log_poll: Duration,
}

impl RpcNode {
    pub fn new(config: RpcConfig) -> Result<Self, NodeError> {
        Ok(Self {
            client: RpcClient::new(config)?,
            wallet: RwLock::new(None),
            log_path: None,
            log_poll: Duration::from_millis(100),
        })
    }

    /// Serve [`NodeHandle::log_lines`] by tailing `path`.
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    pub fn with_log_poll(mut self, poll: Duration) -> Self {
        self.log_poll = poll;
        self
    }

    fn wallet(&self) -> Option<String> {
        self.wallet.read().clone()
    }

    async fn node_call<R: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<R, NodeError> {
        self.client.call(None, method, params).await
    }

    async fn wallet_call<R: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<R, NodeError> {
        let wallet = self.wallet();
        self.client.call(wallet.as_deref(), method, params).await
    }
}

#[async_trait]
impl NodeHandle for RpcNode {
    async fn chain_height(&self) -> Result<u64, NodeError> {
        self.node_call("getblockcount", json!([])).await
    }

    async fn ensure_wallet(&self, name: &str) -> Result<(), NodeError> {
        let loaded: Vec<String> = self.node_call("listwallets", json!([])).await?;
        if !loaded.iter().any(|wallet| wallet == name) {
            match self
                .node_call::<serde_json::Value>("loadwallet", json!([name]))
                .await
            {
                Ok(_) => debug!(url = self.client.url(), wallet = name, "Wallet loaded"),
                Err(NodeError::Rpc { code, .. }) if code == WALLET_NOT_FOUND => {
                    self.node_call::<serde_json::Value>("createwallet", json!([name]))
                        .await?;
                    info!(url = self.client.url(), wallet = name, "Wallet created");
                }
                Err(e) => return Err(e),
            }
        }
        *self.wallet.write() = Some(name.to_string());
        Ok(())
    }

    async fn list_unspent(&self, min_confirmations: u32) -> Result<Vec<UnspentOutput>, NodeError> {
        self.wallet_call("listunspent", json!([min_confirmations]))
            .await
    }

    async fn generate_blocks(&self, count: u64, address: &str) -> Result<Vec<String>, NodeError> {
        self.node_call("generatetoaddress", json!([count, address]))
            .await
    }

    async fn new_address(&self) -> Result<String, NodeError> {
        self.wallet_call("getnewaddress", json!([])).await
    }

    async fn sign_transaction(
        &self,
        raw: &RawTransaction,
    ) -> Result<SignedTransaction, NodeError> {
        let inputs: Vec<_> = raw
            .inputs
            .iter()
            .map(|input| json!({ "txid": input.txid, "vout": input.vout }))
            .collect();
        // One object per output keeps their order.
        let outputs: Vec<_> = raw
            .outputs
            .iter()
            .map(|output| {
                let mut entry = serde_json::Map::new();
                entry.insert(output.address.clone(), json!(output.amount));
                serde_json::Value::Object(entry)
            })
            .collect();

        let unsigned: String = self
            .node_call("createrawtransaction", json!([inputs, outputs]))
            .await?;
        let signed: SignedRaw = self
            .wallet_call("signrawtransactionwithwallet", json!([unsigned]))
            .await?;
        if !signed.complete {
            return Err(NodeError::Decode(
                "signrawtransactionwithwallet: signing incomplete".to_string(),
            ));
        }
        Ok(SignedTransaction { hex: signed.hex })
    }

    async fn decode_transaction(
        &self,
        signed: &SignedTransaction,
    ) -> Result<DecodedTransaction, NodeError> {
        let decoded: DecodedRaw = self
            .node_call("decoderawtransaction", json!([signed.hex]))
            .await?;
        Ok(decoded.into())
    }

    async fn submit_transaction(&self, signed: &SignedTransaction) -> Result<String, NodeError> {
        self.node_call("sendrawtransaction", json!([signed.hex]))
            .await
    }

    async fn pending_transactions(&self) -> Result<Vec<String>, NodeError> {
        self.node_call("getrawmempool", json!([])).await
    }

    async fn peers(&self) -> Result<Vec<PeerConnection>, NodeError> {
        let peers: Vec<PeerInfo> = self.node_call("getpeerinfo", json!([])).await?;
        Ok(peers.into_iter().map(Into::into).collect())
    }

    async fn message_stats(&self, dims: &[&str]) -> Result<MessageStats, NodeError> {
        self.node_call("getnetmsgstats", json!([dims])).await
    }

    async fn pending_entry(&self, txid: &str) -> Result<PendingEntry, NodeError> {
        let entry: MempoolEntry = self.node_call("getmempoolentry", json!([txid])).await?;
        Ok(entry.into())
    }

    async fn log_lines(&self) -> Result<LogLines, NodeError> {
        match &self.log_path {
            Some(path) => log_tail::follow(path, self.log_poll).await,
            None => Err(NodeError::Unsupported("log stream")),
        }
    }
}
