//! JSON-RPC transport for Bitcoin-Core-style tanks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared_types::NodeError;
use tracing::trace;

/// Connection settings of one tank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcConfig {
    /// Base URL, e.g. `http://10.0.0.1:18443`.
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
}

impl RpcConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user: None,
            password: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: serde_json::Value,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

pub struct RpcClient {
    http_client: reqwest::Client,
    config: RpcConfig,
    request_id: AtomicU64,
}

impl RpcClient {
    pub fn new(config: RpcConfig) -> Result<Self, NodeError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NodeError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            config,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Call `method`, scoped to `wallet` when given.
    pub async fn call<R: DeserializeOwned>(
        &self,
        wallet: Option<&str>,
        method: &str,
        params: serde_json::Value,
    ) -> Result<R, NodeError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest {
            jsonrpc: "1.0",
            id,
            method,
            params,
        };

        let url = endpoint(&self.config.url, wallet);
        trace!(%url, method, id, "RPC request");

        let mut builder = self.http_client.post(&url).json(&request);
        if let Some(user) = &self.config.user {
            builder = builder.basic_auth(user, self.config.password.as_ref());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| NodeError::Transport(format!("{method}: {e}")))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| NodeError::Transport(format!("{method}: {e}")))?;

        decode_response(method, status, &body)
    }
}

/// Node-level or wallet-level endpoint.
fn endpoint(base: &str, wallet: Option<&str>) -> String {
    let base = base.trim_end_matches('/');
    match wallet {
        Some(name) => format!("{base}/wallet/{name}"),
        None => base.to_string(),
    }
}

/// RPC errors arrive with a non-2xx status and a JSON body, so the body is
/// read first and the status only matters when it is not JSON.
fn decode_response<R: DeserializeOwned>(
    method: &str,
    status: u16,
    body: &str,
) -> Result<R, NodeError> {
    let response: JsonRpcResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(_) if !(200..300).contains(&status) => {
            return Err(NodeError::Transport(format!("{method}: HTTP {status}")));
        }
        Err(e) => return Err(NodeError::Decode(format!("{method}: {e}"))),
    };

    if let Some(error) = response.error {
        return Err(NodeError::Rpc {
            code: error.code,
            message: error.message,
        });
    }

    serde_json::from_value(response.result)
        .map_err(|e| NodeError::Decode(format!("{method}: {e}")))
}
