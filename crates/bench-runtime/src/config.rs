//! # Network Descriptor
//!
//! The TOML file naming every tank of a deployed network and how to reach it.
//!
//! ```toml
//! miner = 0
//!
//! [[tanks]]
//! name = "tank-0000"
//! rpc_url = "http://10.0.0.1:18443"
//! rpc_user = "user"
//! rpc_password = "secret"
//! init_peers = 8
//! log_path = "/var/log/tank-0000/debug.log"   # optional
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use shared_types::{Network, NetworkError, NodeError, Tank, TankId};
use tb_rpc::{RpcConfig, RpcNode};
use thiserror::Error;

/// Descriptor loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid network descriptor: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Tank {name}: {message}")]
    Tank { name: String, message: String },

    #[error("Failed to create RPC client for {name}: {source}")]
    Client {
        name: String,
        #[source]
        source: NodeError,
    },

    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// Root of the descriptor file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkDescriptor {
    /// Index of the funding tank.
    #[serde(default)]
    pub miner: usize,
    pub tanks: Vec<TankEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TankEntry {
    pub name: String,
    pub rpc_url: String,
    pub rpc_user: Option<String>,
    pub rpc_password: Option<String>,
    /// Manual peers the tank is expected to reach.
    pub init_peers: usize,
    /// Debug log, required by the log tracer.
    pub log_path: Option<PathBuf>,
}

impl NetworkDescriptor {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let descriptor: NetworkDescriptor = toml::from_str(text)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for tank in &self.tanks {
            if tank.rpc_url.trim().is_empty() {
                return Err(ConfigError::Tank {
                    name: tank.name.clone(),
                    message: "rpc_url must not be empty".into(),
                });
            }
            if tank.rpc_user.is_some() != tank.rpc_password.is_some() {
                return Err(ConfigError::Tank {
                    name: tank.name.clone(),
                    message: "rpc_user and rpc_password go together".into(),
                });
            }
        }
        Ok(())
    }

    /// Whether every tank names a debug log.
    pub fn has_logs(&self) -> bool {
        self.tanks.iter().all(|tank| tank.log_path.is_some())
    }

    /// One [`RpcNode`] per tank, in file order.
    pub fn into_network(self, rpc_timeout: Duration) -> Result<Network, ConfigError> {
        let mut tanks = Vec::with_capacity(self.tanks.len());
        for (index, entry) in self.tanks.into_iter().enumerate() {
            let mut rpc = RpcConfig::new(entry.rpc_url);
            rpc.timeout = rpc_timeout;
            if let (Some(user), Some(password)) = (entry.rpc_user, entry.rpc_password) {
                rpc = rpc.with_auth(user, password);
            }

            let mut node = RpcNode::new(rpc).map_err(|source| ConfigError::Client {
                name: entry.name.clone(),
                source,
            })?;
            if let Some(path) = entry.log_path {
                node = node.with_log_path(path);
            }

            tanks.push(Tank {
                id: TankId(index),
                name: entry.name,
                init_peers: entry.init_peers,
                handle: Arc::new(node),
            });
        }
        Ok(Network::new(tanks, TankId(self.miner))?)
    }
}
