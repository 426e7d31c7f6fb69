//! # Network Document
//!
//! YAML description of the cluster consumed by the deployment layer. Auxiliary
//! services are always written disabled.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::TopologyGraph;
use crate::errors::TopologyError;

/// Where the document is written when no path is given.
pub const DEFAULT_OUTPUT_PATH: &str = "network.yaml";

/// Fork observer refresh interval, in seconds.
const FORK_OBSERVER_QUERY_INTERVAL: u64 = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDocument {
    pub caddy: FeatureToggle,
    pub fork_observer: ForkObserver,
    pub nodes: Vec<NodeEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureToggle {
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForkObserver {
    pub config_query_interval: u64,
    pub enabled: bool,
}

/// One tank and the peers it dials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEntry {
    pub addnode: Vec<String>,
    pub name: String,
}

impl NetworkDocument {
    pub fn from_graph(graph: &TopologyGraph) -> Self {
        Self {
            caddy: FeatureToggle { enabled: false },
            fork_observer: ForkObserver {
                config_query_interval: FORK_OBSERVER_QUERY_INTERVAL,
                enabled: false,
            },
            nodes: graph
                .named_entries()
                .map(|(name, addnode)| NodeEntry { addnode, name })
                .collect(),
        }
    }

    pub fn to_yaml(&self) -> Result<String, TopologyError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Serialize and write to `path`, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> Result<(), TopologyError> {
        let yaml = self.to_yaml()?;
        fs::write(path, yaml)?;
        info!(
            path = %path.display(),
            nodes = self.nodes.len(),
            "Network document written"
        );
        Ok(())
    }
}
