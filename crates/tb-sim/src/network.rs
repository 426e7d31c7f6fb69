//! The simulated network and its [`Network`] descriptor.

use std::sync::Arc;

use parking_lot::Mutex;
use shared_types::{Network, NetworkError, Tank, TankId};
use tokio::time::Instant;
use tracing::info;

use crate::config::SimConfig;
use crate::errors::SimError;
use crate::node::SimNode;
use crate::state::{Shared, SimState};

pub struct SimNetwork {
    shared: Arc<Shared>,
}

impl SimNetwork {
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        info!(
            tanks = config.tanks(),
            relay_delay_ms = config.relay_delay.as_millis() as u64,
            false_positive_rate = config.false_positive_rate,
            "Simulated network started"
        );
        let state = SimState::new(&config);
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(state),
                started: Instant::now(),
            }),
        })
    }

    pub fn len(&self) -> usize {
        self.shared.config.tanks()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn node(&self, id: usize) -> Option<SimNode> {
        (id < self.len()).then(|| SimNode::new(Arc::clone(&self.shared), id))
    }

    /// Descriptor over every tank, `miner` funding the run.
    pub fn network(&self, miner: usize) -> Result<Network, NetworkError> {
        let tanks = self
            .shared
            .config
            .links
            .iter()
            .enumerate()
            .map(|(id, outbound)| Tank {
                id: TankId(id),
                name: TankId(id).to_string(),
                init_peers: outbound.len(),
                handle: Arc::new(SimNode::new(Arc::clone(&self.shared), id)),
            })
            .collect();
        Network::new(tanks, TankId(miner))
    }

    /// Pending-set size of one tank.
    pub fn mempool_size(&self, id: usize) -> usize {
        self.shared.state.lock().nodes[id].mempool.len()
    }

    pub fn height(&self, id: usize) -> u64 {
        self.shared.state.lock().nodes[id].height
    }
}
