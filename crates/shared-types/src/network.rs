//! # Network Descriptor
//!
//! The tanks of one run, enumerated once at startup and never mutated.

use std::fmt;
use std::sync::Arc;

use crate::entities::TankId;
use crate::errors::NetworkError;
use crate::node::NodeHandle;

/// One tank of the network and the handle used to reach it.
#[derive(Clone)]
pub struct Tank {
    pub id: TankId,
    pub name: String,
    /// Number of manual peers the tank is expected to reach.
    pub init_peers: usize,
    pub handle: Arc<dyn NodeHandle>,
}

impl fmt::Debug for Tank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tank")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("init_peers", &self.init_peers)
            .finish_non_exhaustive()
    }
}

/// Immutable view of the running network.
#[derive(Clone, Debug)]
pub struct Network {
    tanks: Arc<[Tank]>,
    miner: TankId,
}

impl Network {
    /// Build the descriptor. Tanks must carry ids `0..len` in order.
    pub fn new(tanks: Vec<Tank>, miner: TankId) -> Result<Self, NetworkError> {
        if tanks.is_empty() {
            return Err(NetworkError::Empty);
        }
        if miner.0 >= tanks.len() {
            return Err(NetworkError::MinerOutOfRange {
                miner: miner.0,
                tanks: tanks.len(),
            });
        }
        if let Some((position, tank)) = tanks
            .iter()
            .enumerate()
            .find(|(position, tank)| tank.id.0 != *position)
        {
            return Err(NetworkError::IdMismatch {
                position,
                id: tank.id.0,
            });
        }

        Ok(Self {
            tanks: tanks.into(),
            miner,
        })
    }

    pub fn tanks(&self) -> &[Tank] {
        &self.tanks
    }

    pub fn len(&self) -> usize {
        self.tanks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tanks.is_empty()
    }

    pub fn tank(&self, id: TankId) -> Option<&Tank> {
        self.tanks.get(id.0)
    }

    /// The designated miner/funder.
    pub fn miner(&self) -> &Tank {
        &self.tanks[self.miner.0]
    }

    /// Every tank except `excluded`.
    pub fn without(&self, excluded: TankId) -> Vec<Tank> {
        self.tanks
            .iter()
            .filter(|tank| tank.id != excluded)
            .cloned()
            .collect()
    }
}
