//! Simulation parameters.

use std::time::Duration;

use shared_types::{Amount, UNITS_PER_COIN};

use crate::errors::SimError;

#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Outbound links per tank; `links.len()` is the number of tanks.
    pub links: Vec<Vec<usize>>,
    /// Latency of one message leg.
    pub relay_delay: Duration,
    /// Time after start until peer handshakes complete.
    pub handshake_delay: Duration,
    /// Probability that a receiving tank drops a relayed transaction.
    pub false_positive_rate: f64,
    pub coinbase_maturity: u64,
    pub block_reward: Amount,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            links: Vec::new(),
            relay_delay: Duration::from_millis(20),
            handshake_delay: Duration::from_millis(50),
            false_positive_rate: 0.0,
            coinbase_maturity: 100,
            block_reward: Amount::from_units(50 * UNITS_PER_COIN),
            seed: 0,
        }
    }
}

impl SimConfig {
    /// `tanks` tanks, each dialing the next one around a ring.
    pub fn ring(tanks: usize) -> Self {
        let links = (0..tanks)
            .map(|i| match tanks {
                0 | 1 => Vec::new(),
                // A single link; the reverse would duplicate it.
                2 if i == 1 => Vec::new(),
                _ => vec![(i + 1) % tanks],
            })
            .collect();
        Self {
            links,
            ..Default::default()
        }
    }

    pub fn with_links(links: Vec<Vec<usize>>) -> Self {
        Self {
            links,
            ..Default::default()
        }
    }

    pub fn tanks(&self) -> usize {
        self.links.len()
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let tanks = self.tanks();
        if tanks == 0 {
            return Err(SimError::Empty);
        }
        for (from, peers) in self.links.iter().enumerate() {
            for &to in peers {
                if to >= tanks {
                    return Err(SimError::LinkOutOfRange { from, to, tanks });
                }
                if to == from {
                    return Err(SimError::SelfLink(from));
                }
            }
        }
        if !(0.0..=1.0).contains(&self.false_positive_rate) {
            return Err(SimError::InvalidRate(self.false_positive_rate));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_links() {
        assert_eq!(SimConfig::ring(3).links, vec![vec![1], vec![2], vec![0]]);
        assert_eq!(SimConfig::ring(2).links, vec![vec![1], vec![]]);
        assert_eq!(SimConfig::ring(1).links, vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_validate() {
        assert!(SimConfig::ring(4).validate().is_ok());
        assert_eq!(SimConfig::ring(0).validate(), Err(SimError::Empty));
        assert_eq!(
            SimConfig::with_links(vec![vec![1]]).validate(),
            Err(SimError::LinkOutOfRange {
                from: 0,
                to: 1,
                tanks: 1
            })
        );
        assert_eq!(
            SimConfig::with_links(vec![vec![0]]).validate(),
            Err(SimError::SelfLink(0))
        );
        let mut config = SimConfig::ring(2);
        config.false_positive_rate = 1.5;
        assert!(matches!(config.validate(), Err(SimError::InvalidRate(_))));
    }
}
