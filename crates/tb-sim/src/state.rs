//! Shared simulation state. Every method runs under the network lock and
//! never awaits.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_types::{
    Amount, MessageCounter, MessageStats, NodeError, OutPoint, PendingEntry, RawTransaction,
    Timestamp, TxOutput, UnspentOutput,
};
use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::config::SimConfig;

/// Log lines buffered per subscriber.
const LOG_CAPACITY: usize = 4096;

pub(crate) struct Shared {
    pub config: SimConfig,
    pub state: Mutex<SimState>,
    pub started: Instant,
}

#[derive(Clone, Debug)]
pub(crate) struct Coin {
    pub amount: Amount,
    pub address: String,
    /// Height of the confirming block; `None` while unconfirmed.
    pub height: Option<u64>,
    pub coinbase: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct SimTx {
    pub txid: String,
    pub wtxid: String,
    pub inputs: Vec<OutPoint>,
    pub outputs: Vec<TxOutput>,
    pub vsize: u64,
}

pub(crate) struct NodeState {
    pub height: u64,
    pub outbound: Vec<usize>,
    pub inbound: Vec<usize>,
    pub wallet: Option<String>,
    pub addresses: HashSet<String>,
    pub mempool: BTreeMap<String, PendingEntry>,
    /// First announcement of transactions not yet accepted.
    pub announced: HashMap<String, Timestamp>,
    /// Transactions with a `getdata` in flight.
    pub requested: HashSet<String>,
    /// Transactions dropped by the duplicate filter.
    pub rejected: HashSet<String>,
    pub stats: MessageStats,
    pub log: broadcast::Sender<String>,
}

impl NodeState {
    fn new(outbound: Vec<usize>) -> Self {
        let (log, _) = broadcast::channel(LOG_CAPACITY);
        Self {
            height: 0,
            outbound,
            inbound: Vec::new(),
            wallet: None,
            addresses: HashSet::new(),
            mempool: BTreeMap::new(),
            announced: HashMap::new(),
            requested: HashSet::new(),
            rejected: HashSet::new(),
            stats: MessageStats::default(),
            log,
        }
    }

    /// Every connected tank, dialed or dialing.
    pub fn neighbours(&self) -> impl Iterator<Item = usize> + '_ {
        self.outbound.iter().chain(self.inbound.iter()).copied()
    }

    pub fn write_log(&self, category: &str, message: &str) {
        let line = format!(
            "{} [{}] {}",
            Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ"),
            category,
            message
        );
        // Nobody listening is fine.
        let _ = self.log.send(line);
    }

    pub fn require_wallet(&self) -> Result<(), NodeError> {
        match self.wallet {
            Some(_) => Ok(()),
            None => Err(NodeError::Rpc {
                code: -18,
                message: "No wallet is loaded".to_string(),
            }),
        }
    }
}

pub(crate) struct SimState {
    pub rng: StdRng,
    pub tip: u64,
    pub nodes: Vec<NodeState>,
    pub coins: HashMap<OutPoint, Coin>,
    pub txs: HashMap<String, SimTx>,
    /// Signed payload → txid.
    pub payloads: HashMap<String, String>,
    /// Mined txid → confirming height.
    pub confirmed: HashMap<String, u64>,
    next_address: u64,
}

impl SimState {
    pub fn new(config: &SimConfig) -> Self {
        let mut nodes: Vec<NodeState> = config
            .links
            .iter()
            .map(|peers| NodeState::new(peers.clone()))
            .collect();
        for (from, peers) in config.links.iter().enumerate() {
            for &to in peers {
                nodes[to].inbound.push(from);
            }
        }

        Self {
            rng: StdRng::seed_from_u64(config.seed),
            tip: 0,
            nodes,
            coins: HashMap::new(),
            txs: HashMap::new(),
            payloads: HashMap::new(),
            confirmed: HashMap::new(),
            next_address: 0,
        }
    }

    pub fn random_id(&mut self) -> String {
        let high: u128 = self.rng.gen();
        let low: u128 = self.rng.gen();
        format!("{high:032x}{low:032x}")
    }

    pub fn new_address(&mut self, node: usize) -> String {
        self.next_address += 1;
        let address = format!("bcrt1q{:04}{:034x}", node, self.next_address);
        self.nodes[node].addresses.insert(address.clone());
        address
    }

    /// Account one message of `bytes` from `from` to `to`.
    pub fn count_message(&mut self, from: usize, to: usize, message: &str, bytes: u64) {
        let counter = MessageCounter { count: 1, bytes };
        bump(&mut self.nodes[from].stats.sent, message, counter);
        bump(&mut self.nodes[to].stats.recv, message, counter);
    }

    /// Spendable wallet coins of `node`, oldest first.
    pub fn wallet_coins(
        &self,
        node: usize,
        min_confirmations: u32,
        maturity: u64,
    ) -> Vec<UnspentOutput> {
        let state = &self.nodes[node];
        let mut unspent: Vec<(u64, UnspentOutput)> = self
            .coins
            .iter()
            .filter(|(_, coin)| state.addresses.contains(&coin.address))
            .filter_map(|(outpoint, coin)| {
                let confirmations = coin
                    .height
                    .map(|h| (state.height + 1).saturating_sub(h))
                    .unwrap_or(0);
                if coin.coinbase && confirmations <= maturity {
                    return None;
                }
                if confirmations < u64::from(min_confirmations) {
                    return None;
                }
                let output = UnspentOutput {
                    txid: outpoint.txid.clone(),
                    vout: outpoint.vout,
                    amount: coin.amount,
                    spendable: true,
                    confirmations,
                };
                Some((coin.height.unwrap_or(u64::MAX), output))
            })
            .collect();
        unspent.sort_by(|(ha, a), (hb, b)| {
            ha.cmp(hb)
                .then_with(|| a.txid.cmp(&b.txid))
                .then_with(|| a.vout.cmp(&b.vout))
        });
        unspent.into_iter().map(|(_, output)| output).collect()
    }

    /// Build a transaction from wallet inputs of `node`.
    pub fn sign(&mut self, node: usize, raw: &RawTransaction) -> Result<String, NodeError> {
        let mut input_total = Amount::ZERO;
        for input in &raw.inputs {
            let coin = self
                .coins
                .get(input)
                .filter(|coin| self.nodes[node].addresses.contains(&coin.address))
                .ok_or_else(|| NodeError::Rpc {
                    code: -8,
                    message: format!(
                        "Input not found or already spent: {}:{}",
                        input.txid, input.vout
                    ),
                })?;
            input_total = input_total + coin.amount;
        }
        if raw.total_output() > input_total {
            return Err(NodeError::Rpc {
                code: -26,
                message: "bad-txns-in-belowout".to_string(),
            });
        }

        let txid = self.random_id();
        let wtxid = self.random_id();
        let vsize = 11 + 68 * raw.inputs.len() as u64 + 31 * raw.outputs.len() as u64;
        // Payload of realistic length that starts with the txid.
        let payload = format!("{}{}", txid, "00".repeat(vsize.saturating_sub(32) as usize));

        self.payloads.insert(payload.clone(), txid.clone());
        self.txs.insert(
            txid.clone(),
            SimTx {
                txid,
                wtxid,
                inputs: raw.inputs.clone(),
                outputs: raw.outputs.clone(),
                vsize,
            },
        );
        Ok(payload)
    }

    pub fn decode(&self, payload: &str) -> Result<&SimTx, NodeError> {
        self.payloads
            .get(payload)
            .and_then(|txid| self.txs.get(txid))
            .ok_or_else(|| NodeError::Rpc {
                code: -22,
                message: "TX decode failed".to_string(),
            })
    }

    /// Spend the inputs of `txid` and create its outputs as unconfirmed coins.
    pub fn apply_spend(&mut self, txid: &str) -> Result<(), NodeError> {
        let tx = self.txs.get(txid).cloned().ok_or_else(|| NodeError::Rpc {
            code: -22,
            message: "TX decode failed".to_string(),
        })?;
        if tx.inputs.iter().any(|input| !self.coins.contains_key(input)) {
            return Err(NodeError::Rpc {
                code: -25,
                message: "bad-txns-inputs-missingorspent".to_string(),
            });
        }
        for input in &tx.inputs {
            self.coins.remove(input);
        }
        for (vout, output) in tx.outputs.iter().enumerate() {
            self.coins.insert(
                OutPoint {
                    txid: tx.txid.clone(),
                    vout: vout as u32,
                },
                Coin {
                    amount: output.amount,
                    address: output.address.clone(),
                    height: None,
                    coinbase: false,
                },
            );
        }
        Ok(())
    }

    /// Put `txid` in the pending set of `node`, received from `peer` or
    /// submitted locally. Returns `false` if it was already there or mined.
    pub fn accept(&mut self, node: usize, txid: &str, peer: Option<usize>) -> bool {
        if self.confirmed.contains_key(txid) || self.nodes[node].mempool.contains_key(txid) {
            return false;
        }
        let Some(wtxid) = self.txs.get(txid).map(|tx| tx.wtxid.clone()) else {
            return false;
        };

        let state = &mut self.nodes[node];
        let entry = PendingEntry {
            first_announce_time: state.announced.remove(txid),
            accepted_time: Some(Utc::now()),
        };
        state.mempool.insert(txid.to_string(), entry);
        let source = peer.map(|p| format!("peer={p}: ")).unwrap_or_default();
        state.write_log(
            "mempool",
            &format!("AcceptToMemoryPool: {source}accepted {txid} (wtxid={wtxid})"),
        );
        true
    }

    /// Mine `count` blocks on `node`, confirming its pending set. Returns the
    /// block hashes and the confirmed txids.
    pub fn mine(
        &mut self,
        node: usize,
        count: u64,
        address: &str,
        reward: Amount,
    ) -> (Vec<String>, Vec<String>) {
        let mut hashes = Vec::with_capacity(count as usize);
        let base = self.tip.max(self.nodes[node].height);
        let confirmed: Vec<String> = self.nodes[node].mempool.keys().cloned().collect();

        for offset in 1..=count {
            let height = base + offset;
            let coinbase = self.random_id();
            self.coins.insert(
                OutPoint {
                    txid: coinbase.clone(),
                    vout: 0,
                },
                Coin {
                    amount: reward,
                    address: address.to_string(),
                    height: Some(height),
                    coinbase: true,
                },
            );
            hashes.push(self.random_id());
        }

        if count > 0 {
            for txid in &confirmed {
                self.confirm(txid, base + 1);
            }
            self.tip = base + count;
            self.apply_block(node, self.tip);
        }
        (hashes, confirmed)
    }

    fn confirm(&mut self, txid: &str, height: u64) {
        self.confirmed.insert(txid.to_string(), height);
        for coin in self
            .coins
            .iter_mut()
            .filter(|(outpoint, _)| outpoint.txid == txid)
            .map(|(_, coin)| coin)
        {
            coin.height = Some(height);
        }
    }

    /// `node` learns of the chain up to `height` and drops what it mined.
    pub fn apply_block(&mut self, node: usize, height: u64) {
        let state = &mut self.nodes[node];
        state.height = state.height.max(height);
        let mined = |txid: &String| {
            self.confirmed
                .get(txid)
                .is_some_and(|confirmed_at| *confirmed_at <= height)
        };
        state.mempool.retain(|txid, _| !mined(txid));
        state.announced.retain(|txid, _| !mined(txid));
        state.rejected.retain(|txid| !mined(txid));
    }
}

fn bump(counters: &mut BTreeMap<String, MessageCounter>, message: &str, by: MessageCounter) {
    let slot = counters.entry(message.to_string()).or_default();
    *slot = *slot + by;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(tanks: usize) -> SimState {
        SimState::new(&SimConfig::ring(tanks))
    }

    #[test]
    fn test_inbound_links_derived() {
        let state = state(3);
        assert_eq!(state.nodes[0].inbound, vec![2]);
        assert_eq!(state.nodes[0].neighbours().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_coinbase_matures_after_maturity() {
        let mut state = state(1);
        let address = state.new_address(0);
        let reward = Amount::from_units(5_000_000_000);

        state.mine(0, 100, &address, reward);
        assert!(state.wallet_coins(0, 1, 100).is_empty());

        state.mine(0, 1, &address, reward);
        let coins = state.wallet_coins(0, 1, 100);
        assert_eq!(coins.len(), 1);
        assert_eq!(coins[0].confirmations, 101);
    }

    #[test]
    fn test_spend_and_confirm() {
        let mut state = state(1);
        let address = state.new_address(0);
        state.mine(0, 101, &address, Amount::from_units(1_000));
        let coin = state.wallet_coins(0, 1, 100)[0].clone();

        let raw = RawTransaction {
            inputs: vec![coin.outpoint()],
            outputs: vec![TxOutput {
                address: address.clone(),
                amount: Amount::from_units(900),
            }],
        };
        let payload = state.sign(0, &raw).unwrap();
        let txid = state.decode(&payload).unwrap().txid.clone();
        state.apply_spend(&txid).unwrap();
        assert!(state.accept(0, &txid, None));
        assert!(!state.accept(0, &txid, Some(1)));

        // Spent twice.
        assert!(matches!(
            state.apply_spend(&txid),
            Err(NodeError::Rpc { code: -25, .. })
        ));

        let (_, confirmed) = state.mine(0, 1, &address, Amount::from_units(1_000));
        assert_eq!(confirmed, vec![txid.clone()]);
        assert!(state.nodes[0].mempool.is_empty());
        assert!(state
            .wallet_coins(0, 1, 100)
            .iter()
            .any(|c| c.txid == txid && c.amount.units() == 900));
    }

    #[test]
    fn test_sign_rejects_foreign_input() {
        let mut state = state(2);
        let address = state.new_address(0);
        state.mine(0, 101, &address, Amount::from_units(1_000));
        let coin = state.wallet_coins(0, 1, 100)[0].clone();

        let raw = RawTransaction {
            inputs: vec![coin.outpoint()],
            outputs: Vec::new(),
        };
        assert!(matches!(
            state.sign(1, &raw),
            Err(NodeError::Rpc { code: -8, .. })
        ));
    }

    #[test]
    fn test_message_counting() {
        let mut state = state(2);
        state.count_message(0, 1, "inv", 58);
        state.count_message(0, 1, "inv", 58);
        assert_eq!(state.nodes[0].stats.sent["inv"].count, 2);
        assert_eq!(state.nodes[1].stats.recv["inv"].bytes, 116);
    }
}
