//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Identity**: `TankId`
//! - **Value**: `Amount`, `UnspentOutput`, `OutPoint`, `TxOutput`
//! - **Transactions**: `RawTransaction`, `SignedTransaction`, `DecodedTransaction`,
//!   `PendingEntry`
//! - **Networking**: `PeerConnection`, `MessageCounter`, `MessageStats`

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Add;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Index of a tank inside a [`crate::Network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TankId(pub usize);

impl fmt::Display for TankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tank-{:04}", self.0)
    }
}

/// Wall-clock timestamp as reported by a node.
pub type Timestamp = DateTime<Utc>;

// =============================================================================
// CLUSTER B: VALUE
// =============================================================================

/// Minimal indivisible units per coin.
pub const UNITS_PER_COIN: u64 = 100_000_000;

/// A coin amount, stored as a count of minimal units.
///
/// Values coming from a node as decimal coins are quantized on entry, so no
/// sub-unit precision can ever be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_units(units: u64) -> Self {
        Amount(units)
    }

    pub const fn units(self) -> u64 {
        self.0
    }

    /// Quantize a decimal coin value to the nearest unit.
    ///
    /// Negative and non-finite values map to zero.
    pub fn from_coins(coins: f64) -> Self {
        if !coins.is_finite() || coins <= 0.0 {
            return Amount::ZERO;
        }
        Amount((coins * UNITS_PER_COIN as f64).round() as u64)
    }

    pub fn to_coins(self) -> f64 {
        self.0 as f64 / UNITS_PER_COIN as f64
    }

    /// Divide, rounding down to a whole unit.
    pub fn div_floor(self, divisor: u64) -> Self {
        Amount(self.0 / divisor)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    pub fn checked_mul(self, factor: u64) -> Option<Amount> {
        self.0.checked_mul(factor).map(Amount)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:08}",
            self.0 / UNITS_PER_COIN,
            self.0 % UNITS_PER_COIN
        )
    }
}

/// Amounts travel over JSON-RPC as decimal coins.
impl Serialize for Amount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_coins())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let coins = f64::deserialize(deserializer)?;
        Ok(Amount::from_coins(coins))
    }
}

/// An unspent output as listed by the node's wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnspentOutput {
    pub txid: String,
    pub vout: u32,
    pub amount: Amount,
    #[serde(default)]
    pub spendable: bool,
    #[serde(default)]
    pub confirmations: u64,
}

impl UnspentOutput {
    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            txid: self.txid.clone(),
            vout: self.vout,
        }
    }
}

/// Reference to a previous transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: String,
    pub vout: u32,
}

/// A payment to a wallet address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    pub address: String,
    pub amount: Amount,
}

// =============================================================================
// CLUSTER C: TRANSACTIONS
// =============================================================================

/// An unsigned transaction, handed to the node for construction and signing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawTransaction {
    pub inputs: Vec<OutPoint>,
    pub outputs: Vec<TxOutput>,
}

impl RawTransaction {
    pub fn total_output(&self) -> Amount {
        self.outputs
            .iter()
            .fold(Amount::ZERO, |acc, out| acc + out.amount)
    }
}

/// A signed transaction payload, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub hex: String,
}

/// Identifiers derived from a signed transaction.
///
/// `wtxid` includes witness data and is what peers use for announcement
/// deduplication; `txid` is the stable identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecodedTransaction {
    pub txid: String,
    pub wtxid: String,
}

/// A node's record of one pending transaction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PendingEntry {
    /// First time an announcement for the transaction reached the node.
    pub first_announce_time: Option<Timestamp>,
    /// Time the transaction was accepted into the pending set.
    pub accepted_time: Option<Timestamp>,
}

// =============================================================================
// CLUSTER D: NETWORKING
// =============================================================================

/// One entry of a node's peer list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeerConnection {
    #[serde(default)]
    pub connection_type: String,
    #[serde(default)]
    pub handshake_complete: bool,
    #[serde(default)]
    pub addnode: bool,
}

impl PeerConnection {
    /// Connection requested through the topology's `addnode` list.
    pub fn is_manual(&self) -> bool {
        self.connection_type == "manual" || self.addnode
    }
}

/// Cumulative count and byte total for one message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageCounter {
    pub count: u64,
    pub bytes: u64,
}

impl Add for MessageCounter {
    type Output = MessageCounter;

    fn add(self, rhs: MessageCounter) -> MessageCounter {
        MessageCounter {
            count: self.count + rhs.count,
            bytes: self.bytes + rhs.bytes,
        }
    }
}

/// Per-message-type traffic counters of a single node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageStats {
    #[serde(default)]
    pub sent: BTreeMap<String, MessageCounter>,
    #[serde(default)]
    pub recv: BTreeMap<String, MessageCounter>,
}
