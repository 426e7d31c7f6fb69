//! Shapes of the node's RPC answers and their conversion into shared
//! entities.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared_types::{DecodedTransaction, PeerConnection, PendingEntry, Timestamp};

/// One `getpeerinfo` entry.
#[derive(Debug, Deserialize)]
pub(crate) struct PeerInfo {
    #[serde(default)]
    pub connection_type: String,
    #[serde(default)]
    pub addnode: bool,
    /// Zero until the version handshake completed.
    #[serde(default)]
    pub version: u64,
}

impl From<PeerInfo> for PeerConnection {
    fn from(info: PeerInfo) -> Self {
        PeerConnection {
            connection_type: info.connection_type,
            handshake_complete: info.version != 0,
            addnode: info.addnode,
        }
    }
}

/// `decoderawtransaction`; `hash` is the witness id.
#[derive(Debug, Deserialize)]
pub(crate) struct DecodedRaw {
    pub txid: String,
    pub hash: String,
}

impl From<DecodedRaw> for DecodedTransaction {
    fn from(raw: DecodedRaw) -> Self {
        DecodedTransaction {
            txid: raw.txid,
            wtxid: raw.hash,
        }
    }
}

/// `signrawtransactionwithwallet`.
#[derive(Debug, Deserialize)]
pub(crate) struct SignedRaw {
    pub hex: String,
    #[serde(default)]
    pub complete: bool,
}

/// `getmempoolentry`. Times are fractional Unix seconds; a node that does
/// not report `accepted_time` falls back to the whole-second `time`.
#[derive(Debug, Deserialize)]
pub(crate) struct MempoolEntry {
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub first_announce_time: Option<f64>,
    #[serde(default)]
    pub accepted_time: Option<f64>,
}

impl From<MempoolEntry> for PendingEntry {
    fn from(entry: MempoolEntry) -> Self {
        let accepted = entry
            .accepted_time
            .or(entry.time.map(|secs| secs as f64));
        PendingEntry {
            first_announce_time: entry.first_announce_time.and_then(from_unix_secs),
            accepted_time: accepted.and_then(from_unix_secs),
        }
    }
}

fn from_unix_secs(secs: f64) -> Option<Timestamp> {
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    let micros = (secs * 1_000_000.0).round() as i64;
    DateTime::<Utc>::from_timestamp_micros(micros)
}
