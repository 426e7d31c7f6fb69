//! Message legs between simulated tanks.
//!
//! Each leg is a spawned task that sleeps for `relay_delay` and then applies
//! its effect under the state lock. Messages are counted when sent.

use std::sync::Arc;

use rand::Rng;
use tracing::trace;

use crate::state::{Shared, SimState};

/// Message header size.
const HEADER_BYTES: u64 = 24;

/// `inv` carrying a single entry.
const INV_BYTES: u64 = 22 + 36;

/// `getdata` for a single entry.
const GETDATA_BYTES: u64 = HEADER_BYTES + 1 + 36;

/// `headers` announcing one block.
const HEADERS_BYTES: u64 = HEADER_BYTES + 1 + 81;

/// Announce `txid` from `from` to every neighbour except `except`.
pub(crate) fn announce_transaction(
    shared: &Arc<Shared>,
    state: &mut SimState,
    from: usize,
    txid: &str,
    except: Option<usize>,
) {
    let targets: Vec<usize> = state.nodes[from]
        .neighbours()
        .filter(|peer| Some(*peer) != except)
        .collect();

    for to in targets {
        state.count_message(from, to, "inv", INV_BYTES);
        let shared = Arc::clone(shared);
        let txid = txid.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(shared.config.relay_delay).await;
            let mut state = shared.state.lock();
            receive_inv(&shared, &mut state, to, from, &txid);
        });
    }
}

fn receive_inv(
    shared: &Arc<Shared>,
    state: &mut SimState,
    node: usize,
    from: usize,
    txid: &str,
) {
    if state.confirmed.contains_key(txid) {
        return;
    }
    let Some(wtxid) = state.txs.get(txid).map(|tx| tx.wtxid.clone()) else {
        return;
    };

    let tank = &mut state.nodes[node];
    tank.write_log("net", &format!("got inv: wtx {wtxid} peer={from}"));
    if tank.mempool.contains_key(txid) || tank.rejected.contains(txid) {
        return;
    }
    tank.announced
        .entry(txid.to_string())
        .or_insert_with(chrono::Utc::now);
    if !tank.requested.insert(txid.to_string()) {
        return;
    }

    state.count_message(node, from, "getdata", GETDATA_BYTES);
    let shared = Arc::clone(shared);
    let txid = txid.to_string();
    tokio::spawn(async move {
        let delay = shared.config.relay_delay;
        tokio::time::sleep(delay).await;
        {
            let mut state = shared.state.lock();
            let vsize = match state.txs.get(&txid) {
                Some(tx) => tx.vsize,
                None => return,
            };
            state.count_message(from, node, "tx", vsize + HEADER_BYTES);
        }
        tokio::time::sleep(delay).await;
        let mut state = shared.state.lock();
        receive_transaction(&shared, &mut state, node, from, &txid);
    });
}

fn receive_transaction(
    shared: &Arc<Shared>,
    state: &mut SimState,
    node: usize,
    from: usize,
    txid: &str,
) {
    state.nodes[node].requested.remove(txid);
    if state.confirmed.contains_key(txid) {
        return;
    }

    let rate = shared.config.false_positive_rate;
    if rate > 0.0 && state.rng.gen_bool(rate) {
        trace!(node, txid, "Simulated duplicate-filter drop");
        state.nodes[node].rejected.insert(txid.to_string());
        return;
    }

    if state.accept(node, txid, Some(from)) {
        announce_transaction(shared, state, node, txid, Some(from));
    }
}

/// Announce the chain up to `height` from `from`, flooding every tank that
/// is behind.
pub(crate) fn announce_block(shared: &Arc<Shared>, state: &mut SimState, from: usize, height: u64) {
    let targets: Vec<usize> = state.nodes[from]
        .neighbours()
        .filter(|peer| state.nodes[*peer].height < height)
        .collect();

    for to in targets {
        state.count_message(from, to, "headers", HEADERS_BYTES);
        let shared = Arc::clone(shared);
        tokio::spawn(async move {
            tokio::time::sleep(shared.config.relay_delay).await;
            let mut state = shared.state.lock();
            if state.nodes[to].height >= height {
                return;
            }
            state.apply_block(to, height);
            announce_block(&shared, &mut state, to, height);
        });
    }
}
