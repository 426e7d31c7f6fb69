//! Which outputs may fund a transaction, and how many blocks to mine for them.

use shared_types::{Amount, UnspentOutput};

/// Confirmations a coinbase output needs before it can be spent.
pub const COINBASE_MATURITY: u64 = 100;

/// Spendable outputs worth at least `min_value`, in wallet order.
pub fn eligible_utxos(utxos: Vec<UnspentOutput>, min_value: Amount) -> Vec<UnspentOutput> {
    utxos
        .into_iter()
        .filter(|utxo| utxo.spendable && utxo.amount >= min_value)
        .collect()
}

/// Blocks the miner mines before an iteration that needs `wanted` outputs.
///
/// At least one block is always mined so the pending sets start empty.
/// Below the maturity height every new coinbase is still locked, so the
/// shortfall is topped up by [`COINBASE_MATURITY`].
pub fn blocks_to_mine(eligible: usize, wanted: usize, height: u64) -> u64 {
    if eligible >= wanted {
        return 1;
    }
    let missing = (wanted - eligible) as u64;
    if height > COINBASE_MATURITY {
        missing
    } else {
        COINBASE_MATURITY + missing
    }
}
