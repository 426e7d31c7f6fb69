//! One-input transactions that split an output four ways.

use shared_types::{Amount, OutPoint, RawTransaction, SignedTransaction, TxOutput, UnspentOutput};

/// Outputs that always receive a quarter of the input.
const FIXED_OUTPUTS: usize = 3;

/// Output amounts for spending `input`.
///
/// Three outputs of `input / 4`, rounded down to a whole unit. A fourth
/// output of `input / 4 − fee` follows only if `input / 4 > 2 × fee`;
/// otherwise the remainder is left to the fee.
pub fn split_outputs(input: Amount, fee: Amount) -> Vec<Amount> {
    let share = input.div_floor(4);
    let mut amounts = vec![share; FIXED_OUTPUTS];

    let threshold = fee.checked_mul(2).unwrap_or(Amount::from_units(u64::MAX));
    if share > threshold {
        if let Some(change) = share.checked_sub(fee) {
            amounts.push(change);
        }
    }
    amounts
}

/// Spending plan for one output, before addresses are known.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionPlan {
    pub input: OutPoint,
    pub amounts: Vec<Amount>,
}

impl TransactionPlan {
    pub fn new(utxo: &UnspentOutput, fee: Amount) -> Self {
        Self {
            input: utxo.outpoint(),
            amounts: split_outputs(utxo.amount, fee),
        }
    }

    /// Number of fresh addresses the plan needs.
    pub fn outputs(&self) -> usize {
        self.amounts.len()
    }

    /// Pair each amount with its address. Extra addresses are ignored.
    pub fn into_raw(self, addresses: Vec<String>) -> RawTransaction {
        let outputs = self
            .amounts
            .into_iter()
            .zip(addresses)
            .map(|(amount, address)| TxOutput { address, amount })
            .collect();
        RawTransaction {
            inputs: vec![self.input],
            outputs,
        }
    }
}

/// A signed transaction ready for broadcast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedTransaction {
    pub signed: SignedTransaction,
    pub txid: String,
    pub wtxid: String,
}
