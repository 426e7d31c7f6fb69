//! Shared setup for the integration scenarios.

use std::collections::VecDeque;

use shared_types::{DecodedTransaction, NodeError, NodeHandle, SignedTransaction, UnspentOutput};
use tb_01_topology::TopologyGraph;
use tb_05_experiment::{TransactionPlan, DEFAULT_FEE, DEFAULT_WALLET};

/// Blocks after which the first coinbase can be spent.
pub const MATURE_CHAIN: u64 = 101;

/// Load the miner's wallet and mine until one coinbase is spendable.
pub async fn fund(miner: &dyn NodeHandle) -> Result<UnspentOutput, NodeError> {
    miner.ensure_wallet(DEFAULT_WALLET).await?;
    let address = miner.new_address().await?;
    miner.generate_blocks(MATURE_CHAIN, &address).await?;
    miner
        .list_unspent(1)
        .await?
        .into_iter()
        .find(|utxo| utxo.spendable)
        .ok_or_else(|| NodeError::Decode("no spendable coinbase".into()))
}

/// Spend `utxo` the way the experiment does and submit the result on `node`.
pub async fn submit_split(
    node: &dyn NodeHandle,
    utxo: &UnspentOutput,
) -> Result<DecodedTransaction, NodeError> {
    let plan = TransactionPlan::new(utxo, DEFAULT_FEE);
    let mut addresses = Vec::with_capacity(plan.outputs());
    for _ in 0..plan.outputs() {
        addresses.push(node.new_address().await?);
    }
    let signed: SignedTransaction = node.sign_transaction(&plan.into_raw(addresses)).await?;
    let decoded = node.decode_transaction(&signed).await?;
    node.submit_transaction(&signed).await?;
    Ok(decoded)
}

/// Outbound lists of `graph`, in node order.
pub fn links(graph: &TopologyGraph) -> Vec<Vec<usize>> {
    (0..graph.len())
        .map(|node| graph.outbound(node).to_vec())
        .collect()
}

/// Whether every node reaches every other, ignoring link direction.
pub fn connected(graph: &TopologyGraph) -> bool {
    let n = graph.len();
    let mut adjacent = vec![Vec::new(); n];
    for from in 0..n {
        for &to in graph.outbound(from) {
            adjacent[from].push(to);
            adjacent[to].push(from);
        }
    }

    let mut seen = vec![false; n];
    let mut queue = VecDeque::from([0]);
    seen[0] = true;
    while let Some(node) = queue.pop_front() {
        for &next in &adjacent[node] {
            if !seen[next] {
                seen[next] = true;
                queue.push_back(next);
            }
        }
    }
    seen.into_iter().all(|visited| visited)
}
