//! # Experiment Orchestrator
//!
//! Drives the phases of a run. All tanks are reached through the
//! [`Network`] descriptor; the only state kept between iterations is the
//! [`ExperimentAggregate`].

use shared_types::{Network, NodeError, Tank, TankId};
use tb_02_sync_barrier::{wait_for_connectivity, wait_for_height, wait_for_mempool};
use tb_03_traffic::{capture, TrafficDiff};
use tb_04_propagation::{MarkedTransaction, PropagationTracer};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ExperimentConfig;
use crate::domain::{
    blocks_to_mine, eligible_utxos, BroadcastSchedule, ExperimentAggregate, ExperimentReport,
    GeneratedTransaction, Phase, TransactionPlan,
};
use crate::errors::ExperimentError;

fn enter(iteration: u32, phase: Phase) {
    info!(iteration, phase = %phase, "[tb-05] Entering {}", phase);
}

fn node_error(tank: TankId, operation: &'static str) -> impl FnOnce(NodeError) -> ExperimentError {
    move |source| ExperimentError::Node {
        tank,
        operation,
        source,
    }
}

pub struct Experiment {
    network: Network,
    config: ExperimentConfig,
    tracer: Box<dyn PropagationTracer>,
    cancel: CancellationToken,
}

impl Experiment {
    pub fn new(network: Network, config: ExperimentConfig) -> Result<Self, ExperimentError> {
        config.validate()?;
        let tracer = config.tracer.build(config.log_linger);
        Ok(Self {
            network,
            config,
            tracer,
            cancel: CancellationToken::new(),
        })
    }

    /// Replace the tracer chosen by the configuration.
    pub fn with_tracer(mut self, tracer: Box<dyn PropagationTracer>) -> Self {
        self.tracer = tracer;
        self
    }

    /// Cancelling this token aborts the barrier or trace round currently
    /// waiting. Traffic snapshots run to completion.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Run every iteration and report the averages.
    pub async fn run(&self) -> Result<ExperimentReport, ExperimentError> {
        info!(
            tanks = self.network.len(),
            miner = %self.network.miner().id,
            tx_count = self.config.tx_count,
            iterations = self.config.iterations,
            tracer = self.tracer.name(),
            "[tb-05] Starting experiment"
        );

        enter(0, Phase::AwaitingConnectivity);
        wait_for_connectivity(self.network.tanks(), &self.config.connectivity, &self.cancel)
            .await?;

        let mut aggregate = ExperimentAggregate::new();
        for iteration in 1..=self.config.iterations {
            if self.config.iterations > 1 {
                info!(iteration, "[tb-05] Iteration {}/{}", iteration, self.config.iterations);
            }
            self.iterate(iteration, &mut aggregate).await?;
        }

        enter(aggregate.iterations(), Phase::Reporting);
        let report = aggregate.report();
        log_report(&report);
        Ok(report)
    }

    async fn iterate(
        &self,
        iteration: u32,
        aggregate: &mut ExperimentAggregate,
    ) -> Result<(), ExperimentError> {
        let tanks = self.network.tanks();

        enter(iteration, Phase::ReplenishFunds);
        self.replenish_funds().await?;

        enter(iteration, Phase::SnapshotBefore);
        let before = capture(tanks).await?;

        enter(iteration, Phase::GenerateTxs);
        let transactions = self.generate_transactions().await?;

        enter(iteration, Phase::SelectMarkedTx);
        let schedule = BroadcastSchedule::new(tanks.len());
        let marked = select_marked(&transactions, &schedule)?;
        let round = self
            .tracer
            .arm(&self.network.without(marked.origin), &marked)
            .await?;
        info!(
            iteration,
            txid = %marked.txid,
            origin = %marked.origin,
            traced = round.traced(),
            "[tb-05] Marked transaction selected"
        );

        enter(iteration, Phase::Broadcast);
        let submitted = self.broadcast(&transactions, &schedule).await?;

        enter(iteration, Phase::AwaitConvergence);
        wait_for_mempool(tanks, submitted, &self.config.convergence, &self.cancel).await?;
        info!(iteration, "[tb-05] All transactions were received by all tanks");

        enter(iteration, Phase::SnapshotAfter);
        let after = capture(tanks).await?;

        enter(iteration, Phase::TraceMarkedTx);
        let outcome = round.collect(&self.cancel).await?;

        enter(iteration, Phase::FoldStatistics);
        let diff = TrafficDiff::between(&before, &after);
        aggregate.fold(submitted, &diff, &outcome.estimate);
        info!(
            iteration,
            inv_entries = diff.inv_entry_estimate(),
            propagation_secs = ?outcome.estimate.seconds,
            "[tb-05] Iteration complete"
        );
        Ok(())
    }

    /// Mine until the miner holds enough outputs, then wait for every other
    /// tank to reach the new tip.
    async fn replenish_funds(&self) -> Result<(), ExperimentError> {
        let miner = self.network.miner();
        let node = &miner.handle;

        node.ensure_wallet(&self.config.wallet)
            .await
            .map_err(node_error(miner.id, "ensure_wallet"))?;
        let unspent = node
            .list_unspent(1)
            .await
            .map_err(node_error(miner.id, "list_unspent"))?;
        let eligible = eligible_utxos(unspent, self.config.min_utxo).len();
        let height = node
            .chain_height()
            .await
            .map_err(node_error(miner.id, "chain_height"))?;

        let blocks = blocks_to_mine(eligible, self.config.tx_count, height);
        let address = node
            .new_address()
            .await
            .map_err(node_error(miner.id, "new_address"))?;
        node.generate_blocks(blocks, &address)
            .await
            .map_err(node_error(miner.id, "generate_blocks"))?;

        let target = height + blocks;
        info!(
            tank = %miner.id,
            blocks,
            eligible,
            height = target,
            "[tb-05] Generated {} block(s)", blocks
        );

        wait_for_height(
            &self.network.without(miner.id),
            target,
            &self.config.height,
            &self.cancel,
        )
        .await?;
        Ok(())
    }

    /// One signed transaction per eligible output, from the miner's wallet.
    async fn generate_transactions(&self) -> Result<Vec<GeneratedTransaction>, ExperimentError> {
        let miner = self.network.miner();
        let node = &miner.handle;
        let requested = self.config.tx_count;

        let unspent = node
            .list_unspent(1)
            .await
            .map_err(node_error(miner.id, "list_unspent"))?;
        let utxos = eligible_utxos(unspent, self.config.min_utxo);
        if utxos.len() < requested {
            return Err(ExperimentError::InsufficientFunds {
                requested,
                available: utxos.len(),
                min_value: self.config.min_utxo,
            });
        }

        info!(count = requested, "[tb-05] Creating transactions");
        let mut transactions = Vec::with_capacity(requested);
        for utxo in utxos.into_iter().take(requested) {
            let plan = TransactionPlan::new(&utxo, self.config.fee);
            let mut addresses = Vec::with_capacity(plan.outputs());
            for _ in 0..plan.outputs() {
                let address = node
                    .new_address()
                    .await
                    .map_err(node_error(miner.id, "new_address"))?;
                addresses.push(address);
            }

            let signed = node
                .sign_transaction(&plan.into_raw(addresses))
                .await
                .map_err(node_error(miner.id, "sign_transaction"))?;
            let decoded = node
                .decode_transaction(&signed)
                .await
                .map_err(node_error(miner.id, "decode_transaction"))?;
            transactions.push(GeneratedTransaction {
                signed,
                txid: decoded.txid,
                wtxid: decoded.wtxid,
            });
        }
        Ok(transactions)
    }

    /// Submit one at a time, rotating the sender. Never retried.
    async fn broadcast(
        &self,
        transactions: &[GeneratedTransaction],
        schedule: &BroadcastSchedule,
    ) -> Result<usize, ExperimentError> {
        info!(
            count = transactions.len(),
            max_per_tank = schedule.max_per_tank(transactions.len()),
            "[tb-05] Broadcasting transactions from different sources in the network"
        );
        for (index, transaction) in transactions.iter().enumerate() {
            let tank = self.sender(schedule, index)?;
            let txid = tank
                .handle
                .submit_transaction(&transaction.signed)
                .await
                .map_err(node_error(tank.id, "submit_transaction"))?;
            debug!(tank = %tank.id, %txid, "Transaction submitted");
        }
        Ok(transactions.len())
    }

    fn sender(&self, schedule: &BroadcastSchedule, index: usize) -> Result<&Tank, ExperimentError> {
        let id = schedule.sender(index);
        self.network
            .tank(id)
            .ok_or_else(|| ExperimentError::InvalidConfig(format!("no tank with id {id}")))
    }
}

/// The first transaction broadcast, sent by the schedule's first tank.
fn select_marked(
    transactions: &[GeneratedTransaction],
    schedule: &BroadcastSchedule,
) -> Result<MarkedTransaction, ExperimentError> {
    let first = transactions
        .first()
        .ok_or_else(|| ExperimentError::InvalidConfig("no transactions generated".into()))?;
    Ok(MarkedTransaction {
        txid: first.txid.clone(),
        wtxid: first.wtxid.clone(),
        origin: schedule.sender(0),
    })
}

fn log_report(report: &ExperimentReport) {
    info!(iterations = report.iterations, "[tb-05] Reporting netstats");
    info!("message count: {:?}", report.message_counts);
    info!("bytes per message: {:?}", report.message_bytes);
    match report.mean_inv_entries {
        Some(mean) => info!("INV entry count: {}", mean),
        None => info!("INV entry count: n/a"),
    }
    match report.mean_propagation_secs {
        Some(mean) => info!("approx propagation time: {}s", mean),
        None => warn!("approx propagation time: no complete sample"),
    }
    if report.precision_warnings > 0 {
        warn!(
            precision_warnings = report.precision_warnings,
            "Propagation time is based on incomplete traces"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::test_utils::ScriptedNode;
    use shared_types::{Amount, TankId};
    use std::sync::Arc;
    use std::time::Duration;
    use tb_02_sync_barrier::BarrierError;
    use tb_04_propagation::TracerKind;
    use tb_sim::{SimConfig, SimNetwork};

    fn config(tx_count: usize, iterations: u32) -> ExperimentConfig {
        ExperimentConfig {
            tx_count,
            iterations,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_iteration_on_simulated_network() {
        let sim = SimNetwork::new(SimConfig::ring(4)).unwrap();
        let experiment = Experiment::new(sim.network(0).unwrap(), config(4, 1)).unwrap();

        let report = experiment.run().await.unwrap();

        for tank in 0..4 {
            assert_eq!(sim.mempool_size(tank), 4);
        }
        assert_eq!(report.iterations, 1);
        let summary = &report.per_iteration[0];
        assert_eq!(summary.traced, 3);
        assert_eq!(summary.announcements, 3);
        assert_eq!(summary.acceptances, 3);
        assert!(!summary.precision_warning);

        let inv = report.mean_inv_entries.unwrap();
        assert!(inv.is_finite() && inv >= 0.0);
        let seconds = report.mean_propagation_secs.unwrap();
        assert!(seconds.is_finite() && seconds >= 0.0);
        assert!(report.message_counts["tx"] > 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_iterations_reuse_change_outputs() {
        let sim = SimNetwork::new(SimConfig::ring(3)).unwrap();
        let experiment = Experiment::new(sim.network(0).unwrap(), config(4, 2)).unwrap();

        let report = experiment.run().await.unwrap();
        assert_eq!(report.iterations, 2);
        assert_eq!(report.per_iteration.len(), 2);
        // 104 blocks to mature four coinbases, then four more.
        assert_eq!(sim.height(0), 108);
        assert_eq!(sim.height(2), 108);
        assert_eq!(sim.mempool_size(1), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_log_tracer_on_simulated_network() {
        let sim = SimNetwork::new(SimConfig::ring(4)).unwrap();
        let mut settings = config(3, 1);
        settings.tracer = TracerKind::Log;
        settings.log_linger = Duration::from_millis(200);
        let experiment = Experiment::new(sim.network(0).unwrap(), settings).unwrap();

        let report = experiment.run().await.unwrap();
        let summary = &report.per_iteration[0];
        assert_eq!(summary.traced, 3);
        assert_eq!(summary.acceptances, 3);
        assert_eq!(summary.announcements, 3);
        assert!(report.mean_propagation_secs.unwrap() >= 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_filtered_marked_transaction_is_reported() {
        let sim = SimNetwork::new(SimConfig {
            false_positive_rate: 1.0,
            ..SimConfig::ring(2)
        })
        .unwrap();
        let experiment = Experiment::new(sim.network(0).unwrap(), config(1, 1)).unwrap();

        let report = experiment.run().await.unwrap();

        // The only relay was dropped; the barrier tolerated tank 1 at zero.
        assert_eq!(sim.mempool_size(1), 0);
        let summary = &report.per_iteration[0];
        assert_eq!(summary.traced, 1);
        assert_eq!(summary.acceptances, 0);
        assert!(summary.precision_warning);
        assert_eq!(report.precision_warnings, 1);
        assert_eq!(report.mean_propagation_secs, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insufficient_funds() {
        let sim = SimNetwork::new(SimConfig::ring(2)).unwrap();
        let mut settings = config(4, 1);
        // Above the block reward: no output ever qualifies.
        settings.min_utxo = Amount::from_coins(100.0);
        let experiment = Experiment::new(sim.network(0).unwrap(), settings).unwrap();

        let err = experiment.run().await.unwrap_err();
        assert!(matches!(
            err,
            ExperimentError::InsufficientFunds {
                requested: 4,
                available: 0,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_node_failure_is_reported_with_operation() {
        let node = ScriptedNode::new().with_peers([Vec::new()]);
        let tank = Tank {
            id: TankId(0),
            name: "tank-0000".into(),
            init_peers: 0,
            handle: Arc::new(node),
        };
        let network = Network::new(vec![tank], TankId(0)).unwrap();
        let experiment = Experiment::new(network, config(1, 1)).unwrap();

        let err = experiment.run().await.unwrap_err();
        assert!(matches!(
            err,
            ExperimentError::Node {
                operation: "ensure_wallet",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_cancelled_before_connectivity() {
        let sim = SimNetwork::new(SimConfig::ring(3)).unwrap();
        let experiment = Experiment::new(sim.network(0).unwrap(), config(4, 1)).unwrap();
        experiment.cancellation_token().cancel();

        let err = experiment.run().await.unwrap_err();
        assert!(matches!(
            err,
            ExperimentError::Barrier(BarrierError::Cancelled { .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let sim = SimNetwork::new(SimConfig::ring(2)).unwrap();
        let result = Experiment::new(sim.network(0).unwrap(), config(0, 1));
        assert!(matches!(result, Err(ExperimentError::InvalidConfig(_))));
    }
}
