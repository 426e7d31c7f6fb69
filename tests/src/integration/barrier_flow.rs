//! # Barrier and Traffic Flows
//!
//! The tb-02 barriers and tb-03 capture run against live simulated tanks
//! instead of scripted answers:
//!
//! 1. **Connectivity**: every tank's manual peers finish their handshake
//! 2. **Height**: blocks mined on the miner reach the other tanks
//! 3. **Convergence**: a relayed transaction reaches every pending set, and
//!    a relay lost to the duplicate filter is tolerated after the budget
//! 4. **Traffic**: the capture around one broadcast shows the relay messages

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use shared_types::TankId;
    use tb_02_sync_barrier::{
        wait_for_connectivity, wait_for_height, wait_for_mempool, BarrierConfig, BarrierError,
        ConvergenceConfig, TankOutcome,
    };
    use tb_03_traffic::{capture, Direction, TrafficDiff};
    use tb_sim::{SimConfig, SimNetwork};
    use tokio_util::sync::CancellationToken;

    use crate::integration::fixtures::{fund, submit_split, MATURE_CHAIN};

    fn convergence(stall_budget: u32) -> ConvergenceConfig {
        ConvergenceConfig {
            stall_budget,
            ..Default::default()
        }
    }

    // =========================================================================
    // CONNECTIVITY AND HEIGHT
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_connectivity_then_height() {
        let sim = SimNetwork::new(SimConfig::ring(5)).unwrap();
        let network = sim.network(0).unwrap();
        let cancel = CancellationToken::new();

        let report = wait_for_connectivity(network.tanks(), &BarrierConfig::default(), &cancel)
            .await
            .unwrap();
        assert_eq!(report.len(), 5);
        assert!(report.all_reached());

        fund(network.miner().handle.as_ref()).await.unwrap();
        let others = network.without(TankId(0));
        let report = wait_for_height(&others, MATURE_CHAIN, &BarrierConfig::default(), &cancel)
            .await
            .unwrap();
        assert_eq!(report.len(), 4);
        for id in 1..5 {
            assert_eq!(sim.height(id), MATURE_CHAIN);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_height_deadline_expires() {
        let sim = SimNetwork::new(SimConfig::ring(3)).unwrap();
        let network = sim.network(0).unwrap();
        let config = BarrierConfig {
            deadline: Some(Duration::from_secs(10)),
            ..Default::default()
        };

        // Nothing is mined, so height 5 never arrives.
        let err = wait_for_height(network.tanks(), 5, &config, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BarrierError::Timeout { .. }));
    }

    // =========================================================================
    // CONVERGENCE
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_relayed_transaction_converges() {
        let sim = SimNetwork::new(SimConfig::ring(4)).unwrap();
        let network = sim.network(0).unwrap();
        let miner = network.miner().handle.clone();

        let utxo = fund(miner.as_ref()).await.unwrap();
        submit_split(miner.as_ref(), &utxo).await.unwrap();

        let report = wait_for_mempool(network.tanks(), 1, &convergence(10), &CancellationToken::new())
            .await
            .unwrap();
        assert!(report.all_reached());
        assert!(report.tolerated().is_empty());
        for id in 0..4 {
            assert_eq!(sim.mempool_size(id), 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_filtered_relay_is_tolerated() {
        let config = SimConfig {
            false_positive_rate: 1.0,
            ..SimConfig::ring(3)
        };
        let sim = SimNetwork::new(config).unwrap();
        let network = sim.network(0).unwrap();
        let miner = network.miner().handle.clone();

        let utxo = fund(miner.as_ref()).await.unwrap();
        submit_split(miner.as_ref(), &utxo).await.unwrap();

        // Both receivers drop the relay and sit at target − 1.
        let report = wait_for_mempool(network.tanks(), 1, &convergence(3), &CancellationToken::new())
            .await
            .unwrap();
        assert!(matches!(
            report.outcomes[&TankId(0)],
            TankOutcome::Reached { .. }
        ));
        assert_eq!(report.tolerated(), vec![TankId(1), TankId(2)]);
        assert_eq!(sim.mempool_size(1), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_filtered_relay_without_budget_times_out() {
        let config = SimConfig {
            false_positive_rate: 1.0,
            ..SimConfig::ring(3)
        };
        let sim = SimNetwork::new(config).unwrap();
        let network = sim.network(0).unwrap();
        let miner = network.miner().handle.clone();

        let utxo = fund(miner.as_ref()).await.unwrap();
        submit_split(miner.as_ref(), &utxo).await.unwrap();

        let config = ConvergenceConfig {
            stall_budget: 0,
            deadline: Some(Duration::from_secs(30)),
            ..Default::default()
        };
        let err = wait_for_mempool(network.tanks(), 1, &config, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BarrierError::Timeout { .. }));
    }

    // =========================================================================
    // TRAFFIC
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_capture_around_broadcast() {
        let sim = SimNetwork::new(SimConfig::ring(4)).unwrap();
        let network = sim.network(0).unwrap();
        let miner = network.miner().handle.clone();
        let utxo = fund(miner.as_ref()).await.unwrap();
        // Block announcements settle before the first snapshot.
        wait_for_height(
            &network.without(TankId(0)),
            MATURE_CHAIN,
            &BarrierConfig::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        let before = capture(network.tanks()).await.unwrap();
        assert!(TrafficDiff::between(&before, &before).is_zero());

        submit_split(miner.as_ref(), &utxo).await.unwrap();
        wait_for_mempool(network.tanks(), 1, &convergence(10), &CancellationToken::new())
            .await
            .unwrap();
        let after = capture(network.tanks()).await.unwrap();

        let diff = TrafficDiff::between(&before, &after);
        let sent_tx = diff.get(Direction::Sent, "tx");
        assert_eq!(sent_tx.count, 3);
        assert_eq!(diff.get(Direction::Recv, "tx").count, 3);
        assert!(diff.get(Direction::Sent, "inv").count >= 3);
        assert!(diff.only(Direction::Sent).inv_entry_estimate() >= 0);
    }
}
