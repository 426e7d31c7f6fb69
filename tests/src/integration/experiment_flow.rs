//! # Experiment Flows
//!
//! Full tb-05 runs on simulated networks, checked from the outside through
//! the simulator's own view of every pending set and chain.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tb_01_topology::{generate, TopologyConfig};
    use tb_04_propagation::TracerKind;
    use tb_05_experiment::{Experiment, ExperimentConfig};
    use tb_sim::{SimConfig, SimNetwork};

    use crate::integration::fixtures::{connected, links};

    fn config(tx_count: usize, iterations: u32) -> ExperimentConfig {
        ExperimentConfig {
            tx_count,
            iterations,
            ..Default::default()
        }
    }

    /// Four tanks, four transactions, one iteration.
    #[tokio::test(start_paused = true)]
    async fn test_e2e_four_tanks() {
        let sim = SimNetwork::new(SimConfig::ring(4)).unwrap();
        let experiment = Experiment::new(sim.network(0).unwrap(), config(4, 1)).unwrap();

        let report = experiment.run().await.unwrap();

        for tank in 0..4 {
            assert_eq!(sim.mempool_size(tank), 4);
        }
        let inv = report.mean_inv_entries.unwrap();
        assert!(inv.is_finite() && inv >= 0.0);
        let seconds = report.mean_propagation_secs.unwrap();
        assert!(seconds.is_finite() && seconds >= 0.0);
        assert_eq!(report.per_iteration[0].traced, 3);
        assert_eq!(report.propagation_samples, 1);
        assert_eq!(report.precision_warnings, 0);
    }

    /// Random topology from tb-01, several iterations, every tank sending.
    #[tokio::test(start_paused = true)]
    async fn test_generated_topology_multiple_iterations() {
        let topology = TopologyConfig::new(8, 8, 2);
        // First seed whose graph is connected; relay needs a path to each tank.
        let graph = (0..64)
            .map(|seed| generate(&topology, &mut StdRng::seed_from_u64(seed)).unwrap())
            .find(connected)
            .unwrap();

        let sim = SimNetwork::new(SimConfig::with_links(links(&graph))).unwrap();
        let experiment = Experiment::new(sim.network(0).unwrap(), config(8, 2)).unwrap();

        let report = experiment.run().await.unwrap();

        assert_eq!(report.iterations, 2);
        assert_eq!(report.per_iteration.len(), 2);
        for summary in &report.per_iteration {
            assert_eq!(summary.submitted, 8);
            assert_eq!(summary.traced, 7);
        }
        // The second iteration's funding block confirmed the first batch.
        let height = sim.height(0);
        for tank in 0..8 {
            assert_eq!(sim.mempool_size(tank), 8);
            assert_eq!(sim.height(tank), height);
        }
        assert!(report.message_counts["inv"] > 0.0);
        assert!(report.message_bytes["tx"] > 0.0);
    }

    /// Both receivers drop the marked transaction's relay. Convergence
    /// tolerates them and the report flags the missing timestamps.
    #[tokio::test(start_paused = true)]
    async fn test_filtered_relay_reported_with_warning() {
        let sim = SimNetwork::new(SimConfig {
            false_positive_rate: 1.0,
            ..SimConfig::ring(3)
        })
        .unwrap();
        let mut settings = config(1, 1);
        settings.convergence.stall_budget = 3;
        let experiment = Experiment::new(sim.network(0).unwrap(), settings).unwrap();

        let report = experiment.run().await.unwrap();

        assert_eq!(sim.mempool_size(0), 1);
        assert_eq!(sim.mempool_size(1), 0);
        assert_eq!(sim.mempool_size(2), 0);
        let summary = &report.per_iteration[0];
        assert_eq!(summary.traced, 2);
        assert_eq!(summary.announcements, 0);
        assert_eq!(summary.acceptances, 0);
        assert_eq!(report.precision_warnings, 1);
        assert_eq!(report.propagation_samples, 0);
        assert!(report.mean_inv_entries.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_log_tracer_matches_state_tracer() {
        let mut samples = Vec::new();
        for tracer in [TracerKind::State, TracerKind::Log] {
            let sim = SimNetwork::new(SimConfig::ring(5)).unwrap();
            let mut settings = config(5, 1);
            settings.tracer = tracer;
            settings.log_linger = Duration::from_millis(200);
            let experiment = Experiment::new(sim.network(0).unwrap(), settings).unwrap();

            let report = experiment.run().await.unwrap();
            let summary = &report.per_iteration[0];
            assert_eq!(summary.traced, 4, "{tracer}");
            assert_eq!(summary.acceptances, 4, "{tracer}");
            samples.push(report.mean_propagation_secs.unwrap());
        }
        // Both read the same simulated clock.
        assert!(samples.iter().all(|secs| secs.is_finite() && *secs >= 0.0));
    }
}
