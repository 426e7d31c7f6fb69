//! # Topology Flow
//!
//! A generated topology is written as the network document, read back, and
//! wired into a simulated network whose tanks then pass the connectivity
//! barrier with exactly the generated fan-out.

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shared_types::TankId;
    use tb_01_topology::{check_all_invariants, generate, NetworkDocument, TopologyConfig};
    use tb_02_sync_barrier::{wait_for_connectivity, BarrierConfig};
    use tb_sim::{SimConfig, SimNetwork};
    use tokio_util::sync::CancellationToken;

    use crate::integration::fixtures::links;

    #[test]
    fn test_document_round_trips_through_yaml_file() {
        let config = TopologyConfig::new(12, 8, 3);
        let graph = generate(&config, &mut StdRng::seed_from_u64(7)).unwrap();
        check_all_invariants(&graph, &config).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.yaml");
        NetworkDocument::from_graph(&graph).write_to(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let document: NetworkDocument = serde_yaml::from_str(&text).unwrap();
        assert_eq!(document.nodes.len(), 12);
        assert!(!document.caddy.enabled);
        assert!(!document.fork_observer.enabled);

        for (node, entry) in document.nodes.iter().enumerate() {
            assert_eq!(entry.name, TankId(node).to_string());
            let expected: Vec<String> = graph
                .outbound(node)
                .iter()
                .map(|peer| TankId(*peer).to_string())
                .collect();
            assert_eq!(entry.addnode, expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_generated_links_pass_connectivity() {
        let config = TopologyConfig::new(8, 8, 2);
        let graph = generate(&config, &mut StdRng::seed_from_u64(11)).unwrap();

        let sim = SimNetwork::new(SimConfig::with_links(links(&graph))).unwrap();
        let network = sim.network(0).unwrap();
        for tank in network.tanks() {
            assert_eq!(tank.init_peers, 2);
        }

        let report = wait_for_connectivity(
            network.tanks(),
            &BarrierConfig::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(report.len(), 8);
        assert!(report.all_reached());
    }
}
