//! Structural invariants of a generated topology.

use super::{TopologyConfig, TopologyGraph};

/// INVARIANT-1: every node of the network is present.
pub fn invariant_covers_network(graph: &TopologyGraph, config: &TopologyConfig) -> bool {
    graph.len() == config.size
}

/// INVARIANT-2: every node opens exactly `outbound` connections.
pub fn invariant_fan_out(graph: &TopologyGraph, config: &TopologyConfig) -> bool {
    (0..graph.len()).all(|node| graph.outbound(node).len() == config.outbound)
}

/// INVARIANT-3: peers come from the reachable prefix.
pub fn invariant_reachable_peers(graph: &TopologyGraph, config: &TopologyConfig) -> bool {
    (0..graph.len()).all(|node| {
        graph
            .outbound(node)
            .iter()
            .all(|peer| *peer < config.reachable)
    })
}

/// INVARIANT-4: no node connects to itself.
pub fn invariant_no_self_loop(graph: &TopologyGraph) -> bool {
    (0..graph.len()).all(|node| !graph.outbound(node).contains(&node))
}

/// INVARIANT-5: at most one connection per pair, in either direction.
pub fn invariant_unique_pairs(graph: &TopologyGraph) -> bool {
    (0..graph.len()).all(|node| {
        let peers = graph.outbound(node);
        peers.iter().enumerate().all(|(i, peer)| {
            !peers[..i].contains(peer) && !graph.has_edge(*peer, node)
        })
    })
}

#[derive(Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    WrongNodeCount,
    WrongFanOut,
    UnreachablePeer,
    SelfLoop,
    DuplicatePair,
}

/// Check every invariant, reporting the first violation.
pub fn check_all_invariants(
    graph: &TopologyGraph,
    config: &TopologyConfig,
) -> Result<(), InvariantViolation> {
    if !invariant_covers_network(graph, config) {
        return Err(InvariantViolation::WrongNodeCount);
    }
    if !invariant_fan_out(graph, config) {
        return Err(InvariantViolation::WrongFanOut);
    }
    if !invariant_reachable_peers(graph, config) {
        return Err(InvariantViolation::UnreachablePeer);
    }
    if !invariant_no_self_loop(graph) {
        return Err(InvariantViolation::SelfLoop);
    }
    if !invariant_unique_pairs(graph) {
        return Err(InvariantViolation::DuplicatePair);
    }
    Ok(())
}
