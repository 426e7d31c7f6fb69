//! Rejection-sampling generator.

use rand::Rng;
use tracing::debug;

use super::{TopologyConfig, TopologyGraph};
use crate::errors::TopologyError;

/// Full redraws tried before giving up.
pub const MAX_ATTEMPTS: usize = 64;

/// Generate a graph for `config`.
///
/// Each node in turn samples candidates from `[0, reachable)` until it holds
/// `outbound` admissible peers. Nodes that already point at the current node
/// are not admissible, so a node late in the order may be left with too few
/// candidates; such an attempt is dropped and the whole graph redrawn.
pub fn generate<R: Rng + ?Sized>(
    config: &TopologyConfig,
    rng: &mut R,
) -> Result<TopologyGraph, TopologyError> {
    config.validate()?;

    for attempt in 1..=MAX_ATTEMPTS {
        if let Some(graph) = try_generate(config, rng) {
            debug!(attempt, edges = graph.edge_count(), "Topology generated");
            return Ok(graph);
        }
        debug!(attempt, "Candidates exhausted, redrawing topology");
    }

    Err(TopologyError::Unsatisfiable {
        attempts: MAX_ATTEMPTS,
        size: config.size,
        reachable: config.reachable,
        outbound: config.outbound,
    })
}

fn try_generate<R: Rng + ?Sized>(config: &TopologyConfig, rng: &mut R) -> Option<TopologyGraph> {
    let mut outbound: Vec<Vec<usize>> = vec![Vec::with_capacity(config.outbound); config.size];

    for node in 0..config.size {
        // Other nodes' lists are frozen while this one fills, so the
        // admissible set only shrinks by what this node picks.
        let admissible = (0..config.reachable)
            .filter(|&candidate| is_admissible(&outbound, node, candidate))
            .count();
        if admissible < config.outbound {
            return None;
        }

        while outbound[node].len() < config.outbound {
            let candidate = rng.gen_range(0..config.reachable);
            if is_admissible(&outbound, node, candidate) {
                outbound[node].push(candidate);
            }
        }
    }

    Some(TopologyGraph::from_adjacency(outbound))
}

/// Not itself, not a duplicate, not a mirror of an existing edge.
fn is_admissible(outbound: &[Vec<usize>], node: usize, candidate: usize) -> bool {
    candidate != node
        && !outbound[node].contains(&candidate)
        && !outbound[candidate].contains(&node)
}
