//! The generated outbound-link graph.

use shared_types::TankId;

/// Node index → ordered list of outbound peer indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopologyGraph {
    outbound: Vec<Vec<usize>>,
}

impl TopologyGraph {
    pub(crate) fn from_adjacency(outbound: Vec<Vec<usize>>) -> Self {
        Self { outbound }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.outbound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outbound.is_empty()
    }

    /// Outbound peers of `node`, in the order they were drawn.
    pub fn outbound(&self, node: usize) -> &[usize] {
        &self.outbound[node]
    }

    /// Whether `from` opens a connection to `to`.
    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.outbound
            .get(from)
            .is_some_and(|peers| peers.contains(&to))
    }

    /// Total number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.outbound.iter().map(Vec::len).sum()
    }

    /// Nodes with their peers, by tank name.
    pub fn named_entries(&self) -> impl Iterator<Item = (String, Vec<String>)> + '_ {
        self.outbound.iter().enumerate().map(|(node, peers)| {
            (
                TankId(node).to_string(),
                peers.iter().map(|peer| TankId(*peer).to_string()).collect(),
            )
        })
    }
}
