// crates/meritrank-core/src/traits.rs

use crate::graph::NodeId;

/// Read-only view of a provenance graph.
///
/// Any representation (adjacency list, adjacency map, external store) can
/// back a computation as long as it answers these queries. Implementations
/// must present a closed snapshot: the answers may not change while a
/// computation holds a reference. Adjacency is expected to be symmetric.
///
/// Implemented by `AdjacencyGraph` in this crate.
pub trait ProvenanceGraph: Send + Sync {
    /// Whether `node` is part of the graph.
    fn has_node(&self, node: &NodeId) -> bool;

    /// Neighbors of `node`. Empty if the node is unknown or isolated.
    ///
    /// The order must be stable for a given snapshot so that a seeded
    /// random source reproduces the same walks.
    fn neighbors(&self, node: &NodeId) -> &[NodeId];

    /// Iterate over every node in the graph.
    fn nodes(&self) -> Box<dyn Iterator<Item = &NodeId> + '_>;

    /// Number of nodes in the graph.
    fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// Whether the graph has no nodes at all.
    fn is_empty(&self) -> bool {
        self.node_count() == 0
    }
}
