// crates/meritrank-core/src/graph.rs
//
// In-memory provenance graph for MeritRank.
//
// Nodes are opaque identifiers (wallet addresses, token ids). Edges are
// undirected and carry one or more relation kinds, which the walk treats as
// unweighted. A graph is assembled with `GraphBuilder` and frozen into an
// `AdjacencyGraph` snapshot before any computation reads it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::traits::ProvenanceGraph;

/// Opaque, hashable node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a node identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The kind of relation an edge records between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Account created the token.
    Creator,
    /// Account currently owns the token.
    Owner,
    /// Any other relation supplied by the ingestion layer.
    Other(String),
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::Creator => write!(f, "creator"),
            RelationKind::Owner => write!(f, "owner"),
            RelationKind::Other(kind) => write!(f, "{}", kind),
        }
    }
}

/// Version label of a graph snapshot.
///
/// Cached reputation vectors are only valid for the version they were
/// computed against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphVersion(String);

impl GraphVersion {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GraphVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accumulates nodes and edges for a new snapshot.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,
    relations: BTreeMap<(NodeId, NodeId), BTreeSet<RelationKind>>,
}

impl GraphBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node without edges. Adding an existing node is a no-op.
    pub fn add_node(&mut self, node: impl Into<NodeId>) -> &mut Self {
        self.adjacency.entry(node.into()).or_default();
        self
    }

    /// Add an undirected edge between `a` and `b`.
    ///
    /// Repeated edges collapse into one adjacency entry that remembers every
    /// relation kind. A self-loop makes the node its own neighbor once.
    pub fn add_edge(
        &mut self,
        a: impl Into<NodeId>,
        b: impl Into<NodeId>,
        kind: RelationKind,
    ) -> &mut Self {
        let a = a.into();
        let b = b.into();
        self.adjacency.entry(a.clone()).or_default().insert(b.clone());
        self.adjacency.entry(b.clone()).or_default().insert(a.clone());
        self.relations
            .entry(edge_key(&a, &b))
            .or_default()
            .insert(kind);
        self
    }

    /// Freeze the builder into an immutable snapshot.
    pub fn build(self) -> AdjacencyGraph {
        let adjacency = self
            .adjacency
            .into_iter()
            .map(|(node, neighbors)| (node, neighbors.into_iter().collect()))
            .collect();
        let relations = self
            .relations
            .into_iter()
            .map(|(key, kinds)| (key, kinds.into_iter().collect()))
            .collect();
        AdjacencyGraph {
            adjacency,
            relations,
        }
    }
}

/// Immutable adjacency-list snapshot of a provenance graph.
///
/// Neighbor lists are sorted, so a seeded walk over the same snapshot is
/// reproducible.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyGraph {
    adjacency: BTreeMap<NodeId, Vec<NodeId>>,
    relations: BTreeMap<(NodeId, NodeId), Vec<RelationKind>>,
}

impl AdjacencyGraph {
    /// Relation kinds recorded between `a` and `b`, in either direction.
    pub fn relations(&self, a: &NodeId, b: &NodeId) -> &[RelationKind] {
        self.relations
            .get(&edge_key(a, b))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct undirected edges, self-loops included.
    pub fn edge_count(&self) -> usize {
        self.relations.len()
    }

    /// Number of neighbors of `node` (0 if unknown).
    pub fn degree(&self, node: &NodeId) -> usize {
        self.neighbors(node).len()
    }

    /// Derive a content-addressed version for this snapshot.
    ///
    /// SHA-256 over the sorted node list and the sorted edge list, so two
    /// snapshots with the same contents share a version regardless of the
    /// order they were built in.
    pub fn fingerprint(&self) -> GraphVersion {
        let mut hasher = Sha256::new();
        for node in self.adjacency.keys() {
            hasher.update(b"n:");
            hasher.update(node.as_str().as_bytes());
            hasher.update([0u8]);
        }
        for ((a, b), kinds) in &self.relations {
            hasher.update(b"e:");
            hasher.update(a.as_str().as_bytes());
            hasher.update([0u8]);
            hasher.update(b.as_str().as_bytes());
            for kind in kinds {
                hasher.update([0u8]);
                hasher.update(kind.to_string().as_bytes());
            }
            hasher.update([0u8]);
        }
        GraphVersion(hex::encode(hasher.finalize()))
    }
}

impl ProvenanceGraph for AdjacencyGraph {
    fn has_node(&self, node: &NodeId) -> bool {
        self.adjacency.contains_key(node)
    }

    fn neighbors(&self, node: &NodeId) -> &[NodeId] {
        self.adjacency
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn nodes(&self) -> Box<dyn Iterator<Item = &NodeId> + '_> {
        Box::new(self.adjacency.keys())
    }

    fn node_count(&self) -> usize {
        self.adjacency.len()
    }
}

/// Order-independent key for an undirected edge.
fn edge_key(a: &NodeId, b: &NodeId) -> (NodeId, NodeId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> NodeId {
        NodeId::from(s)
    }

    #[test]
    fn adjacency_is_symmetric() {
        let mut builder = GraphBuilder::new();
        builder.add_edge("alice", "token-1", RelationKind::Creator);
        let graph = builder.build();

        assert_eq!(graph.neighbors(&id("alice")), &[id("token-1")]);
        assert_eq!(graph.neighbors(&id("token-1")), &[id("alice")]);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn duplicate_edges_collapse_and_keep_relations() {
        let mut builder = GraphBuilder::new();
        builder
            .add_edge("alice", "token-1", RelationKind::Creator)
            .add_edge("token-1", "alice", RelationKind::Owner);
        let graph = builder.build();

        assert_eq!(graph.degree(&id("alice")), 1);
        assert_eq!(
            graph.relations(&id("token-1"), &id("alice")),
            &[RelationKind::Creator, RelationKind::Owner]
        );
    }

    #[test]
    fn self_loop_is_tolerated() {
        let mut builder = GraphBuilder::new();
        builder.add_edge("loop", "loop", RelationKind::Other("self".into()));
        let graph = builder.build();

        assert!(graph.has_node(&id("loop")));
        assert_eq!(graph.neighbors(&id("loop")), &[id("loop")]);
    }

    #[test]
    fn unknown_node_has_no_neighbors() {
        let graph = GraphBuilder::new().build();
        assert!(!graph.has_node(&id("ghost")));
        assert!(graph.neighbors(&id("ghost")).is_empty());
        assert!(graph.is_empty());
    }

    #[test]
    fn isolated_node_is_listed() {
        let mut builder = GraphBuilder::new();
        builder.add_node("hermit");
        let graph = builder.build();

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.nodes().collect::<Vec<_>>(), vec![&id("hermit")]);
    }

    #[test]
    fn neighbors_are_sorted() {
        let mut builder = GraphBuilder::new();
        builder
            .add_edge("hub", "c", RelationKind::Owner)
            .add_edge("hub", "a", RelationKind::Owner)
            .add_edge("hub", "b", RelationKind::Owner);
        let graph = builder.build();

        assert_eq!(graph.neighbors(&id("hub")), &[id("a"), id("b"), id("c")]);
    }

    #[test]
    fn fingerprint_ignores_insertion_order() {
        let mut first = GraphBuilder::new();
        first
            .add_edge("a", "b", RelationKind::Creator)
            .add_edge("b", "c", RelationKind::Owner);
        let mut second = GraphBuilder::new();
        second
            .add_edge("c", "b", RelationKind::Owner)
            .add_edge("b", "a", RelationKind::Creator);

        assert_eq!(first.build().fingerprint(), second.build().fingerprint());
    }

    #[test]
    fn fingerprint_changes_with_contents() {
        let mut first = GraphBuilder::new();
        first.add_edge("a", "b", RelationKind::Creator);
        let mut second = GraphBuilder::new();
        second.add_edge("a", "b", RelationKind::Owner);

        let v1 = first.build().fingerprint();
        let v2 = second.build().fingerprint();
        assert_ne!(v1, v2);
        assert_eq!(v1.as_str().len(), 64);
    }
}
