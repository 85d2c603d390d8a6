// crates/meritrank-core/src/error.rs

use thiserror::Error;

use crate::graph::NodeId;

/// Error types for MeritRank computations.
///
/// A walk that reaches a node without neighbors is an expected termination
/// and has no variant here.
#[derive(Debug, Error)]
pub enum MeritRankError {
    /// The seed node is not part of the graph snapshot.
    #[error("Graph node not found: {0}")]
    GraphNodeNotFound(NodeId),

    /// The graph snapshot has no nodes to walk.
    #[error("Graph is empty")]
    EmptyGraph,

    /// Malformed walk counts or reset probabilities.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// The computation was cancelled before every walk completed.
    #[error("Computation cancelled after {completed_walks} of {requested_walks} walks")]
    Cancelled {
        completed_walks: u64,
        requested_walks: u64,
    },

    /// Invalid computation lifecycle transition.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for MeritRankError {
    fn from(e: serde_json::Error) -> Self {
        MeritRankError::Serialization(e.to_string())
    }
}
