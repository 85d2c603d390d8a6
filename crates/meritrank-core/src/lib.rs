// crates/meritrank-core/src/lib.rs
//
// meritrank-core: Core types and traits for MeritRank reputation scoring.
//
// This is the leaf crate that the rest of the workspace depends on.
// It defines node identifiers, the read-only graph capability trait and its
// in-memory adapter, walk configuration, and the error taxonomy.

pub mod config;
pub mod error;
pub mod graph;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use meritrank_core::NodeId;`

// Graph types
pub use graph::{AdjacencyGraph, GraphBuilder, GraphVersion, NodeId, RelationKind};

// Configuration types
pub use config::{SimulationOptions, WalkConfig, WalkSettings};

// Error type
pub use error::MeritRankError;

// Traits
pub use traits::ProvenanceGraph;
