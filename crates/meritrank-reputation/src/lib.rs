// crates/meritrank-reputation/src/lib.rs
//
// meritrank-reputation: Signed random-walk reputation scoring for MeritRank.
//
// Trust is seed-relative: from a seed node, positive and negative walk
// batches are sampled independently, and every other node is scored by its
// share of positive visits minus its share of negative visits. Results are
// memoized per (graph version, seed, configuration).

pub mod cache;
pub mod combine;
pub mod engine;
pub mod state;
pub mod walks;

pub use cache::ScoreCache;
pub use combine::{score_event, score_event_with, CombinePolicy, EventCombiner};
pub use engine::{compute_reputation, ReputationEngine, ReputationVector, NEUTRAL_REPUTATION};
pub use state::{ComputationState, ComputationStateMachine};
pub use walks::{
    CancellationToken, HitCount, HitCounters, Polarity, WalkOutcome, WalkSimulator, WalkStats,
};
