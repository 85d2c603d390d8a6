// crates/meritrank-reputation/src/engine.rs
//
// Reputation scoring from walk hit counters.
//
// For every node other than the seed:
//   reputation = positive_hits / total_positive - negative_hits / total_negative
// where each total sums that polarity's hits over all non-seed nodes and is
// floored at 1. Both shares lie in [0, 1], so the score lies in [-1, 1].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use meritrank_core::{MeritRankError, NodeId, ProvenanceGraph, SimulationOptions, WalkConfig};

use crate::walks::{CancellationToken, HitCounters, WalkSimulator};

/// Score given to the seed itself and to nodes no walk reached.
pub const NEUTRAL_REPUTATION: f64 = 0.0;

/// Seed-relative reputation of every node in a graph snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationVector {
    seed: NodeId,
    scores: HashMap<NodeId, f64>,
}

impl ReputationVector {
    /// The node whose point of view these scores represent.
    pub fn seed(&self) -> &NodeId {
        &self.seed
    }

    /// Reputation of `node`, or `None` if it was not in the graph.
    pub fn get(&self, node: &NodeId) -> Option<f64> {
        self.scores.get(node).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, f64)> {
        self.scores.iter().map(|(node, score)| (node, *score))
    }

    /// Nodes sorted by descending reputation, ties broken by node id.
    pub fn ranked(&self) -> Vec<(&NodeId, f64)> {
        let mut ranked: Vec<(&NodeId, f64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Fold hit counters into a reputation vector.
///
/// Every node of `graph` gets an entry. The seed is pinned to
/// [`NEUTRAL_REPUTATION`], and so is any node no walk visited.
pub fn compute_reputation<G>(
    graph: &G,
    seed: &NodeId,
    counters: &HitCounters,
) -> Result<ReputationVector, MeritRankError>
where
    G: ProvenanceGraph + ?Sized,
{
    if !graph.has_node(seed) {
        return Err(MeritRankError::GraphNodeNotFound(seed.clone()));
    }
    if counters.seed() != seed {
        return Err(MeritRankError::InvalidState(format!(
            "hit counters were collected for seed {}, not {}",
            counters.seed(),
            seed
        )));
    }

    let total_positive = counters.positive_total_excluding_seed().max(1) as f64;
    let total_negative = counters.negative_total_excluding_seed().max(1) as f64;

    let scores = graph
        .nodes()
        .map(|node| {
            if node == seed {
                return (node.clone(), NEUTRAL_REPUTATION);
            }
            let hits = counters.get_hits(seed, node);
            let pos_score = hits.positive as f64 / total_positive;
            let neg_score = hits.negative as f64 / total_negative;
            (node.clone(), pos_score - neg_score)
        })
        .collect();

    Ok(ReputationVector {
        seed: seed.clone(),
        scores,
    })
}

/// Runs walks and scores their results with fixed simulation options.
///
/// The pipeline has two steps, [`simulate`](Self::simulate) and
/// [`score`](Self::score). [`evaluate`](Self::evaluate) chains them; the
/// score cache drives them one at a time to track its lifecycle state.
#[derive(Debug, Clone, Default)]
pub struct ReputationEngine {
    simulator: WalkSimulator,
}

impl ReputationEngine {
    pub fn new(options: SimulationOptions) -> Self {
        Self {
            simulator: WalkSimulator::new(options),
        }
    }

    pub fn simulator(&self) -> &WalkSimulator {
        &self.simulator
    }

    pub fn options(&self) -> &SimulationOptions {
        self.simulator.options()
    }

    /// Compute the reputation vector of `config.seed_node` over `graph`.
    pub fn evaluate<G>(&self, graph: &G, config: &WalkConfig) -> Result<ReputationVector, MeritRankError>
    where
        G: ProvenanceGraph + ?Sized,
    {
        self.evaluate_cancellable(graph, config, &CancellationToken::new())
    }

    /// Like [`evaluate`](Self::evaluate), but fails with
    /// `MeritRankError::Cancelled` instead of scoring a partial sample.
    pub fn evaluate_cancellable<G>(
        &self,
        graph: &G,
        config: &WalkConfig,
        cancel: &CancellationToken,
    ) -> Result<ReputationVector, MeritRankError>
    where
        G: ProvenanceGraph + ?Sized,
    {
        let counters = self.simulate(graph, config, cancel)?;
        self.score(graph, &config.seed_node, &counters)
    }

    /// Run every configured walk. A cancelled run is an error; its partial
    /// counters are discarded.
    pub fn simulate<G>(
        &self,
        graph: &G,
        config: &WalkConfig,
        cancel: &CancellationToken,
    ) -> Result<HitCounters, MeritRankError>
    where
        G: ProvenanceGraph + ?Sized,
    {
        let outcome = self.simulator.run_walks_cancellable(graph, config, cancel)?;
        if outcome.cancelled {
            return Err(MeritRankError::Cancelled {
                completed_walks: outcome.completed_walks(),
                requested_walks: config.total_walks(),
            });
        }
        Ok(outcome.counters)
    }

    /// Fold `counters` into the reputation vector of `seed`.
    pub fn score<G>(
        &self,
        graph: &G,
        seed: &NodeId,
        counters: &HitCounters,
    ) -> Result<ReputationVector, MeritRankError>
    where
        G: ProvenanceGraph + ?Sized,
    {
        let vector = compute_reputation(graph, seed, counters)?;
        tracing::info!(
            seed = %seed,
            nodes = vector.len(),
            hits = counters.positive_total_excluding_seed()
                + counters.negative_total_excluding_seed(),
            "Reputation computed"
        );
        Ok(vector)
    }
}
