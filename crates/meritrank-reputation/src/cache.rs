// crates/meritrank-reputation/src/cache.rs
//
// Memoized reputation vectors.
//
// A vector is valid for exactly one (graph version, seed, configuration)
// key. Invalidating, publishing a snapshot, or changing the walk settings
// or simulation options marks every cached vector stale; the next query
// for a stale seed recomputes it. Cancelled runs are never cached.

use std::collections::HashMap;
use std::sync::Arc;

use meritrank_core::{
    GraphVersion, MeritRankError, NodeId, ProvenanceGraph, SimulationOptions, WalkConfig,
    WalkSettings,
};

use crate::engine::{ReputationEngine, ReputationVector};
use crate::state::{ComputationState, ComputationStateMachine};
use crate::walks::CancellationToken;

/// Everything a cached vector depends on.
#[derive(Debug, Clone, PartialEq)]
struct CacheKey {
    version: GraphVersion,
    seed: NodeId,
    settings: WalkSettings,
    options: SimulationOptions,
}

#[derive(Debug)]
struct CacheEntry {
    key: CacheKey,
    state: ComputationStateMachine,
    vector: Option<ReputationVector>,
}

impl CacheEntry {
    fn new(key: CacheKey) -> Self {
        Self {
            key,
            state: ComputationStateMachine::new(),
            vector: None,
        }
    }

    fn is_fresh(&self, key: &CacheKey) -> bool {
        self.state.is_servable() && self.vector.is_some() && &self.key == key
    }

    fn mark_stale(&mut self) -> Result<(), MeritRankError> {
        self.vector = None;
        if self.state.current() != ComputationState::Stale {
            self.state.transition(ComputationState::Stale)?;
        }
        Ok(())
    }
}

/// Lazily computed, memoized reputation vectors over one graph snapshot.
pub struct ScoreCache<G: ProvenanceGraph + ?Sized> {
    graph: Arc<G>,
    version: GraphVersion,
    settings: WalkSettings,
    engine: ReputationEngine,
    entries: HashMap<NodeId, CacheEntry>,
}

impl<G: ProvenanceGraph + ?Sized> ScoreCache<G> {
    /// Create an empty cache over `graph`, known by `version`.
    pub fn new(
        graph: Arc<G>,
        version: GraphVersion,
        settings: WalkSettings,
        options: SimulationOptions,
    ) -> Self {
        Self {
            graph,
            version,
            settings,
            engine: ReputationEngine::new(options),
            entries: HashMap::new(),
        }
    }

    pub fn graph(&self) -> &Arc<G> {
        &self.graph
    }

    pub fn version(&self) -> &GraphVersion {
        &self.version
    }

    pub fn settings(&self) -> &WalkSettings {
        &self.settings
    }

    pub fn options(&self) -> &SimulationOptions {
        self.engine.options()
    }

    /// Reputation of `target` from `seed`'s point of view.
    ///
    /// Runs the walks only if no fresh vector exists for `seed`.
    pub fn compute(&mut self, seed: &NodeId, target: &NodeId) -> Result<f64, MeritRankError> {
        self.compute_cancellable(seed, target, &CancellationToken::new())
    }

    /// Like [`compute`](Self::compute), but stops if `cancel` fires. A
    /// cancelled run yields `MeritRankError::Cancelled` and caches nothing.
    pub fn compute_cancellable(
        &mut self,
        seed: &NodeId,
        target: &NodeId,
        cancel: &CancellationToken,
    ) -> Result<f64, MeritRankError> {
        let vector = self.vector_cancellable(seed, cancel)?;
        vector
            .get(target)
            .ok_or_else(|| MeritRankError::GraphNodeNotFound(target.clone()))
    }

    /// The full reputation vector for `seed`, computing it if needed.
    pub fn vector(&mut self, seed: &NodeId) -> Result<&ReputationVector, MeritRankError> {
        self.vector_cancellable(seed, &CancellationToken::new())
    }

    pub fn vector_cancellable(
        &mut self,
        seed: &NodeId,
        cancel: &CancellationToken,
    ) -> Result<&ReputationVector, MeritRankError> {
        let key = self.key_for(seed);
        let fresh = self
            .entries
            .get(seed)
            .map(|entry| entry.is_fresh(&key))
            .unwrap_or(false);

        if fresh {
            tracing::debug!(seed = %seed, "Serving cached reputation vector");
        } else {
            self.refresh(seed, key, cancel)?;
        }

        self.entries
            .get(seed)
            .and_then(|entry| entry.vector.as_ref())
            .ok_or_else(|| {
                MeritRankError::InvalidState(format!("no reputation vector cached for {}", seed))
            })
    }

    /// Drop every cached vector and adopt `graph_version` as current.
    /// Returns how many entries were marked stale.
    ///
    /// Labels say nothing about graph contents, so no entry survives, even
    /// one already computed under `graph_version`.
    pub fn invalidate(&mut self, graph_version: GraphVersion) -> Result<usize, MeritRankError> {
        let marked = self.mark_all_stale()?;
        tracing::info!(
            from = %self.version,
            to = %graph_version,
            stale = marked,
            "Score cache invalidated"
        );
        self.version = graph_version;
        Ok(marked)
    }

    /// Swap in a new graph snapshot and drop every cached vector.
    pub fn publish(&mut self, graph: Arc<G>, version: GraphVersion) -> Result<usize, MeritRankError> {
        self.graph = graph;
        self.invalidate(version)
    }

    /// Replace the walk settings. Every cached vector becomes stale if they
    /// differ from the current ones.
    pub fn set_settings(&mut self, settings: WalkSettings) -> Result<usize, MeritRankError> {
        if settings == self.settings {
            return Ok(0);
        }
        self.settings = settings;
        let marked = self.mark_all_stale()?;
        tracing::info!(stale = marked, "Score cache walk settings changed");
        Ok(marked)
    }

    /// Replace the simulation options, marking every cached vector stale if
    /// they differ.
    pub fn set_options(&mut self, options: SimulationOptions) -> Result<usize, MeritRankError> {
        if &options == self.engine.options() {
            return Ok(0);
        }
        self.engine = ReputationEngine::new(options);
        let marked = self.mark_all_stale()?;
        tracing::info!(stale = marked, "Score cache simulation options changed");
        Ok(marked)
    }

    /// Lifecycle state of the computation for `seed`, if one was started.
    pub fn state(&self, seed: &NodeId) -> Option<ComputationState> {
        self.entries.get(seed).map(|entry| entry.state.current())
    }

    /// Drop every stale entry. Returns how many were removed.
    pub fn evict_stale(&mut self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.state.current() != ComputationState::Stale);
        before - self.entries.len()
    }

    /// Number of cached entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key_for(&self, seed: &NodeId) -> CacheKey {
        CacheKey {
            version: self.version.clone(),
            seed: seed.clone(),
            settings: self.settings.clone(),
            options: *self.engine.options(),
        }
    }

    fn mark_all_stale(&mut self) -> Result<usize, MeritRankError> {
        let mut marked = 0;
        for entry in self.entries.values_mut() {
            if entry.state.current() != ComputationState::Stale {
                marked += 1;
            }
            entry.mark_stale()?;
        }
        Ok(marked)
    }

    /// Run walks and scoring for `seed`, storing the result on success.
    ///
    /// The entry is taken out of the map for the duration of the run. On
    /// failure a previously existing entry goes back as stale, and a seed
    /// that had no entry gets none.
    fn refresh(
        &mut self,
        seed: &NodeId,
        key: CacheKey,
        cancel: &CancellationToken,
    ) -> Result<(), MeritRankError> {
        let config = WalkConfig::from_settings(seed.clone(), &self.settings)?;
        let previous = self.entries.remove(seed);
        let existed = previous.is_some();
        let mut entry = previous.unwrap_or_else(|| CacheEntry::new(key.clone()));
        entry.state.restart()?;
        entry.vector = None;
        entry.key = key;

        match self.advance(&config, cancel, &mut entry) {
            Ok(()) => {
                self.entries.insert(seed.clone(), entry);
                Ok(())
            }
            Err(e) => {
                if existed {
                    entry.mark_stale()?;
                    self.entries.insert(seed.clone(), entry);
                }
                Err(e)
            }
        }
    }

    /// Walk, then score, moving `entry` through the lifecycle in between.
    fn advance(
        &self,
        config: &WalkConfig,
        cancel: &CancellationToken,
        entry: &mut CacheEntry,
    ) -> Result<(), MeritRankError> {
        let graph = self.graph.as_ref();
        let counters = self.engine.simulate(graph, config, cancel)?;
        entry.state.transition(ComputationState::WalksRun)?;

        let vector = self.engine.score(graph, &config.seed_node, &counters)?;
        entry.state.transition(ComputationState::ScoresComputed)?;
        tracing::debug!(seed = %config.seed_node, "Reputation vector cached");
        entry.vector = Some(vector);
        Ok(())
    }
}
