// crates/meritrank-reputation/src/walks.rs
//
// Monte-Carlo walk simulation for MeritRank.
//
// From a seed node, each walk repeatedly either terminates (with the reset
// probability of its polarity) or steps to a uniformly chosen neighbor,
// counting a hit on every node it steps onto. Positive and negative walks
// are sampled independently with their own counts and reset probabilities.
//
// Parallel runs split each polarity into fixed-size batches. Every batch
// draws from its own random stream derived from the master seed, workers
// fold batches into private counter tables, and the tables are merged by
// summation. Batch layout does not depend on the worker count, so results
// are identical for any number of workers.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use meritrank_core::{MeritRankError, NodeId, ProvenanceGraph, SimulationOptions, WalkConfig};

/// Walks per batch. Fixed so that random streams do not depend on scheduling.
pub const WALKS_PER_BATCH: u64 = 64;

/// Steps a single walk takes between cancellation checks.
pub const CANCEL_CHECK_STEPS: u64 = 1024;

/// Which walk regime a hit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    /// Reward propagation.
    Positive,
    /// Distrust propagation.
    Negative,
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Positive => write!(f, "positive"),
            Polarity::Negative => write!(f, "negative"),
        }
    }
}

/// Visits to one target node, per polarity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitCount {
    pub positive: u64,
    pub negative: u64,
}

impl HitCount {
    /// Hits recorded for `polarity`.
    pub fn get(&self, polarity: Polarity) -> u64 {
        match polarity {
            Polarity::Positive => self.positive,
            Polarity::Negative => self.negative,
        }
    }

    fn increment(&mut self, polarity: Polarity) {
        match polarity {
            Polarity::Positive => self.positive += 1,
            Polarity::Negative => self.negative += 1,
        }
    }

    fn add(&mut self, other: &HitCount) {
        self.positive += other.positive;
        self.negative += other.negative;
    }
}

/// Per-target visitation counters for walks started from one seed.
///
/// Created fresh for every computation; counters for different seeds are
/// never mixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitCounters {
    seed: NodeId,
    hits: HashMap<NodeId, HitCount>,
}

impl HitCounters {
    /// Empty counters for walks from `seed`.
    pub fn new(seed: NodeId) -> Self {
        Self {
            seed,
            hits: HashMap::new(),
        }
    }

    /// The seed these counters were collected for.
    pub fn seed(&self) -> &NodeId {
        &self.seed
    }

    /// Hits on `target` by walks from `seed`.
    ///
    /// Zero when `seed` is not the seed these counters belong to, or when
    /// `target` was never visited.
    pub fn get_hits(&self, seed: &NodeId, target: &NodeId) -> HitCount {
        if seed != &self.seed {
            return HitCount::default();
        }
        self.hits(target)
    }

    /// Hits on `target` by walks from this counter set's seed.
    pub fn hits(&self, target: &NodeId) -> HitCount {
        self.hits.get(target).copied().unwrap_or_default()
    }

    /// Record one step onto `target`.
    pub fn record(&mut self, target: &NodeId, polarity: Polarity) {
        match self.hits.get_mut(target) {
            Some(count) => count.increment(polarity),
            None => {
                let mut count = HitCount::default();
                count.increment(polarity);
                self.hits.insert(target.clone(), count);
            }
        }
    }

    /// Sum of `polarity` hits over every target except the seed itself.
    pub fn total_excluding_seed(&self, polarity: Polarity) -> u64 {
        self.hits
            .iter()
            .filter(|(node, _)| *node != &self.seed)
            .map(|(_, count)| count.get(polarity))
            .sum()
    }

    /// Sum of positive hits on every target except the seed.
    pub fn positive_total_excluding_seed(&self) -> u64 {
        self.total_excluding_seed(Polarity::Positive)
    }

    /// Sum of negative hits on every target except the seed.
    pub fn negative_total_excluding_seed(&self) -> u64 {
        self.total_excluding_seed(Polarity::Negative)
    }

    /// Add another table collected for the same seed into this one.
    pub fn merge(&mut self, other: HitCounters) -> Result<(), MeritRankError> {
        if other.seed != self.seed {
            return Err(MeritRankError::InvalidState(format!(
                "cannot merge hit counters for seed {} into counters for seed {}",
                other.seed, self.seed
            )));
        }
        for (node, count) in other.hits {
            self.hits.entry(node).or_default().add(&count);
        }
        Ok(())
    }

    /// Iterate over every visited target and its counts.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &HitCount)> {
        self.hits.iter()
    }

    /// Number of distinct visited targets.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Whether no walk visited any node.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Counters describing how walks ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkStats {
    /// Total steps taken (one hit each).
    pub steps: u64,
    /// Walks that stopped on a node without neighbors.
    pub dead_ends: u64,
}

impl WalkStats {
    fn add(&mut self, other: &WalkStats) {
        self.steps += other.steps;
        self.dead_ends += other.dead_ends;
    }
}

/// Result of a possibly cancelled simulation.
#[derive(Debug, Clone)]
pub struct WalkOutcome {
    pub counters: HitCounters,
    pub positive_completed: u64,
    pub negative_completed: u64,
    pub stats: WalkStats,
    /// Set when cancellation stopped the run before every walk finished.
    /// The counters then hold a partial, lower-confidence sample.
    pub cancelled: bool,
}

impl WalkOutcome {
    /// Walks that ran to termination across both polarities.
    pub fn completed_walks(&self) -> u64 {
        self.positive_completed + self.negative_completed
    }
}

/// Shared flag used to stop a running simulation.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Runs signed random walks over a graph snapshot.
///
/// A simulator with `workers == 0` runs on rayon's global pool. Otherwise it
/// builds a dedicated pool once and reuses it for every run.
#[derive(Debug, Clone, Default)]
pub struct WalkSimulator {
    options: SimulationOptions,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl WalkSimulator {
    pub fn new(options: SimulationOptions) -> Self {
        let pool = match options.workers {
            0 => None,
            workers => match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
                Ok(pool) => Some(Arc::new(pool)),
                Err(e) => {
                    tracing::warn!(
                        workers,
                        "Could not build walk worker pool: {}. Using the global pool.",
                        e
                    );
                    None
                }
            },
        };
        Self { options, pool }
    }

    pub fn options(&self) -> &SimulationOptions {
        &self.options
    }

    /// Run every configured walk from `config.seed_node` in parallel.
    pub fn run_walks<G>(&self, graph: &G, config: &WalkConfig) -> Result<HitCounters, MeritRankError>
    where
        G: ProvenanceGraph + ?Sized,
    {
        let outcome = self.run_walks_cancellable(graph, config, &CancellationToken::new())?;
        Ok(outcome.counters)
    }

    /// Run every configured walk, stopping early if `cancel` fires.
    ///
    /// A cancelled run still returns `Ok` with the walks that completed;
    /// callers decide whether a partial sample is usable.
    pub fn run_walks_cancellable<G>(
        &self,
        graph: &G,
        config: &WalkConfig,
        cancel: &CancellationToken,
    ) -> Result<WalkOutcome, MeritRankError>
    where
        G: ProvenanceGraph + ?Sized,
    {
        preflight(graph, config)?;

        let batches = plan_batches(config);
        tracing::debug!(
            seed = %config.seed_node,
            positive_walks = config.positive_walk_count,
            negative_walks = config.negative_walk_count,
            batches = batches.len(),
            workers = self.options.workers,
            "Starting walk simulation"
        );

        let master_seed = self.options.master_seed;
        let seed = &config.seed_node;
        let simulate = || {
            batches
                .par_iter()
                .fold(
                    || WorkerTable::new(seed.clone()),
                    |mut table, batch| {
                        table.run_batch(graph, config, master_seed, batch, cancel);
                        table
                    },
                )
                .reduce(|| WorkerTable::new(seed.clone()), WorkerTable::merge)
        };
        let partial = match &self.pool {
            Some(pool) => pool.install(simulate),
            None => simulate(),
        };
        let outcome = partial.into_outcome()?;

        if outcome.cancelled {
            tracing::warn!(
                seed = %config.seed_node,
                completed = outcome.completed_walks(),
                requested = config.total_walks(),
                "Walk simulation cancelled"
            );
        } else {
            tracing::debug!(
                seed = %config.seed_node,
                steps = outcome.stats.steps,
                dead_ends = outcome.stats.dead_ends,
                targets = outcome.counters.len(),
                "Walk simulation finished"
            );
        }
        Ok(outcome)
    }

    /// Run every configured walk on the calling thread with the given
    /// random source.
    ///
    /// Positive walks run first, then negative walks, all drawing from `rng`.
    pub fn run_walks_with_rng<G, R>(
        graph: &G,
        config: &WalkConfig,
        rng: &mut R,
    ) -> Result<HitCounters, MeritRankError>
    where
        G: ProvenanceGraph + ?Sized,
        R: Rng + ?Sized,
    {
        preflight(graph, config)?;

        let never = CancellationToken::new();
        let mut counters = HitCounters::new(config.seed_node.clone());
        let mut stats = WalkStats::default();
        for polarity in [Polarity::Positive, Polarity::Negative] {
            let (count, reset_probability) = polarity_params(config, polarity);
            for _ in 0..count {
                walk_once(
                    graph,
                    &config.seed_node,
                    reset_probability,
                    polarity,
                    rng,
                    &never,
                    &mut counters,
                    &mut stats,
                );
            }
        }
        Ok(counters)
    }
}

/// Reject bad configuration and unusable graphs before any walk starts.
fn preflight<G>(graph: &G, config: &WalkConfig) -> Result<(), MeritRankError>
where
    G: ProvenanceGraph + ?Sized,
{
    config.validate()?;
    if graph.is_empty() {
        return Err(MeritRankError::EmptyGraph);
    }
    if !graph.has_node(&config.seed_node) {
        return Err(MeritRankError::GraphNodeNotFound(config.seed_node.clone()));
    }
    Ok(())
}

fn polarity_params(config: &WalkConfig, polarity: Polarity) -> (u64, f64) {
    match polarity {
        Polarity::Positive => (
            config.positive_walk_count,
            config.positive_reset_probability,
        ),
        Polarity::Negative => (
            config.negative_walk_count,
            config.negative_reset_probability,
        ),
    }
}

/// One walk from `seed`. Ends on reset or on a node without neighbors.
///
/// Returns `false` if `cancel` fired mid-walk. It is polled every
/// [`CANCEL_CHECK_STEPS`] steps.
#[allow(clippy::too_many_arguments)]
fn walk_once<G, R>(
    graph: &G,
    seed: &NodeId,
    reset_probability: f64,
    polarity: Polarity,
    rng: &mut R,
    cancel: &CancellationToken,
    counters: &mut HitCounters,
    stats: &mut WalkStats,
) -> bool
where
    G: ProvenanceGraph + ?Sized,
    R: Rng + ?Sized,
{
    let mut current = seed;
    let mut taken: u64 = 0;
    loop {
        if rng.gen::<f64>() < reset_probability {
            return true;
        }
        let Some(next) = graph.neighbors(current).choose(rng) else {
            stats.dead_ends += 1;
            return true;
        };
        counters.record(next, polarity);
        stats.steps += 1;
        current = next;

        taken += 1;
        if taken % CANCEL_CHECK_STEPS == 0 && cancel.is_cancelled() {
            return false;
        }
    }
}

/// A contiguous run of walks sharing one random stream.
#[derive(Debug, Clone, Copy)]
struct Batch {
    polarity: Polarity,
    index: u64,
    walks: u64,
}

fn plan_batches(config: &WalkConfig) -> Vec<Batch> {
    let mut batches = Vec::new();
    for polarity in [Polarity::Positive, Polarity::Negative] {
        let (count, _) = polarity_params(config, polarity);
        let mut index = 0;
        let mut remaining = count;
        while remaining > 0 {
            let walks = remaining.min(WALKS_PER_BATCH);
            batches.push(Batch {
                polarity,
                index,
                walks,
            });
            remaining -= walks;
            index += 1;
        }
    }
    batches
}

/// Seed of the random stream for one batch.
fn stream_seed(master_seed: u64, polarity: Polarity, batch_index: u64) -> u64 {
    let lane = match polarity {
        Polarity::Positive => 0,
        Polarity::Negative => 1,
    };
    splitmix64(master_seed ^ splitmix64((batch_index << 1) | lane))
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Private accumulator owned by one worker.
struct WorkerTable {
    counters: HitCounters,
    positive_completed: u64,
    negative_completed: u64,
    stats: WalkStats,
    cancelled: bool,
    // Set if a merge saw counters for a different seed.
    merge_error: Option<MeritRankError>,
}

impl WorkerTable {
    fn new(seed: NodeId) -> Self {
        Self {
            counters: HitCounters::new(seed),
            positive_completed: 0,
            negative_completed: 0,
            stats: WalkStats::default(),
            cancelled: false,
            merge_error: None,
        }
    }

    fn run_batch<G>(
        &mut self,
        graph: &G,
        config: &WalkConfig,
        master_seed: u64,
        batch: &Batch,
        cancel: &CancellationToken,
    ) where
        G: ProvenanceGraph + ?Sized,
    {
        let (_, reset_probability) = polarity_params(config, batch.polarity);
        let mut rng = StdRng::seed_from_u64(stream_seed(master_seed, batch.polarity, batch.index));
        for _ in 0..batch.walks {
            if cancel.is_cancelled() {
                self.cancelled = true;
                return;
            }
            let finished = walk_once(
                graph,
                &config.seed_node,
                reset_probability,
                batch.polarity,
                &mut rng,
                cancel,
                &mut self.counters,
                &mut self.stats,
            );
            if !finished {
                self.cancelled = true;
                return;
            }
            match batch.polarity {
                Polarity::Positive => self.positive_completed += 1,
                Polarity::Negative => self.negative_completed += 1,
            }
        }
    }

    fn merge(mut self, other: WorkerTable) -> WorkerTable {
        if self.merge_error.is_none() {
            self.merge_error = other.merge_error;
        }
        if let Err(e) = self.counters.merge(other.counters) {
            self.merge_error.get_or_insert(e);
        }
        self.positive_completed += other.positive_completed;
        self.negative_completed += other.negative_completed;
        self.stats.add(&other.stats);
        self.cancelled |= other.cancelled;
        self
    }

    fn into_outcome(self) -> Result<WalkOutcome, MeritRankError> {
        if let Some(e) = self.merge_error {
            return Err(e);
        }
        Ok(WalkOutcome {
            counters: self.counters,
            positive_completed: self.positive_completed,
            negative_completed: self.negative_completed,
            stats: self.stats,
            cancelled: self.cancelled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meritrank_core::{AdjacencyGraph, GraphBuilder, RelationKind};

    fn id(s: &str) -> NodeId {
        NodeId::from(s)
    }

    fn path_graph() -> AdjacencyGraph {
        let mut builder = GraphBuilder::new();
        builder
            .add_edge("seed", "a", RelationKind::Creator)
            .add_edge("a", "b", RelationKind::Owner);
        builder.build()
    }

    fn config(positive: u64, negative: u64) -> WalkConfig {
        WalkConfig {
            seed_node: id("seed"),
            positive_walk_count: positive,
            positive_reset_probability: 0.5,
            negative_walk_count: negative,
            negative_reset_probability: 0.5,
        }
    }

    fn options(workers: usize) -> SimulationOptions {
        SimulationOptions {
            master_seed: 42,
            workers,
        }
    }

    #[test]
    fn counts_are_keyed_by_visited_node() {
        let graph = path_graph();
        let mut rng = StdRng::seed_from_u64(7);
        let counters =
            WalkSimulator::run_walks_with_rng(&graph, &config(500, 0), &mut rng).unwrap();

        assert!(counters.hits(&id("a")).positive > 0);
        assert!(counters.hits(&id("b")).positive > 0);
        assert!(counters.hits(&id("a")).positive > counters.hits(&id("b")).positive);
        assert_eq!(counters.hits(&id("a")).negative, 0);
    }

    #[test]
    fn get_hits_for_other_seed_is_zero() {
        let graph = path_graph();
        let mut rng = StdRng::seed_from_u64(7);
        let counters =
            WalkSimulator::run_walks_with_rng(&graph, &config(100, 100), &mut rng).unwrap();

        assert_eq!(counters.get_hits(&id("b"), &id("a")), HitCount::default());
        assert_eq!(counters.get_hits(&id("seed"), &id("a")), counters.hits(&id("a")));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let graph = path_graph();
        let first = WalkSimulator::run_walks_with_rng(
            &graph,
            &config(300, 200),
            &mut StdRng::seed_from_u64(99),
        )
        .unwrap();
        let second = WalkSimulator::run_walks_with_rng(
            &graph,
            &config(300, 200),
            &mut StdRng::seed_from_u64(99),
        )
        .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn parallel_results_independent_of_worker_count() {
        let graph = path_graph();
        let cfg = config(1000, 700);
        let one = WalkSimulator::new(options(1)).run_walks(&graph, &cfg).unwrap();
        let four = WalkSimulator::new(options(4)).run_walks(&graph, &cfg).unwrap();
        let seven = WalkSimulator::new(options(7)).run_walks(&graph, &cfg).unwrap();
        assert_eq!(one, four);
        assert_eq!(one, seven);
    }

    #[test]
    fn different_master_seeds_differ() {
        let graph = path_graph();
        let cfg = config(1000, 0);
        let a = WalkSimulator::new(options(2)).run_walks(&graph, &cfg).unwrap();
        let b = WalkSimulator::new(SimulationOptions {
            master_seed: 43,
            workers: 2,
        })
        .run_walks(&graph, &cfg)
        .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn isolated_seed_dead_ends_without_error() {
        let mut builder = GraphBuilder::new();
        builder.add_node("seed").add_node("other");
        let graph = builder.build();
        let outcome = WalkSimulator::new(options(2))
            .run_walks_cancellable(&graph, &config(100, 50), &CancellationToken::new())
            .unwrap();

        assert!(outcome.counters.is_empty());
        assert_eq!(outcome.completed_walks(), 150);
        assert!(outcome.stats.dead_ends > 0);
        assert_eq!(outcome.stats.steps, 0);
    }

    #[test]
    fn missing_seed_is_reported() {
        let graph = path_graph();
        let mut cfg = config(10, 10);
        cfg.seed_node = id("ghost");
        let result = WalkSimulator::new(options(1)).run_walks(&graph, &cfg);
        assert!(matches!(result, Err(MeritRankError::GraphNodeNotFound(n)) if n == id("ghost")));
    }

    #[test]
    fn empty_graph_is_reported() {
        let graph = GraphBuilder::new().build();
        let result = WalkSimulator::new(options(1)).run_walks(&graph, &config(10, 10));
        assert!(matches!(result, Err(MeritRankError::EmptyGraph)));
    }

    #[test]
    fn invalid_reset_probability_rejected_before_walking() {
        let graph = path_graph();
        let mut cfg = config(10, 10);
        cfg.negative_reset_probability = 0.0;
        let mut rng = StdRng::seed_from_u64(1);
        let result = WalkSimulator::run_walks_with_rng(&graph, &cfg, &mut rng);
        assert!(matches!(result, Err(MeritRankError::InvalidConfig(_))));
    }

    #[test]
    fn cancelled_before_start_runs_nothing() {
        let graph = path_graph();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = WalkSimulator::new(options(2))
            .run_walks_cancellable(&graph, &config(500, 500), &cancel)
            .unwrap();

        assert!(outcome.cancelled);
        assert_eq!(outcome.completed_walks(), 0);
        assert!(outcome.counters.is_empty());
    }

    #[test]
    fn reset_probability_one_never_steps() {
        let graph = path_graph();
        let mut cfg = config(200, 0);
        cfg.positive_reset_probability = 1.0;
        let counters = WalkSimulator::new(options(1)).run_walks(&graph, &cfg).unwrap();
        assert!(counters.is_empty());
    }

    #[test]
    fn long_walk_stops_when_cancelled() {
        let graph = path_graph();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut counters = HitCounters::new(id("seed"));
        let mut stats = WalkStats::default();
        let finished = walk_once(
            &graph,
            &id("seed"),
            1e-9,
            Polarity::Positive,
            &mut StdRng::seed_from_u64(3),
            &cancel,
            &mut counters,
            &mut stats,
        );

        assert!(!finished);
        assert_eq!(stats.steps, CANCEL_CHECK_STEPS);
    }

    #[test]
    fn cancel_mid_run_interrupts_endless_walks() {
        let graph = path_graph();
        let mut cfg = config(4, 0);
        cfg.positive_reset_probability = 1e-12;
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(50));
            trigger.cancel();
        });

        let outcome = WalkSimulator::new(options(2))
            .run_walks_cancellable(&graph, &cfg, &cancel)
            .unwrap();
        canceller.join().unwrap();

        assert!(outcome.cancelled);
        assert!(outcome.completed_walks() < 4);
    }

    #[test]
    fn self_loop_on_seed_is_tolerated() {
        let mut builder = GraphBuilder::new();
        builder
            .add_edge("seed", "seed", RelationKind::Other("self".into()))
            .add_edge("seed", "a", RelationKind::Owner);
        let graph = builder.build();

        let counters = WalkSimulator::new(options(2))
            .run_walks(&graph, &config(1000, 0))
            .unwrap();
        assert!(counters.hits(&id("seed")).positive > 0);
        assert_eq!(
            counters.positive_total_excluding_seed(),
            counters.hits(&id("a")).positive
        );

        let vector = crate::engine::compute_reputation(&graph, &id("seed"), &counters).unwrap();
        assert_eq!(vector.get(&id("a")), Some(1.0));
        assert_eq!(vector.get(&id("seed")), Some(0.0));
    }

    #[test]
    fn simulator_reuses_its_pool() {
        let graph = path_graph();
        let simulator = WalkSimulator::new(options(3));
        let copy = simulator.clone();
        assert!(simulator.pool.is_some());
        assert!(WalkSimulator::new(options(0)).pool.is_none());

        let first = simulator.run_walks(&graph, &config(200, 100)).unwrap();
        let second = copy.run_walks(&graph, &config(200, 100)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn totals_exclude_seed_hits() {
        let mut counters = HitCounters::new(id("seed"));
        counters.record(&id("seed"), Polarity::Positive);
        counters.record(&id("a"), Polarity::Positive);
        counters.record(&id("a"), Polarity::Negative);

        assert_eq!(counters.positive_total_excluding_seed(), 1);
        assert_eq!(counters.negative_total_excluding_seed(), 1);
        assert_eq!(counters.hits(&id("seed")).positive, 1);
    }

    #[test]
    fn merge_sums_counts() {
        let mut left = HitCounters::new(id("seed"));
        left.record(&id("a"), Polarity::Positive);
        let mut right = HitCounters::new(id("seed"));
        right.record(&id("a"), Polarity::Positive);
        right.record(&id("b"), Polarity::Negative);

        left.merge(right).unwrap();
        assert_eq!(left.hits(&id("a")).positive, 2);
        assert_eq!(left.hits(&id("b")).negative, 1);
    }

    #[test]
    fn merge_rejects_foreign_seed() {
        let mut left = HitCounters::new(id("seed"));
        let right = HitCounters::new(id("other"));
        assert!(matches!(left.merge(right), Err(MeritRankError::InvalidState(_))));
    }

    #[test]
    fn batches_cover_every_walk() {
        let batches = plan_batches(&config(130, 64));
        let positive: u64 = batches
            .iter()
            .filter(|b| b.polarity == Polarity::Positive)
            .map(|b| b.walks)
            .sum();
        let negative: u64 = batches
            .iter()
            .filter(|b| b.polarity == Polarity::Negative)
            .map(|b| b.walks)
            .sum();
        assert_eq!(positive, 130);
        assert_eq!(negative, 64);
        assert_eq!(batches.len(), 4);
    }

    #[test]
    fn stream_seeds_are_distinct() {
        let a = stream_seed(1, Polarity::Positive, 0);
        let b = stream_seed(1, Polarity::Negative, 0);
        let c = stream_seed(1, Polarity::Positive, 1);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }
}
