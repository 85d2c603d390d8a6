// crates/meritrank-cli/src/commands/mod.rs
//
// Command module declarations for the MeritRank CLI, plus the shared
// computation driver.

pub mod events;
pub mod graph;
pub mod rank;

use std::sync::Arc;

use meritrank_core::{AdjacencyGraph, NodeId};
use meritrank_reputation::{CancellationToken, ReputationVector, ScoreCache};

use crate::config::RankConfig;

/// Pick the seed from the command line, falling back to the config file.
pub fn resolve_seed(
    flag: Option<&str>,
    config: &RankConfig,
) -> Result<NodeId, Box<dyn std::error::Error>> {
    flag.or(config.default_seed.as_deref())
        .map(NodeId::from)
        .ok_or_else(|| "No seed node given. Pass --seed or set default_seed in the config.".into())
}

/// Compute `seed`'s reputation vector over `graph` off the async runtime.
///
/// Ctrl-C cancels the walks; a cancelled run is reported as an error and
/// nothing partial is returned.
pub async fn compute_vector(
    graph: AdjacencyGraph,
    seed: NodeId,
    config: &RankConfig,
) -> Result<ReputationVector, Box<dyn std::error::Error>> {
    let graph = Arc::new(graph);
    let version = graph.fingerprint();
    tracing::info!(
        seed = %seed,
        version = %version,
        positive_walks = config.walk.positive_walk_count,
        negative_walks = config.walk.negative_walk_count,
        "Computing reputation"
    );

    let mut cache = ScoreCache::new(
        graph,
        version,
        config.walk.clone(),
        config.simulation_options(),
    );

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, cancelling walks");
                cancel.cancel();
            }
        })
    };

    let result =
        tokio::task::spawn_blocking(move || cache.vector_cancellable(&seed, &cancel).cloned())
            .await;
    interrupt.abort();

    Ok(result??)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wins_over_config() {
        let config = RankConfig {
            default_seed: Some("from-config".to_string()),
            ..RankConfig::default()
        };
        assert_eq!(
            resolve_seed(Some("from-flag"), &config).unwrap(),
            NodeId::from("from-flag")
        );
        assert_eq!(
            resolve_seed(None, &config).unwrap(),
            NodeId::from("from-config")
        );
    }

    #[test]
    fn missing_seed_is_an_error() {
        assert!(resolve_seed(None, &RankConfig::default()).is_err());
    }

    #[tokio::test]
    async fn computes_vector_for_small_graph() {
        use meritrank_core::{GraphBuilder, RelationKind};

        let mut builder = GraphBuilder::new();
        builder
            .add_edge("alice", "token-1", RelationKind::Creator)
            .add_edge("bob", "token-1", RelationKind::Owner);
        let config = RankConfig {
            master_seed: 3,
            workers: 1,
            ..RankConfig::default()
        };
        let vector = compute_vector(builder.build(), NodeId::from("alice"), &config)
            .await
            .unwrap();
        assert_eq!(vector.len(), 3);
        assert_eq!(vector.get(&NodeId::from("alice")), Some(0.0));
    }
}
