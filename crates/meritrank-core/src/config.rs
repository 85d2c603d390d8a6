// crates/meritrank-core/src/config.rs
//
// Walk configuration for MeritRank computations.
//
// `WalkSettings` is the file-facing form (deserialized from TOML/JSON, signed
// counts so malformed values survive parsing and are rejected by validation).
// `WalkConfig` is the validated form a computation runs with.

use serde::{Deserialize, Serialize};

use crate::error::MeritRankError;
use crate::graph::NodeId;

/// Unvalidated walk parameters as read from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkSettings {
    /// Number of positive walks. Default: 1000.
    #[serde(default = "default_positive_walk_count")]
    pub positive_walk_count: i64,

    /// Per-step termination probability of positive walks. Default: 0.15.
    #[serde(default = "default_positive_reset_probability")]
    pub positive_reset_probability: f64,

    /// Number of negative walks. Default: 500.
    #[serde(default = "default_negative_walk_count")]
    pub negative_walk_count: i64,

    /// Per-step termination probability of negative walks. Default: 0.3.
    #[serde(default = "default_negative_reset_probability")]
    pub negative_reset_probability: f64,
}

fn default_positive_walk_count() -> i64 {
    1000
}

fn default_positive_reset_probability() -> f64 {
    0.15
}

fn default_negative_walk_count() -> i64 {
    500
}

fn default_negative_reset_probability() -> f64 {
    0.3
}

impl Default for WalkSettings {
    fn default() -> Self {
        Self {
            positive_walk_count: default_positive_walk_count(),
            positive_reset_probability: default_positive_reset_probability(),
            negative_walk_count: default_negative_walk_count(),
            negative_reset_probability: default_negative_reset_probability(),
        }
    }
}

/// Validated configuration for one computation.
///
/// Reset probabilities lie in (0, 1]; a probability of 0 would let a walk
/// run forever on any node with neighbors.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkConfig {
    pub seed_node: NodeId,
    pub positive_walk_count: u64,
    pub positive_reset_probability: f64,
    pub negative_walk_count: u64,
    pub negative_reset_probability: f64,
}

impl WalkConfig {
    /// Build and validate a configuration from raw settings.
    pub fn from_settings(
        seed_node: NodeId,
        settings: &WalkSettings,
    ) -> Result<Self, MeritRankError> {
        let positive_walk_count = walk_count("positive", settings.positive_walk_count)?;
        let negative_walk_count = walk_count("negative", settings.negative_walk_count)?;
        let config = Self {
            seed_node,
            positive_walk_count,
            positive_reset_probability: settings.positive_reset_probability,
            negative_walk_count,
            negative_reset_probability: settings.negative_reset_probability,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the reset probabilities.
    ///
    /// Called again by the simulator so that a hand-built config cannot
    /// bypass validation.
    pub fn validate(&self) -> Result<(), MeritRankError> {
        reset_probability("positive", self.positive_reset_probability)?;
        reset_probability("negative", self.negative_reset_probability)?;
        Ok(())
    }

    /// Total number of walks across both polarities.
    pub fn total_walks(&self) -> u64 {
        self.positive_walk_count
            .saturating_add(self.negative_walk_count)
    }

    /// The same walk parameters evaluated from a different seed.
    pub fn with_seed(&self, seed_node: NodeId) -> Self {
        Self {
            seed_node,
            ..self.clone()
        }
    }
}

fn walk_count(polarity: &str, count: i64) -> Result<u64, MeritRankError> {
    u64::try_from(count).map_err(|_| {
        MeritRankError::InvalidConfig(format!(
            "{} walk count must be >= 0, got {}",
            polarity, count
        ))
    })
}

fn reset_probability(polarity: &str, p: f64) -> Result<(), MeritRankError> {
    // NaN fails both comparisons and is rejected here too.
    if p > 0.0 && p <= 1.0 {
        Ok(())
    } else {
        Err(MeritRankError::InvalidConfig(format!(
            "{} reset probability must be in (0, 1], got {}",
            polarity, p
        )))
    }
}

/// Random source and parallelism controls for the walk simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationOptions {
    /// Master seed every per-batch random stream is derived from.
    pub master_seed: u64,
    /// Worker threads for parallel walks. 0 uses the available parallelism.
    pub workers: usize,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            master_seed: 0x6d65_7269_7472_616e,
            workers: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> NodeId {
        NodeId::from("seed")
    }

    #[test]
    fn defaults_validate() {
        let config = WalkConfig::from_settings(seed(), &WalkSettings::default()).unwrap();
        assert_eq!(config.positive_walk_count, 1000);
        assert_eq!(config.negative_walk_count, 500);
        assert_eq!(config.total_walks(), 1500);
    }

    #[test]
    fn zero_reset_probability_rejected() {
        let settings = WalkSettings {
            positive_reset_probability: 0.0,
            ..WalkSettings::default()
        };
        let result = WalkConfig::from_settings(seed(), &settings);
        assert!(matches!(result, Err(MeritRankError::InvalidConfig(_))));
    }

    #[test]
    fn reset_probability_above_one_rejected() {
        let settings = WalkSettings {
            negative_reset_probability: 1.5,
            ..WalkSettings::default()
        };
        let result = WalkConfig::from_settings(seed(), &settings);
        assert!(matches!(result, Err(MeritRankError::InvalidConfig(_))));
    }

    #[test]
    fn nan_reset_probability_rejected() {
        let settings = WalkSettings {
            positive_reset_probability: f64::NAN,
            ..WalkSettings::default()
        };
        assert!(WalkConfig::from_settings(seed(), &settings).is_err());
    }

    #[test]
    fn reset_probability_of_one_accepted() {
        let settings = WalkSettings {
            positive_reset_probability: 1.0,
            ..WalkSettings::default()
        };
        assert!(WalkConfig::from_settings(seed(), &settings).is_ok());
    }

    #[test]
    fn negative_walk_count_rejected() {
        let settings = WalkSettings {
            positive_walk_count: -1,
            ..WalkSettings::default()
        };
        let err = WalkConfig::from_settings(seed(), &settings).unwrap_err();
        assert!(err.to_string().contains("positive walk count"));
    }

    #[test]
    fn zero_walk_counts_accepted() {
        let settings = WalkSettings {
            positive_walk_count: 0,
            negative_walk_count: 0,
            ..WalkSettings::default()
        };
        let config = WalkConfig::from_settings(seed(), &settings).unwrap();
        assert_eq!(config.total_walks(), 0);
    }

    #[test]
    fn settings_fill_missing_fields_with_defaults() {
        let settings: WalkSettings =
            serde_json::from_str(r#"{"negative_walk_count": 0}"#).unwrap();
        assert_eq!(settings.negative_walk_count, 0);
        assert_eq!(settings.positive_walk_count, 1000);
        assert!((settings.negative_reset_probability - 0.3).abs() < 1e-12);
    }

    #[test]
    fn with_seed_keeps_parameters() {
        let config = WalkConfig::from_settings(seed(), &WalkSettings::default()).unwrap();
        let moved = config.with_seed(NodeId::from("other"));
        assert_eq!(moved.seed_node, NodeId::from("other"));
        assert_eq!(moved.positive_walk_count, config.positive_walk_count);
    }
}
