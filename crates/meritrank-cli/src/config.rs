// crates/meritrank-cli/src/config.rs
//
// Runtime configuration for the MeritRank CLI.
// Loaded from a TOML file or populated with defaults.

use serde::Deserialize;
use std::fs;

use meritrank_core::{SimulationOptions, WalkSettings};

/// Runtime configuration for ranking runs.
#[derive(Debug, Clone, Deserialize)]
pub struct RankConfig {
    /// Walk counts and reset probabilities (`[walk]` table).
    #[serde(default)]
    pub walk: WalkSettings,

    /// Master seed for the walk random streams.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,

    /// Worker threads for walks. 0 uses every available core.
    #[serde(default)]
    pub workers: usize,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seed node used when a command is not given `--seed`.
    #[serde(default)]
    pub default_seed: Option<String>,
}

fn default_master_seed() -> u64 {
    SimulationOptions::default().master_seed
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            walk: WalkSettings::default(),
            master_seed: default_master_seed(),
            workers: 0,
            log_level: default_log_level(),
            default_seed: None,
        }
    }
}

impl RankConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: RankConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn simulation_options(&self) -> SimulationOptions {
        SimulationOptions {
            master_seed: self.master_seed,
            workers: self.workers,
        }
    }
}

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
