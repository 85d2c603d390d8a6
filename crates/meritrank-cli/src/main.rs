// crates/meritrank-cli/src/main.rs
//
// CLI entrypoint for MeritRank.
//
// Loads configuration, initializes tracing, ingests marketplace records
// into a graph snapshot, and runs signed random-walk reputation scoring
// from a seed node's point of view.

mod commands;
mod config;
mod ingest;
mod output;

use clap::{Parser, Subcommand};
use commands::events::EventsCmd;
use commands::graph::GraphCmd;
use commands::rank::RankCmd;
use config::{expand_tilde, RankConfig};

/// MeritRank: seed-relative reputation over marketplace provenance graphs.
#[derive(Parser, Debug)]
#[command(
    name = "meritrank",
    version = "0.1.0",
    about = "Signed random-walk reputation scoring for marketplace provenance graphs"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "~/.meritrank/config.toml")]
    config: String,

    /// Master random seed (overrides the config file).
    #[arg(long, global = true)]
    master_seed: Option<u64>,

    /// Worker threads for walks (overrides the config file; 0 = all cores).
    #[arg(long, global = true)]
    workers: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Rank every node by reputation from a seed's point of view.
    Rank(RankCmd),

    /// Score marketplace events from creator and owner reputations.
    Events(EventsCmd),

    /// Summarize the graph built from a records file.
    Graph(GraphCmd),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration before tracing is up; report the outcome after.
    let config_path = expand_tilde(&cli.config);
    let loaded = RankConfig::load(&config_path);
    let mut config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => RankConfig::default(),
    };

    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match loaded {
        Ok(_) => tracing::info!("Loaded configuration from {}", config_path),
        Err(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            config_path,
            e
        ),
    }

    // CLI flags override the config file values.
    if let Some(master_seed) = cli.master_seed {
        config.master_seed = master_seed;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }

    match &cli.command {
        Commands::Rank(cmd) => commands::rank::run(cmd, &config).await?,
        Commands::Events(cmd) => commands::events::run(cmd, &config).await?,
        Commands::Graph(cmd) => commands::graph::run(cmd).await?,
    }

    Ok(())
}
