// crates/meritrank-cli/src/commands/rank.rs
//
// `meritrank rank --records <file> --seed <id>`: rank every node by its
// reputation from the seed's point of view.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::config::{expand_tilde, RankConfig};
use crate::ingest;
use crate::output::{format_json, format_score, format_table, OutputFormat};

/// Rank nodes by reputation.
#[derive(Debug, Args)]
pub struct RankCmd {
    /// Path to the marketplace records JSON file.
    #[arg(long)]
    pub records: String,

    /// Seed node whose point of view is evaluated.
    #[arg(long)]
    pub seed: Option<String>,

    /// Number of rows to show (0 shows every node).
    #[arg(long, default_value = "20")]
    pub top: usize,

    /// Output format: table or json.
    #[arg(long, default_value = "table")]
    pub format: String,
}

/// A row in the ranking table.
#[derive(Debug, Tabled, Serialize)]
struct RankRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Node")]
    node: String,
    #[tabled(rename = "Reputation")]
    #[serde(skip)]
    display: String,
    #[tabled(skip)]
    reputation: f64,
}

/// Run the rank command.
pub async fn run(cmd: &RankCmd, config: &RankConfig) -> Result<(), Box<dyn std::error::Error>> {
    let format: OutputFormat = cmd.format.parse()?;
    let seed = super::resolve_seed(cmd.seed.as_deref(), config)?;
    let ingested = ingest::load_records(&expand_tilde(&cmd.records))?;

    let vector = super::compute_vector(ingested.graph, seed.clone(), config).await?;

    let limit = if cmd.top == 0 { usize::MAX } else { cmd.top };
    let rows: Vec<RankRow> = vector
        .ranked()
        .into_iter()
        .filter(|(node, _)| **node != seed)
        .take(limit)
        .enumerate()
        .map(|(i, (node, score))| RankRow {
            rank: i + 1,
            node: node.to_string(),
            display: format_score(score),
            reputation: score,
        })
        .collect();

    match format {
        OutputFormat::Table => {
            println!("Reputation from the point of view of {}", seed);
            println!();
            println!("{}", format_table(&rows));
        }
        OutputFormat::Json => println!("{}", format_json(&rows)),
    }

    Ok(())
}
