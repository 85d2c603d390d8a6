// crates/meritrank-cli/src/commands/graph.rs
//
// `meritrank graph --records <file>`: summarize the graph snapshot built
// from a records file.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use meritrank_core::ProvenanceGraph;

use crate::config::expand_tilde;
use crate::ingest;
use crate::output::{format_json, format_table, OutputFormat};

/// Summarize a records file as a graph.
#[derive(Debug, Args)]
pub struct GraphCmd {
    /// Path to the marketplace records JSON file.
    #[arg(long)]
    pub records: String,

    /// Output format: table or json.
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[derive(Debug, Tabled, Serialize)]
struct GraphSummary {
    #[tabled(rename = "Nodes")]
    nodes: usize,
    #[tabled(rename = "Edges")]
    edges: usize,
    #[tabled(rename = "Events")]
    events: usize,
    #[tabled(rename = "Skipped")]
    skipped: usize,
    #[tabled(rename = "Version")]
    version: String,
}

/// Run the graph command.
pub async fn run(cmd: &GraphCmd) -> Result<(), Box<dyn std::error::Error>> {
    let format: OutputFormat = cmd.format.parse()?;
    let ingested = ingest::load_records(&expand_tilde(&cmd.records))?;

    let summary = GraphSummary {
        nodes: ingested.graph.node_count(),
        edges: ingested.graph.edge_count(),
        events: ingested.events.len(),
        skipped: ingested.skipped,
        version: ingested.graph.fingerprint().to_string(),
    };

    match format {
        OutputFormat::Table => println!("{}", format_table(&[summary])),
        OutputFormat::Json => println!("{}", format_json(&summary)),
    }

    Ok(())
}
