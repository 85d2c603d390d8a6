// crates/meritrank-cli/src/commands/events.rs
//
// `meritrank events --records <file> --seed <id>`: score marketplace events
// by combining the reputations of each token's creator and owner.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use meritrank_reputation::{score_event_with, CombinePolicy};

use crate::config::{expand_tilde, RankConfig};
use crate::ingest::{self, MarketEvent};
use crate::output::{format_json, format_score, format_table, OutputFormat};

/// Score marketplace events.
#[derive(Debug, Args)]
pub struct EventsCmd {
    /// Path to the marketplace records JSON file.
    #[arg(long)]
    pub records: String,

    /// Seed node whose point of view is evaluated.
    #[arg(long)]
    pub seed: Option<String>,

    /// How creator and owner reputations combine: sum, amount, max, or min.
    #[arg(long, default_value = "sum")]
    pub policy: String,

    /// Event kinds to score, comma separated ("all" for every kind).
    #[arg(long, value_delimiter = ',', default_value = "Listed,PriceChanged")]
    pub kinds: Vec<String>,

    /// Output format: table or json.
    #[arg(long, default_value = "table")]
    pub format: String,
}

/// A row in the event score table.
#[derive(Debug, Tabled, Serialize)]
struct EventRow {
    #[tabled(rename = "Token")]
    token_id: String,
    #[tabled(rename = "Creator")]
    creator: String,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "Amount (ETH)")]
    amount: f64,
    #[tabled(rename = "Event")]
    event: String,
    #[tabled(rename = "Reputation")]
    #[serde(skip)]
    display: String,
    #[tabled(skip)]
    reputation: f64,
}

fn selected(event: &MarketEvent, kinds: &[String]) -> bool {
    kinds.iter().any(|kind| event.kind.matches(kind.trim()))
}

/// Run the events command.
pub async fn run(cmd: &EventsCmd, config: &RankConfig) -> Result<(), Box<dyn std::error::Error>> {
    let format: OutputFormat = cmd.format.parse()?;
    let policy: CombinePolicy = cmd.policy.parse()?;
    let seed = super::resolve_seed(cmd.seed.as_deref(), config)?;
    let ingested = ingest::load_records(&expand_tilde(&cmd.records))?;

    let events: Vec<MarketEvent> = ingested
        .events
        .into_iter()
        .filter(|event| selected(event, &cmd.kinds))
        .collect();
    if events.is_empty() {
        println!("No events of kind {} found.", cmd.kinds.join(", "));
        return Ok(());
    }

    let vector = super::compute_vector(ingested.graph, seed.clone(), config).await?;

    let rows: Vec<EventRow> = events
        .iter()
        .map(|event| {
            let reputation =
                score_event_with(&policy, &event.creator, &event.owner, event.amount, &vector);
            EventRow {
                token_id: event.token_id.to_string(),
                creator: event.creator.to_string(),
                owner: event.owner.to_string(),
                amount: event.amount,
                event: event.kind.to_string(),
                display: format_score(reputation),
                reputation,
            }
        })
        .collect();

    match format {
        OutputFormat::Table => {
            println!(
                "Event scores from the point of view of {} (policy: {})",
                seed, policy
            );
            println!();
            println!("{}", format_table(&rows));
        }
        OutputFormat::Json => println!("{}", format_json(&rows)),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::EventKind;
    use meritrank_core::NodeId;

    fn event(kind: EventKind) -> MarketEvent {
        MarketEvent {
            token_id: NodeId::from("token"),
            creator: NodeId::from("alice"),
            owner: NodeId::from("bob"),
            amount: 1.0,
            kind,
        }
    }

    #[test]
    fn default_kinds_select_listings_and_price_changes() {
        let kinds = vec!["Listed".to_string(), "PriceChanged".to_string()];
        assert!(selected(&event(EventKind::Listed), &kinds));
        assert!(selected(&event(EventKind::PriceChanged), &kinds));
        assert!(!selected(&event(EventKind::Other("Sale".into())), &kinds));
    }

    #[test]
    fn all_selects_everything() {
        let kinds = vec!["all".to_string()];
        assert!(selected(&event(EventKind::Other("Sale".into())), &kinds));
    }
}
