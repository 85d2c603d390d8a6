// crates/meritrank-cli/src/ingest.rs
//
// Marketplace record ingestion.
//
// Input is a JSON object keyed by token id. Each token record names its
// creator and owner accounts and carries an event history:
//
//   { "<token>": { "creator": {"id": "0x.."}, "owner": {"id": "0x.."},
//                  "nftHistory": [{"event": "Listed", "amountInETH": 0.4}] } }
//
// Every token becomes a node linked to its creator (Creator edge) and its
// owner (Owner edge). Entries that are not objects, or that do not parse,
// are skipped.

use std::fmt;
use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use meritrank_core::{AdjacencyGraph, GraphBuilder, NodeId, RelationKind};

/// Errors raised while reading marketplace records.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read records: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed records JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Records must be a JSON object keyed by token id")]
    NotAnObject,
}

/// Kind of a marketplace history event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Listed,
    PriceChanged,
    Other(String),
}

impl EventKind {
    pub fn parse(name: &str) -> Self {
        match name {
            "Listed" => EventKind::Listed,
            "PriceChanged" => EventKind::PriceChanged,
            other => EventKind::Other(other.to_string()),
        }
    }

    /// Whether this kind is selected by a filter name ("all" matches any).
    pub fn matches(&self, filter: &str) -> bool {
        filter.eq_ignore_ascii_case("all") || self.to_string().eq_ignore_ascii_case(filter)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Listed => write!(f, "Listed"),
            EventKind::PriceChanged => write!(f, "PriceChanged"),
            EventKind::Other(name) => write!(f, "{}", name),
        }
    }
}

/// One history event of a token, with the token's parties attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketEvent {
    pub token_id: NodeId,
    pub creator: NodeId,
    pub owner: NodeId,
    pub amount: f64,
    pub kind: EventKind,
}

/// Graph snapshot and events extracted from a record set.
#[derive(Debug)]
pub struct Ingested {
    pub graph: AdjacencyGraph,
    pub events: Vec<MarketEvent>,
    /// Records or events dropped for being malformed or missing a party.
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct TokenRecord {
    #[serde(default)]
    creator: Option<Party>,
    #[serde(default)]
    owner: Option<Party>,
    #[serde(default, rename = "nftHistory")]
    history: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
struct Party {
    #[serde(default)]
    id: Value,
}

#[derive(Debug, Deserialize)]
struct HistoryEntry {
    #[serde(default)]
    event: Option<String>,
    #[serde(default, rename = "amountInETH")]
    amount: Value,
}

/// Read and ingest a records file.
pub fn load_records(path: &str) -> Result<Ingested, IngestError> {
    let contents = fs::read_to_string(path)?;
    ingest_records(&contents)
}

/// Ingest records from JSON text.
pub fn ingest_records(json: &str) -> Result<Ingested, IngestError> {
    let root: Value = serde_json::from_str(json)?;
    let Value::Object(tokens) = root else {
        return Err(IngestError::NotAnObject);
    };
    Ok(ingest_map(tokens))
}

fn ingest_map(tokens: Map<String, Value>) -> Ingested {
    let mut builder = GraphBuilder::new();
    let mut events = Vec::new();
    let mut skipped = 0;

    for (token_id, value) in tokens {
        if !value.is_object() {
            skipped += 1;
            continue;
        }
        let record: TokenRecord = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(token = %token_id, "Skipping malformed record: {}", e);
                skipped += 1;
                continue;
            }
        };

        let token = NodeId::new(token_id);
        let creator = party_id(record.creator);
        let owner = party_id(record.owner);
        if let Some(creator) = &creator {
            builder.add_edge(creator.clone(), token.clone(), RelationKind::Creator);
        }
        if let Some(owner) = &owner {
            builder.add_edge(owner.clone(), token.clone(), RelationKind::Owner);
        }

        for entry in record.history {
            match (&creator, &owner, entry.event) {
                (Some(creator), Some(owner), Some(kind)) => events.push(MarketEvent {
                    token_id: token.clone(),
                    creator: creator.clone(),
                    owner: owner.clone(),
                    amount: parse_amount(&entry.amount),
                    kind: EventKind::parse(&kind),
                }),
                _ => skipped += 1,
            }
        }
    }

    let graph = builder.build();
    tracing::debug!(
        events = events.len(),
        skipped,
        "Ingested marketplace records"
    );
    Ingested {
        graph,
        events,
        skipped,
    }
}

/// Party ids arrive as strings or numbers. Empty, zero, and other values
/// name no party.
fn party_id(party: Option<Party>) -> Option<NodeId> {
    let id = match party?.id {
        Value::String(s) if !s.is_empty() => s,
        Value::Number(n) if n.as_f64() != Some(0.0) => n.to_string(),
        _ => return None,
    };
    Some(NodeId::new(id))
}

/// Amounts arrive as numbers or numeric strings; anything else counts as 0.
fn parse_amount(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
