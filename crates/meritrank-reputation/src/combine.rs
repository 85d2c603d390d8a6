// crates/meritrank-reputation/src/combine.rs
//
// Event scoring: combine the reputations of a transaction's creator and
// owner into one score for the event.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use meritrank_core::NodeId;

use crate::engine::{ReputationVector, NEUTRAL_REPUTATION};

/// Policy that turns two party reputations into an event score.
pub trait EventCombiner: Send + Sync {
    /// Combine the creator's and owner's reputation. `amount` is the
    /// transaction value, which policies may ignore.
    fn combine(&self, creator: f64, owner: f64, amount: f64) -> f64;

    /// Reputation assumed for a party missing from the vector.
    fn fallback(&self) -> f64 {
        NEUTRAL_REPUTATION
    }
}

/// Built-in combination policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinePolicy {
    /// creator + owner.
    #[default]
    Sum,
    /// (creator + owner) * amount.
    AmountWeighted,
    /// max(creator, owner).
    Max,
    /// min(creator, owner).
    Min,
}

impl EventCombiner for CombinePolicy {
    fn combine(&self, creator: f64, owner: f64, amount: f64) -> f64 {
        match self {
            CombinePolicy::Sum => creator + owner,
            CombinePolicy::AmountWeighted => (creator + owner) * amount,
            CombinePolicy::Max => creator.max(owner),
            CombinePolicy::Min => creator.min(owner),
        }
    }
}

impl fmt::Display for CombinePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombinePolicy::Sum => write!(f, "sum"),
            CombinePolicy::AmountWeighted => write!(f, "amount"),
            CombinePolicy::Max => write!(f, "max"),
            CombinePolicy::Min => write!(f, "min"),
        }
    }
}

impl FromStr for CombinePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sum" => Ok(CombinePolicy::Sum),
            "amount" | "amount_weighted" | "amount-weighted" => Ok(CombinePolicy::AmountWeighted),
            "max" => Ok(CombinePolicy::Max),
            "min" => Ok(CombinePolicy::Min),
            other => Err(format!(
                "Unknown combine policy: {}. Use 'sum', 'amount', 'max', or 'min'.",
                other
            )),
        }
    }
}

/// Score an event with the default policy: creator + owner, missing
/// parties counted as neutral.
pub fn score_event(creator: &NodeId, owner: &NodeId, vector: &ReputationVector) -> f64 {
    score_event_with(&CombinePolicy::Sum, creator, owner, 0.0, vector)
}

/// Score an event with a caller-chosen combiner.
pub fn score_event_with<C>(
    combiner: &C,
    creator: &NodeId,
    owner: &NodeId,
    amount: f64,
    vector: &ReputationVector,
) -> f64
where
    C: EventCombiner + ?Sized,
{
    let creator_reputation = vector.get(creator).unwrap_or_else(|| combiner.fallback());
    let owner_reputation = vector.get(owner).unwrap_or_else(|| combiner.fallback());
    combiner.combine(creator_reputation, owner_reputation, amount)
}
