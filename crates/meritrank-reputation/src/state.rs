// crates/meritrank-reputation/src/state.rs
//
// Lifecycle of one cached reputation computation.
//
// Valid transitions:
//   Init -> WalksRun -> ScoresComputed
//   Stale -> Init
//   Any state -> Stale

use std::fmt;

use serde::{Deserialize, Serialize};

use meritrank_core::MeritRankError;

/// Lifecycle states of a computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComputationState {
    /// Nothing has run yet.
    Init,
    /// Walks finished; hit counters are available.
    WalksRun,
    /// The reputation vector is computed and may be served.
    ScoresComputed,
    /// Graph, seed, or configuration changed; must be recomputed.
    Stale,
}

impl fmt::Display for ComputationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputationState::Init => write!(f, "Init"),
            ComputationState::WalksRun => write!(f, "WalksRun"),
            ComputationState::ScoresComputed => write!(f, "ScoresComputed"),
            ComputationState::Stale => write!(f, "Stale"),
        }
    }
}

/// State machine guarding computation lifecycle transitions.
#[derive(Debug, Clone)]
pub struct ComputationStateMachine {
    current: ComputationState,
}

impl ComputationStateMachine {
    /// Create a new state machine in the Init state.
    pub fn new() -> Self {
        Self {
            current: ComputationState::Init,
        }
    }

    pub fn current(&self) -> ComputationState {
        self.current
    }

    /// Whether the computation holds a vector that may be served.
    pub fn is_servable(&self) -> bool {
        self.current == ComputationState::ScoresComputed
    }

    /// Attempt to transition to a new state.
    pub fn transition(&mut self, new_state: ComputationState) -> Result<(), MeritRankError> {
        let valid = matches!(
            (self.current, new_state),
            (_, ComputationState::Stale)
                | (ComputationState::Init, ComputationState::WalksRun)
                | (ComputationState::WalksRun, ComputationState::ScoresComputed)
                | (ComputationState::Stale, ComputationState::Init)
        );

        if !valid {
            return Err(MeritRankError::InvalidState(format!(
                "Invalid computation transition: {} -> {}",
                self.current, new_state
            )));
        }

        tracing::debug!("Computation transition: {} -> {}", self.current, new_state);
        self.current = new_state;
        Ok(())
    }

    /// Return to Init from any state, passing through Stale.
    pub fn restart(&mut self) -> Result<(), MeritRankError> {
        if self.current != ComputationState::Init {
            self.transition(ComputationState::Stale)?;
            self.transition(ComputationState::Init)?;
        }
        Ok(())
    }
}

impl Default for ComputationStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
