use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::sort_key::SortKey;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOutcome {
    Converged,
    Cancelled,
}

/// A retry budget that ran out; the run carried on with partial data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// Loading stopped before the expected number of items materialised.
    LoadStall { loaded: usize, expected: Option<usize> },
    /// The last row never finished rendering.
    RenderTimeout { index: usize },
    /// Drag handles and display rows never agreed.
    StreamMismatch { drag_handles: usize, display_rows: usize, expected: usize },
    /// Repeated moves into one position had no effect; it was skipped.
    StalledPosition { index: usize },
    /// The pass cap was reached before convergence.
    PassBudgetExhausted { passes: u32 },
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadStall { loaded, expected: Some(expected) } => write!(
                f,
                "only {loaded} of {expected} items loaded, sorting what is available"
            ),
            Self::LoadStall { loaded, expected: None } => {
                write!(f, "loading stalled at {loaded} items, sorting what is available")
            }
            Self::RenderTimeout { index } => {
                write!(f, "item {} never finished rendering", index + 1)
            }
            Self::StreamMismatch { drag_handles, display_rows, expected } => write!(
                f,
                "{drag_handles} drag handles and {display_rows} rows never matched {expected} items"
            ),
            Self::StalledPosition { index } => {
                write!(f, "position #{index} did not accept a move, skipping it")
            }
            Self::PassBudgetExhausted { passes } => {
                write!(f, "gave up after {passes} passes")
            }
        }
    }
}

/// A drag that was carried out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub from: usize,
    pub to: usize,
    pub key: SortKey,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortReport {
    pub run_id: Uuid,
    pub outcome: SortOutcome,
    pub item_count: usize,
    pub sorted_count: usize,
    pub passes: u32,
    pub moves: Vec<MoveRecord>,
    pub degradations: Vec<Degradation>,
    pub final_status: String,
}

impl SortReport {
    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub const fn is_cancelled(&self) -> bool {
        matches!(self.outcome, SortOutcome::Cancelled)
    }

    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}
