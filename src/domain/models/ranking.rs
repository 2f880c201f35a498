use serde::{Deserialize, Serialize};

use super::sort_key::SortKey;

/// A row's key together with where it is and where it should be.
///
/// Across one ranking the `current_position` values form a permutation of
/// `0..n`, and so do the `desired_position` values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedItem {
    pub key: SortKey,
    pub current_position: usize,
    pub desired_position: usize,
}

impl RankedItem {
    pub const fn is_in_place(&self) -> bool {
        self.current_position == self.desired_position
    }
}

/// A single corrective move: drag the row at `from` onto the row at `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMove {
    pub from: usize,
    pub to: usize,
    pub key: SortKey,
}
