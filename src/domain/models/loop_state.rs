//! Controller state for one sort run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Phase of the reconcile state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortPhase {
    #[default]
    Idle,
    Loading,
    Sorting,
    Converged,
    Cancelled,
}

impl SortPhase {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Converged | Self::Cancelled)
    }

    /// Allowed edges: `Idle -> Loading -> Sorting -> {Converged | Cancelled}`,
    /// `Sorting -> Loading` on a changed item count, and `Cancelled` from any
    /// non-terminal phase.
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Loading)
                | (Self::Loading, Self::Sorting)
                | (Self::Sorting, Self::Loading | Self::Converged)
                | (Self::Idle | Self::Loading | Self::Sorting, Self::Cancelled)
        )
    }
}

impl fmt::Display for SortPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Sorting => "sorting",
            Self::Converged => "converged",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Mutable state of a run, written only by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopState {
    pub run_id: Uuid,
    pub phase: SortPhase,
    pub running: bool,
    pub cancel_requested: bool,
    /// Lower bound on the prefix known to be in its final place.
    pub sorted_count: usize,
    /// Item count the current sorting phase was planned against.
    pub known_count: usize,
    /// Effective scroll delay, grown by rounds that made no progress.
    pub scroll_delay_ms: u64,
    pub post_move_delay_ms: u64,
    pub moves: u32,
    pub passes: u32,
    pub started_at: DateTime<Utc>,
}

impl LoopState {
    pub fn new(scroll_delay_ms: u64, post_move_delay_ms: u64) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            phase: SortPhase::Idle,
            running: false,
            cancel_requested: false,
            sorted_count: 0,
            known_count: 0,
            scroll_delay_ms,
            post_move_delay_ms,
            moves: 0,
            passes: 0,
            started_at: Utc::now(),
        }
    }

    /// Move to `next`, returning whether the edge was legal.
    ///
    /// Illegal edges leave the phase unchanged.
    pub fn transition(&mut self, next: SortPhase) -> bool {
        if self.phase == next {
            return true;
        }
        if !self.phase.can_transition_to(next) {
            return false;
        }
        self.phase = next;
        self.running = !next.is_terminal();
        true
    }

    /// Forget all progress so a fresh run can start.
    pub fn reset(&mut self) {
        *self = Self::new(self.scroll_delay_ms, self.post_move_delay_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_edges() {
        assert!(SortPhase::Idle.can_transition_to(SortPhase::Loading));
        assert!(SortPhase::Sorting.can_transition_to(SortPhase::Loading));
        assert!(SortPhase::Sorting.can_transition_to(SortPhase::Converged));
        assert!(SortPhase::Loading.can_transition_to(SortPhase::Cancelled));
        assert!(!SortPhase::Idle.can_transition_to(SortPhase::Converged));
        assert!(!SortPhase::Converged.can_transition_to(SortPhase::Loading));
        assert!(!SortPhase::Cancelled.can_transition_to(SortPhase::Sorting));
    }

    #[test]
    fn transition_tracks_running_flag() {
        let mut state = LoopState::new(500, 1800);
        assert!(state.transition(SortPhase::Loading));
        assert!(state.running);
        assert!(state.transition(SortPhase::Sorting));
        assert!(state.transition(SortPhase::Converged));
        assert!(!state.running);
        assert!(!state.transition(SortPhase::Sorting));
        assert_eq!(state.phase, SortPhase::Converged);
    }

    #[test]
    fn reset_discards_progress() {
        let mut state = LoopState::new(500, 1800);
        let first_run = state.run_id;
        state.transition(SortPhase::Loading);
        state.sorted_count = 12;
        state.moves = 4;
        state.cancel_requested = true;
        state.reset();
        assert_eq!(state.phase, SortPhase::Idle);
        assert_eq!(state.sorted_count, 0);
        assert_eq!(state.moves, 0);
        assert!(!state.cancel_requested);
        assert_ne!(state.run_id, first_run);
    }
}
