//! Domain errors for the playlist sorter.

use thiserror::Error;

/// Errors surfaced by the sort controller and the host collaborators.
///
/// Unparseable keys never show up here: they are mapped onto sentinel keys by
/// the extractor. Cancellation is not an error either, it is a normal outcome.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SortError {
    #[error("Stale element reference to row {row} from snapshot generation {generation}")]
    StaleReference { row: usize, generation: u64 },

    #[error("Current page is not a playlist page")]
    NotAPlaylistPage,

    #[error("A sort run is already in progress")]
    AlreadyRunning,

    #[error("Host document error: {0}")]
    Host(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid playlist fixture: {0}")]
    Fixture(String),
}

impl SortError {
    /// Whether the controller may recover by discarding the current snapshot
    /// and starting the iteration again.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StaleReference { .. } | Self::Host(_))
    }
}

pub type SortResult<T> = Result<T, SortError>;

impl From<serde_yaml::Error> for SortError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Fixture(err.to_string())
    }
}
