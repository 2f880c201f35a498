//! playlist-sort - reorder a lazily loaded playlist by replaying drags
//!
//! The host page only supports reordering through drag-and-drop, only renders
//! part of the list at a time, and re-renders after every move. The sorter
//! therefore works as a reconcile loop: load everything, read the live order,
//! perform the single drag that fixes the first misplaced position, wait for
//! the host to settle, and repeat until the observed order matches the target.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): sort keys, snapshots, loop state, ports
//! - **Service Layer** (`services`): key extraction, ranking, gestures,
//!   loading and the reconcile loop
//! - **Application Layer** (`application`): sort sessions and recurring sorts
//! - **Adapters** (`adapters`): simulated host page and status sinks
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use playlist_sort::adapters::{PlaylistItem, SimulatedPlaylist, TracingStatusSink};
//! use playlist_sort::application::SortSession;
//! use playlist_sort::domain::models::SortConfig;
//!
//! # async fn run() -> playlist_sort::SortResult<()> {
//! let page = SimulatedPlaylist::loaded(vec![
//!     PlaylistItem::with_duration("long", "10:00"),
//!     PlaylistItem::with_duration("short", "0:30"),
//! ]);
//! let session = SortSession::new(Arc::new(page), Arc::new(TracingStatusSink), SortConfig::default());
//! let report = session.start().await?;
//! assert_eq!(report.move_count(), 1);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{RecurringSort, RecurringSortConfig, SortSession};
pub use domain::models::{
    Config, LoopState, SortConfig, SortDirection, SortKey, SortKeyKind, SortOutcome, SortPhase,
    SortReport,
};
pub use domain::ports::{HostDocument, StatusSink};
pub use domain::{SortError, SortResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::Reconciler;
