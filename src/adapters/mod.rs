//! Host and status adapters.

pub mod simulated;
pub mod status;

pub use simulated::{PlaylistFixture, PlaylistItem, SimulatedPlaylist, SimulatedPlaylistOptions};
pub use status::{MemoryStatusSink, TracingStatusSink, WatchStatusSink};
