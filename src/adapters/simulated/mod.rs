//! Simulated host page, used by the CLI and the test suite.

pub mod fixture;
pub mod playlist;

pub use fixture::PlaylistFixture;
pub use playlist::{PlaylistItem, SimulatedPlaylist, SimulatedPlaylistOptions};
