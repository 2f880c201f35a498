//! YAML playlist fixtures for the simulated page.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::playlist::{PlaylistItem, SimulatedPlaylist, SimulatedPlaylistOptions};
use crate::domain::errors::{SortError, SortResult};

/// A playlist description on disk.
///
/// ```yaml
/// page_size: 100
/// items:
///   - title: Intro
///     duration: "3:05"
///     channel: Some Channel
///   - title: Premiere
///     duration: Upcoming
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistFixture {
    #[serde(default)]
    pub page_size: Option<usize>,
    #[serde(default)]
    pub initially_loaded: Option<usize>,
    #[serde(default = "default_report_total")]
    pub report_total: bool,
    pub items: Vec<PlaylistItem>,
}

const fn default_report_total() -> bool {
    true
}

impl PlaylistFixture {
    pub fn from_yaml(content: &str) -> SortResult<Self> {
        let fixture: Self = serde_yaml::from_str(content)?;
        if fixture.page_size == Some(0) {
            return Err(SortError::Fixture("page_size must be greater than 0".to_string()));
        }
        Ok(fixture)
    }

    pub async fn load(path: &Path) -> SortResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SortError::Fixture(format!("{}: {e}", path.display())))?;
        Self::from_yaml(&content)
    }

    /// Write the fixture back, e.g. with the order a run produced.
    pub async fn save(&self, path: &Path) -> SortResult<()> {
        let content = serde_yaml::to_string(self)?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| SortError::Fixture(format!("{}: {e}", path.display())))
    }

    pub fn options(&self) -> SimulatedPlaylistOptions {
        let defaults = SimulatedPlaylistOptions::default();
        SimulatedPlaylistOptions {
            page_size: self.page_size.unwrap_or(defaults.page_size),
            initially_loaded: self.initially_loaded,
            report_total: self.report_total,
            ..defaults
        }
    }

    pub fn into_playlist(self) -> SimulatedPlaylist {
        let options = self.options();
        SimulatedPlaylist::new(self.items, options)
    }
}
