//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use playlist_sort::adapters::{MemoryStatusSink, PlaylistItem, SimulatedPlaylist, SimulatedPlaylistOptions};
use playlist_sort::domain::models::SortConfig;
use playlist_sort::domain::ports::StatusSink;
use playlist_sort::services::CancelFlag;
use playlist_sort::Reconciler;

/// Run settings with millisecond delays.
pub fn fast_config() -> SortConfig {
    let mut config = SortConfig::default();
    config.timing.scroll_delay_ms = 1;
    config.timing.scroll_delay_step_ms = 1;
    config.timing.max_scroll_delay_ms = 5;
    config.timing.post_move_delay_ms = 1;
    config.timing.post_move_delay_per_100_ms = 0;
    config
}

pub fn durations(values: &[&str]) -> Vec<PlaylistItem> {
    values
        .iter()
        .enumerate()
        .map(|(i, d)| PlaylistItem::with_duration(format!("video {i}"), *d))
        .collect()
}

pub fn channels(values: &[&str]) -> Vec<PlaylistItem> {
    values
        .iter()
        .enumerate()
        .map(|(i, c)| PlaylistItem::with_channel(format!("video {i}"), *c))
        .collect()
}

pub fn loaded_page(items: Vec<PlaylistItem>) -> SimulatedPlaylist {
    SimulatedPlaylist::loaded(items)
}

pub fn paged(items: Vec<PlaylistItem>, page_size: usize) -> SimulatedPlaylist {
    SimulatedPlaylist::new(
        items,
        SimulatedPlaylistOptions {
            page_size,
            ..Default::default()
        },
    )
}

/// Reconciler over `page` recording every status line.
pub fn reconciler(page: &SimulatedPlaylist, config: SortConfig) -> (Reconciler, Arc<MemoryStatusSink>) {
    let sink = Arc::new(MemoryStatusSink::new());
    let reconciler = Reconciler::standalone(Arc::new(page.clone()), sink.clone(), config);
    (reconciler, sink)
}

/// Status sink that requests cancellation on the first line containing `trigger`.
pub struct CancelOnStatus {
    pub trigger: &'static str,
    pub flag: CancelFlag,
    pub inner: MemoryStatusSink,
}

impl StatusSink for CancelOnStatus {
    fn set_status(&self, status: &str) {
        if status.contains(self.trigger) {
            self.flag.cancel();
        }
        self.inner.set_status(status);
    }
}

pub async fn titles(page: &SimulatedPlaylist) -> Vec<String> {
    page.titles().await
}
