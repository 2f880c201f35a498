//! Status sink implementations.

use std::sync::Mutex;
use tokio::sync::watch;
use tracing::info;

use crate::domain::ports::StatusSink;

/// Writes every status line to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatusSink;

impl StatusSink for TracingStatusSink {
    fn set_status(&self, status: &str) {
        info!(target: "playlist_sort::status", "{status}");
    }
}

/// Publishes the latest status line on a watch channel.
///
/// Observers only ever see the most recent line, which is what a status
/// label shows anyway.
#[derive(Debug)]
pub struct WatchStatusSink {
    tx: watch::Sender<String>,
}

impl WatchStatusSink {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(String::new());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }
}

impl Default for WatchStatusSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for WatchStatusSink {
    fn set_status(&self, status: &str) {
        self.tx.send_replace(status.to_string());
    }
}

/// Keeps every status line; handy for assertions.
#[derive(Debug, Default)]
pub struct MemoryStatusSink {
    history: Mutex<Vec<String>>,
}

impl MemoryStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<String> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    pub fn current(&self) -> Option<String> {
        self.history.lock().ok().and_then(|h| h.last().cloned())
    }
}

impl StatusSink for MemoryStatusSink {
    fn set_status(&self, status: &str) {
        if let Ok(mut history) = self.history.lock() {
            history.push(status.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn watch_sink_keeps_the_latest_line() {
        let sink = WatchStatusSink::new();
        let mut rx = sink.subscribe();

        sink.set_status("Loading more items - 100 items loaded");
        sink.set_status("100 items loaded.");

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), "100 items loaded.");
        assert_eq!(sink.current(), "100 items loaded.");
    }

    #[test]
    fn memory_sink_records_history() {
        let sink = MemoryStatusSink::new();
        assert_eq!(sink.current(), None);
        sink.set_status("one");
        sink.set_status("two");
        assert_eq!(sink.history(), vec!["one", "two"]);
        assert_eq!(sink.current().as_deref(), Some("two"));
    }
}
