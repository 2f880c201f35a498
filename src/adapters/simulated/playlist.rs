//! In-memory playlist page.
//!
//! Behaves like the host's lazily rendered list: rows materialise a page at a
//! time when the container is scrolled to the bottom, a "loading more"
//! sentinel is shown while more remain, freshly changed rows can take a few
//! reads to render, and a reorder only happens when the full drag lifecycle
//! is replayed onto a row. Every mutation starts a new snapshot generation,
//! which detaches all element references handed out before it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::domain::errors::{SortError, SortResult};
use crate::domain::models::{
    ElementRef, ListSnapshot, PointerEvent, PointerEventKind, Rect, RowPart, RowView,
};
use crate::domain::ports::HostDocument;

const HANDLE_WIDTH: f64 = 40.0;
const ROW_WIDTH: f64 = 600.0;

/// One playlist entry as the page would render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub title: String,
    /// Time-status overlay text, e.g. `"3:05"` or `"Upcoming"`
    #[serde(default)]
    pub duration: Option<String>,
    /// Channel byline
    #[serde(default)]
    pub channel: Option<String>,
}

impl PlaylistItem {
    pub fn with_duration(title: impl Into<String>, duration: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            duration: Some(duration.into()),
            channel: None,
        }
    }

    pub fn with_channel(title: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            duration: None,
            channel: Some(channel.into()),
        }
    }

    /// Attach a channel byline to an item built with a duration.
    #[must_use]
    pub fn and_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }
}

/// Knobs for the simulated page.
#[derive(Debug, Clone)]
pub struct SimulatedPlaylistOptions {
    /// Rows materialised per scroll to the bottom
    pub page_size: usize,
    /// Rows present before any scrolling; defaults to one page
    pub initially_loaded: Option<usize>,
    /// Whether the page header reports the total item count
    pub report_total: bool,
    /// Stop loading at this many rows while still showing the sentinel
    pub load_limit: Option<usize>,
    pub row_height: u64,
    pub viewport_height: u64,
    /// Reads during which the last row shows no text after a change
    pub render_lag_snapshots: u32,
    /// Reads during which freshly loaded rows have no drag handle
    pub handle_lag_snapshots: u32,
    /// Accept drags without reordering anything
    pub ignore_moves: bool,
    pub is_playlist_page: bool,
    /// Number of initial snapshot reads that fail
    pub fail_snapshots: u32,
    /// Number of initial snapshot reads followed at once by a re-render,
    /// leaving every handle they returned detached
    pub rerender_snapshots: u32,
}

impl Default for SimulatedPlaylistOptions {
    fn default() -> Self {
        Self {
            page_size: 100,
            initially_loaded: None,
            report_total: true,
            load_limit: None,
            row_height: 100,
            viewport_height: 800,
            render_lag_snapshots: 0,
            handle_lag_snapshots: 0,
            ignore_moves: false,
            is_playlist_page: true,
            fail_snapshots: 0,
            rerender_snapshots: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    source: usize,
    drop_row: Option<usize>,
}

#[derive(Debug)]
struct PendingGrowth {
    after_moves: usize,
    items: Vec<PlaylistItem>,
}

#[derive(Debug)]
struct PageState {
    items: Vec<PlaylistItem>,
    loaded: usize,
    handles_ready: usize,
    generation: u64,
    scroll_offset: u64,
    render_lag: u32,
    handle_lag: u32,
    fail_snapshots: u32,
    rerender_snapshots: u32,
    ignore_moves: bool,
    pressed: Option<usize>,
    drag: Option<DragState>,
    events: Vec<(ElementRef, PointerEvent)>,
    moves_applied: Vec<(usize, usize)>,
    growth: Option<PendingGrowth>,
}

impl PageState {
    fn load_ceiling(&self, options: &SimulatedPlaylistOptions) -> usize {
        options
            .load_limit
            .map_or(self.items.len(), |limit| limit.min(self.items.len()))
    }

    fn max_offset(&self, options: &SimulatedPlaylistOptions) -> u64 {
        self.content_height(options)
            .saturating_sub(options.viewport_height)
    }

    fn content_height(&self, options: &SimulatedPlaylistOptions) -> u64 {
        u64::try_from(self.loaded)
            .unwrap_or(u64::MAX)
            .saturating_mul(options.row_height)
    }

    fn row_rect(&self, row: usize, options: &SimulatedPlaylistOptions) -> Rect {
        let height = options.row_height as f64;
        let top = row as f64 * height - self.scroll_offset as f64;
        Rect::new(0.0, top, ROW_WIDTH, top + height)
    }

    fn is_attached(&self, element: ElementRef) -> bool {
        if element.generation != self.generation {
            return false;
        }
        match element.part {
            RowPart::DragHandle => element.row < self.handles_ready.min(self.loaded),
            RowPart::Display => element.row < self.loaded,
        }
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.pressed = None;
        self.drag = None;
    }

    fn load_next_page(&mut self, options: &SimulatedPlaylistOptions) {
        let ceiling = self.load_ceiling(options);
        if self.loaded >= ceiling {
            return;
        }
        self.loaded = (self.loaded + options.page_size.max(1)).min(ceiling);
        if options.handle_lag_snapshots > 0 {
            self.handle_lag = options.handle_lag_snapshots;
        } else {
            self.handles_ready = self.loaded;
        }
        self.render_lag = options.render_lag_snapshots;
        self.invalidate();
        debug!(loaded = self.loaded, total = self.items.len(), "simulated page loaded");
    }

    fn apply_move(&mut self, source: usize, target: usize, options: &SimulatedPlaylistOptions) {
        if self.ignore_moves {
            debug!(source, target, "simulated page ignored drop");
            return;
        }
        let item = self.items.remove(source);
        self.items.insert(target, item);
        self.moves_applied.push((source, target));
        self.render_lag = options.render_lag_snapshots;
        self.invalidate();

        let due = self
            .growth
            .as_ref()
            .is_some_and(|growth| self.moves_applied.len() >= growth.after_moves);
        if due {
            if let Some(growth) = self.growth.take() {
                self.grow(growth.items);
            }
        }
    }

    /// Append items; when the list was fully loaded they appear immediately.
    fn grow(&mut self, items: Vec<PlaylistItem>) {
        let was_complete = self.loaded == self.items.len();
        self.items.extend(items);
        if was_complete {
            self.loaded = self.items.len();
            self.handles_ready = self.loaded;
        }
        self.invalidate();
    }

    fn handle_event(&mut self, element: ElementRef, event: PointerEvent, options: &SimulatedPlaylistOptions) {
        match (event.kind, element.part) {
            (PointerEventKind::MouseDown, RowPart::DragHandle) => {
                self.pressed = Some(element.row);
            }
            (PointerEventKind::DragStart, RowPart::DragHandle) => {
                if self.pressed == Some(element.row) {
                    self.drag = Some(DragState {
                        source: element.row,
                        drop_row: None,
                    });
                }
            }
            (PointerEventKind::Drop, _) => {
                let inside = self.row_rect(element.row, options).contains(event.client);
                if let Some(drag) = self.drag.as_mut() {
                    if inside {
                        drag.drop_row = Some(element.row);
                    }
                }
            }
            (PointerEventKind::DragEnd, _) => {
                if let Some(DragState {
                    source,
                    drop_row: Some(target),
                }) = self.drag.take()
                {
                    self.apply_move(source, target, options);
                }
            }
            (PointerEventKind::MouseUp, _) => {
                self.pressed = None;
            }
            _ => {}
        }
    }
}

/// Simulated host page implementing [`HostDocument`].
#[derive(Clone)]
pub struct SimulatedPlaylist {
    state: Arc<Mutex<PageState>>,
    options: Arc<SimulatedPlaylistOptions>,
}

impl SimulatedPlaylist {
    pub fn new(items: Vec<PlaylistItem>, options: SimulatedPlaylistOptions) -> Self {
        let ceiling = options
            .load_limit
            .map_or(items.len(), |limit| limit.min(items.len()));
        let loaded = options
            .initially_loaded
            .unwrap_or(options.page_size)
            .min(ceiling);
        let state = PageState {
            items,
            loaded,
            handles_ready: loaded,
            generation: 1,
            scroll_offset: 0,
            render_lag: 0,
            handle_lag: 0,
            fail_snapshots: options.fail_snapshots,
            rerender_snapshots: options.rerender_snapshots,
            ignore_moves: options.ignore_moves,
            pressed: None,
            drag: None,
            events: Vec::new(),
            moves_applied: Vec::new(),
            growth: None,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            options: Arc::new(options),
        }
    }

    /// Fully loaded page with default options.
    pub fn loaded(items: Vec<PlaylistItem>) -> Self {
        let count = items.len();
        Self::new(
            items,
            SimulatedPlaylistOptions {
                initially_loaded: Some(count),
                ..Default::default()
            },
        )
    }

    /// Current order of every item, loaded or not.
    pub async fn items(&self) -> Vec<PlaylistItem> {
        self.state.lock().await.items.clone()
    }

    pub async fn titles(&self) -> Vec<String> {
        self.state
            .lock()
            .await
            .items
            .iter()
            .map(|item| item.title.clone())
            .collect()
    }

    /// `(from, to)` of every reorder the page accepted.
    pub async fn moves_applied(&self) -> Vec<(usize, usize)> {
        self.state.lock().await.moves_applied.clone()
    }

    /// Every event dispatched on an attached element.
    pub async fn events(&self) -> Vec<(ElementRef, PointerEvent)> {
        self.state.lock().await.events.clone()
    }

    pub async fn loaded_count(&self) -> usize {
        self.state.lock().await.loaded
    }

    pub async fn append_items(&self, items: Vec<PlaylistItem>) {
        self.state.lock().await.grow(items);
    }

    /// Append `items` once `after_moves` reorders have been applied.
    pub async fn grow_after_moves(&self, after_moves: usize, items: Vec<PlaylistItem>) {
        self.state.lock().await.growth = Some(PendingGrowth { after_moves, items });
    }

    pub async fn set_ignore_moves(&self, ignore: bool) {
        self.state.lock().await.ignore_moves = ignore;
    }
}

#[async_trait]
impl HostDocument for SimulatedPlaylist {
    async fn snapshot(&self) -> SortResult<ListSnapshot> {
        let mut state = self.state.lock().await;
        if state.fail_snapshots > 0 {
            state.fail_snapshots -= 1;
            return Err(SortError::Host("playlist container not found".to_string()));
        }

        if state.handle_lag > 0 {
            state.handle_lag -= 1;
        } else {
            state.handles_ready = state.loaded;
        }
        let unrendered_last = state.render_lag > 0;
        state.render_lag = state.render_lag.saturating_sub(1);

        let drag_handle_count = state.handles_ready.min(state.loaded);
        let display_count = state.loaded;
        let visible = drag_handle_count.min(display_count);
        let generation = state.generation;

        let rows = state.items[..visible]
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let rendered = !(unrendered_last && index + 1 == display_count);
                RowView {
                    index,
                    drag_handle: ElementRef::drag_handle(generation, index),
                    display: ElementRef::display(generation, index),
                    rendered,
                    duration_text: item.duration.clone().filter(|_| rendered),
                    channel_label: item.channel.clone().filter(|_| rendered),
                }
            })
            .collect();

        let loading_sentinel = state.loaded < state.items.len();
        if state.rerender_snapshots > 0 {
            state.rerender_snapshots -= 1;
            state.invalidate();
            debug!(generation = state.generation, "simulated page re-rendered after read");
        }

        Ok(ListSnapshot {
            generation,
            rows,
            drag_handle_count,
            display_count,
            loading_sentinel,
        })
    }

    async fn is_playlist_page(&self) -> SortResult<bool> {
        Ok(self.options.is_playlist_page)
    }

    async fn has_loading_sentinel(&self) -> SortResult<bool> {
        let state = self.state.lock().await;
        Ok(state.loaded < state.items.len())
    }

    async fn reported_total(&self) -> SortResult<Option<usize>> {
        if !self.options.report_total {
            return Ok(None);
        }
        Ok(Some(self.state.lock().await.items.len()))
    }

    async fn scroll_offset(&self) -> SortResult<u64> {
        Ok(self.state.lock().await.scroll_offset)
    }

    async fn scroll_extent(&self) -> SortResult<u64> {
        Ok(self.state.lock().await.content_height(&self.options))
    }

    async fn set_scroll_offset(&self, offset: u64) -> SortResult<()> {
        let mut state = self.state.lock().await;
        let max_offset = state.max_offset(&self.options);
        state.scroll_offset = offset.min(max_offset);
        if state.scroll_offset >= max_offset {
            state.load_next_page(&self.options);
        }
        Ok(())
    }

    async fn bounding_rect(&self, element: ElementRef) -> SortResult<Rect> {
        let state = self.state.lock().await;
        if !state.is_attached(element) {
            return Ok(Rect::ZERO);
        }
        let row = state.row_rect(element.row, &self.options);
        Ok(match element.part {
            RowPart::DragHandle => Rect::new(row.left, row.top, HANDLE_WIDTH, row.bottom),
            RowPart::Display => Rect::new(HANDLE_WIDTH, row.top, row.right, row.bottom),
        })
    }

    async fn is_attached(&self, element: ElementRef) -> SortResult<bool> {
        Ok(self.state.lock().await.is_attached(element))
    }

    async fn dispatch(&self, element: ElementRef, event: PointerEvent) -> SortResult<()> {
        let mut state = self.state.lock().await;
        if !state.is_attached(element) {
            debug!(row = element.row, kind = %event.kind, "event on detached element ignored");
            return Ok(());
        }
        trace!(row = element.row, kind = %event.kind, x = event.client.x, y = event.client.y, "event dispatched");
        state.events.push((element, event));
        state.handle_event(element, event, &self.options);
        Ok(())
    }

    async fn reveal_row(&self, index: usize) -> SortResult<()> {
        let mut state = self.state.lock().await;
        let top = u64::try_from(index)
            .unwrap_or(u64::MAX)
            .saturating_mul(self.options.row_height);
        state.scroll_offset = top.min(state.max_offset(&self.options));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Point;
    use crate::services::gesture_simulator::simulate_move;

    fn items(durations: &[&str]) -> Vec<PlaylistItem> {
        durations
            .iter()
            .enumerate()
            .map(|(i, d)| PlaylistItem::with_duration(format!("video {i}"), *d))
            .collect()
    }

    #[tokio::test]
    async fn full_gesture_reorders_rows() {
        let page = SimulatedPlaylist::loaded(items(&["3:00", "1:00", "2:00"]));
        let snapshot = page.snapshot().await.unwrap();

        simulate_move(&page, snapshot.rows[1].drag_handle, snapshot.rows[0].drag_handle)
            .await
            .unwrap();

        assert_eq!(page.moves_applied().await, vec![(1, 0)]);
        assert_eq!(page.titles().await, vec!["video 1", "video 0", "video 2"]);
    }

    #[tokio::test]
    async fn mutation_detaches_earlier_references() {
        let page = SimulatedPlaylist::loaded(items(&["3:00", "1:00", "2:00"]));
        let stale = page.snapshot().await.unwrap();
        page.append_items(items(&["4:00"])).await;

        let err = simulate_move(&page, stale.rows[1].drag_handle, stale.rows[0].drag_handle)
            .await
            .unwrap_err();
        assert!(matches!(err, SortError::StaleReference { row: 1, .. }));
        assert_eq!(page.bounding_rect(stale.rows[0].display).await.unwrap(), Rect::ZERO);
        assert!(page.events().await.is_empty());
    }

    #[tokio::test]
    async fn rerendered_reads_hand_out_detached_handles() {
        let page = SimulatedPlaylist::new(
            items(&["3:00", "1:00"]),
            SimulatedPlaylistOptions {
                rerender_snapshots: 1,
                ..Default::default()
            },
        );

        let first = page.snapshot().await.unwrap();
        assert!(!page.is_attached(first.rows[0].drag_handle).await.unwrap());

        let second = page.snapshot().await.unwrap();
        assert!(second.generation > first.generation);
        assert!(page.is_attached(second.rows[0].drag_handle).await.unwrap());
    }

    #[tokio::test]
    async fn drop_outside_the_row_is_not_a_reorder() {
        let page = SimulatedPlaylist::loaded(items(&["3:00", "1:00"]));
        let snapshot = page.snapshot().await.unwrap();
        let source = snapshot.rows[1].drag_handle;
        let target = snapshot.rows[0].drag_handle;
        let far_away = PointerEvent {
            kind: PointerEventKind::Drop,
            client: Point { x: 5000, y: 5000 },
        };

        for kind in [PointerEventKind::MouseDown, PointerEventKind::DragStart] {
            let client = page.bounding_rect(source).await.unwrap().center();
            page.dispatch(source, PointerEvent { kind, client }).await.unwrap();
        }
        page.dispatch(target, far_away).await.unwrap();
        let client = Point { x: 0, y: 0 };
        page.dispatch(source, PointerEvent { kind: PointerEventKind::DragEnd, client })
            .await
            .unwrap();

        assert!(page.moves_applied().await.is_empty());
    }

    #[tokio::test]
    async fn rows_without_handles_are_left_out() {
        let page = SimulatedPlaylist::new(
            items(&["1:00"; 15]),
            SimulatedPlaylistOptions {
                page_size: 10,
                handle_lag_snapshots: 1,
                ..Default::default()
            },
        );
        page.set_scroll_offset(u64::MAX).await.unwrap();

        let lagging = page.snapshot().await.unwrap();
        assert_eq!(lagging.display_count, 15);
        assert_eq!(lagging.drag_handle_count, 10);
        assert_eq!(lagging.len(), 10);

        let settled = page.snapshot().await.unwrap();
        assert!(settled.is_fully_loaded(15));
    }

    #[tokio::test]
    async fn render_lag_hides_last_row_text() {
        let page = SimulatedPlaylist::new(
            items(&["1:00", "2:00"]),
            SimulatedPlaylistOptions {
                initially_loaded: Some(2),
                render_lag_snapshots: 1,
                ..Default::default()
            },
        );
        let snapshot = page.snapshot().await.unwrap();
        simulate_move(&page, snapshot.rows[1].drag_handle, snapshot.rows[0].drag_handle)
            .await
            .unwrap();

        let lagging = page.snapshot().await.unwrap();
        assert!(!lagging.last_row_rendered());
        assert_eq!(lagging.rows[1].duration_text, None);
        assert!(page.snapshot().await.unwrap().last_row_rendered());
    }

    #[tokio::test]
    async fn reveal_never_loads_more() {
        let page = SimulatedPlaylist::new(
            items(&["1:00"; 30]),
            SimulatedPlaylistOptions {
                page_size: 10,
                ..Default::default()
            },
        );
        page.reveal_row(9).await.unwrap();
        assert_eq!(page.loaded_count().await, 10);
        assert!(page.has_loading_sentinel().await.unwrap());
    }
}
