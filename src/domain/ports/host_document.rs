//! Host document port - the live page the controller reads and mutates.

use async_trait::async_trait;

use crate::domain::errors::SortResult;
use crate::domain::models::{ElementRef, ListSnapshot, PointerEvent, Rect};

/// Structural access to the host's virtualised list.
///
/// Handles returned inside a [`ListSnapshot`] are stamped with the snapshot
/// generation. Any mutation of the list (a completed drag, a lazily loaded
/// page, a re-render) advances the generation, after which older handles are
/// detached: [`bounding_rect`](Self::bounding_rect) reports [`Rect::ZERO`] and
/// [`is_attached`](Self::is_attached) reports `false` for them.
#[async_trait]
pub trait HostDocument: Send + Sync {
    /// Re-query every reorderable row, in visual order.
    async fn snapshot(&self) -> SortResult<ListSnapshot>;

    /// Whether the current page is a playlist page at all.
    async fn is_playlist_page(&self) -> SortResult<bool>;

    /// Whether the "more content pending" sentinel element is present.
    async fn has_loading_sentinel(&self) -> SortResult<bool>;

    /// Total item count displayed in the page header, when the page shows one.
    async fn reported_total(&self) -> SortResult<Option<usize>>;

    /// Current scroll offset of the scrolling container.
    async fn scroll_offset(&self) -> SortResult<u64>;

    /// Full scrollable height of the scrolling container.
    async fn scroll_extent(&self) -> SortResult<u64>;

    /// Request a new scroll offset; the host clamps it.
    async fn set_scroll_offset(&self, offset: u64) -> SortResult<()>;

    /// Bounding box of an element at the time of the call.
    async fn bounding_rect(&self, element: ElementRef) -> SortResult<Rect>;

    /// Whether the element still belongs to the current document.
    async fn is_attached(&self, element: ElementRef) -> SortResult<bool>;

    /// Dispatch a bubbling, cancelable synthetic event on an element.
    async fn dispatch(&self, element: ElementRef, event: PointerEvent) -> SortResult<()>;

    /// Scroll the row at `index` into view.
    async fn reveal_row(&self, index: usize) -> SortResult<()>;
}
