//! Point-in-time capture of the rendered list.

use serde::{Deserialize, Serialize};

use super::geometry::ElementRef;

/// One reorderable row as rendered when the snapshot was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowView {
    /// Visual position, 0-based.
    pub index: usize,
    pub drag_handle: ElementRef,
    pub display: ElementRef,
    /// Whether the display sub-element has finished rendering its overlay text.
    pub rendered: bool,
    /// Text of the duration overlay, if present.
    pub duration_text: Option<String>,
    /// Text of the channel byline link, if present.
    pub channel_label: Option<String>,
}

/// Every reorderable row of the list, in visual order, at one generation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListSnapshot {
    pub generation: u64,
    pub rows: Vec<RowView>,
    /// Number of drag handles the host has materialised.
    pub drag_handle_count: usize,
    /// Number of display rows the host has materialised.
    pub display_count: usize,
    /// Whether the "more content pending" sentinel is in the document.
    pub loading_sentinel: bool,
}

impl ListSnapshot {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the key-bearing text of the last row is present yet.
    pub fn last_row_rendered(&self) -> bool {
        self.rows.last().is_none_or(|row| row.rendered)
    }

    /// Handles and display rows agree with each other and with `expected`.
    pub fn is_fully_loaded(&self, expected: usize) -> bool {
        self.drag_handle_count == self.display_count && self.display_count == expected
    }
}
