//! Element handles, bounding boxes and the pointer events replayed against them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which sub-element of a row a handle points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPart {
    /// The reorder grip the host requires as the gesture origin.
    DragHandle,
    /// The thumbnail/metadata block the key is read from.
    Display,
}

/// Index-based handle into one captured snapshot.
///
/// Only valid while the document is still at `generation`; any host
/// mutation detaches every handle taken before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    pub generation: u64,
    pub row: usize,
    pub part: RowPart,
}

impl ElementRef {
    pub const fn drag_handle(generation: u64, row: usize) -> Self {
        Self { generation, row, part: RowPart::DragHandle }
    }

    pub const fn display(generation: u64, row: usize) -> Self {
        Self { generation, row, part: RowPart::Display }
    }
}

/// Viewport-relative bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    /// What a detached element reports.
    pub const ZERO: Self = Self { left: 0.0, top: 0.0, right: 0.0, bottom: 0.0 };

    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self { left, top, right, bottom }
    }

    /// Geometric centre, floored to whole pixels.
    #[allow(clippy::cast_possible_truncation)]
    pub fn center(&self) -> Point {
        Point {
            x: ((self.left + self.right) / 2.0).floor() as i64,
            y: ((self.top + self.bottom) / 2.0).floor() as i64,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    pub fn contains(&self, point: Point) -> bool {
        #[allow(clippy::cast_precision_loss)]
        let (x, y) = (point.x as f64, point.y as f64);
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

/// Client coordinates of a synthetic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

/// Low-level event types the host's reorder handling listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerEventKind {
    MouseMove,
    MouseEnter,
    MouseOver,
    MouseDown,
    DragStart,
    Drag,
    DragEnter,
    DragOver,
    Drop,
    DragEnd,
    MouseUp,
}

impl PointerEventKind {
    /// DOM event type name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MouseMove => "mousemove",
            Self::MouseEnter => "mouseenter",
            Self::MouseOver => "mouseover",
            Self::MouseDown => "mousedown",
            Self::DragStart => "dragstart",
            Self::Drag => "drag",
            Self::DragEnter => "dragenter",
            Self::DragOver => "dragover",
            Self::Drop => "drop",
            Self::DragEnd => "dragend",
            Self::MouseUp => "mouseup",
        }
    }
}

impl fmt::Display for PointerEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bubbling, cancelable synthetic event at a client position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub client: Point,
}
