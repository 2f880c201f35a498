//! Drag-and-drop gesture replay.
//!
//! Replays the pointer lifecycle the host's reorder handling expects from a
//! real user dragging one row's grip onto another row. The simulator does
//! not verify the result; the controller does that from the next snapshot.

use tracing::{debug, instrument};

use crate::domain::errors::{SortError, SortResult};
use crate::domain::models::{ElementRef, Point, PointerEvent, PointerEventKind};
use crate::domain::ports::HostDocument;

/// Which element an event is dispatched on, or whose centre it is fired at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureSide {
    Source,
    Destination,
}

use GestureSide::{Destination, Source};
use PointerEventKind::{
    Drag, DragEnd, DragEnter, DragOver, DragStart, Drop, MouseDown, MouseEnter, MouseMove,
    MouseOver, MouseUp,
};

/// `(event, dispatched on, coordinates of)` in firing order.
const GESTURE_SEQUENCE: [(PointerEventKind, GestureSide, GestureSide); 16] = [
    // hover the grip and press
    (MouseMove, Source, Source),
    (MouseEnter, Source, Source),
    (MouseOver, Source, Source),
    (MouseDown, Source, Source),
    // start dragging over to the drop target
    (DragStart, Source, Source),
    (Drag, Source, Source),
    (MouseMove, Source, Source),
    (Drag, Source, Destination),
    (MouseMove, Destination, Destination),
    // hover the drop target
    (MouseEnter, Destination, Destination),
    (DragEnter, Destination, Destination),
    (MouseOver, Destination, Destination),
    (DragOver, Destination, Destination),
    // release
    (Drop, Destination, Destination),
    (DragEnd, Source, Destination),
    (MouseUp, Source, Destination),
];

/// The full event sequence for a drag from `source` to `destination` centres.
pub fn gesture_events(source: Point, destination: Point) -> Vec<(GestureSide, PointerEvent)> {
    GESTURE_SEQUENCE
        .iter()
        .map(|&(kind, target, at)| {
            let client = match at {
                Source => source,
                Destination => destination,
            };
            (target, PointerEvent { kind, client })
        })
        .collect()
}

/// Drag `drag_handle` onto `drop_target`'s position.
///
/// Both handles must come from the snapshot taken immediately before; a
/// detached handle aborts the gesture with [`SortError::StaleReference`]
/// before any event is fired.
#[instrument(skip(host), fields(from = drag_handle.row, to = drop_target.row))]
pub async fn simulate_move<H>(
    host: &H,
    drag_handle: ElementRef,
    drop_target: ElementRef,
) -> SortResult<()>
where
    H: HostDocument + ?Sized,
{
    for element in [drag_handle, drop_target] {
        if !host.is_attached(element).await? {
            return Err(SortError::StaleReference {
                row: element.row,
                generation: element.generation,
            });
        }
    }

    let source = host.bounding_rect(drag_handle).await?.center();
    let destination = host.bounding_rect(drop_target).await?.center();

    for (side, event) in gesture_events(source, destination) {
        let element = match side {
            Source => drag_handle,
            Destination => drop_target,
        };
        host.dispatch(element, event).await?;
    }

    debug!(?source, ?destination, "drag gesture dispatched");
    Ok(())
}
