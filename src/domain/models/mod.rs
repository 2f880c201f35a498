pub mod config;
pub mod geometry;
pub mod loop_state;
pub mod ranking;
pub mod report;
pub mod retry_policy;
pub mod snapshot;
pub mod sort_key;

pub use config::{
    Config, LoggingConfig, RetryConfig, ScheduleConfig, SortConfig, SortOptions, TimingConfig,
};
pub use geometry::{ElementRef, Point, PointerEvent, PointerEventKind, Rect, RowPart};
pub use loop_state::{LoopState, SortPhase};
pub use ranking::{PlannedMove, RankedItem};
pub use report::{Degradation, MoveRecord, SortOutcome, SortReport};
pub use retry_policy::{DelayStrategy, RetryOutcome, RetryPolicy};
pub use snapshot::{ListSnapshot, RowView};
pub use sort_key::{SortDirection, SortKey, SortKeyKind, CHANNEL_NOT_AVAILABLE};
