pub mod recurring_sort;
pub mod sort_session;

pub use recurring_sort::{
    RecurringSort, RecurringSortConfig, RecurringSortEvent, RecurringSortHandle,
    RecurringSortStatus, StopReason,
};
pub use sort_session::SortSession;
