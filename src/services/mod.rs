pub mod cancellation;
pub mod comparator;
pub mod gesture_simulator;
pub mod key_extractor;
pub mod reconciler;
pub mod scroll_driver;

pub use cancellation::CancelFlag;
pub use gesture_simulator::{gesture_events, simulate_move, GestureSide};
pub use reconciler::{plan_move, Reconciler};
pub use scroll_driver::ScrollDriver;
