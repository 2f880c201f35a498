//! Status sink port - where human-readable progress goes.

/// Receives the controller's current status line.
///
/// Each call overwrites the previous status; sinks never accumulate history.
pub trait StatusSink: Send + Sync {
    fn set_status(&self, status: &str);
}

impl<T: StatusSink + ?Sized> StatusSink for std::sync::Arc<T> {
    fn set_status(&self, status: &str) {
        (**self).set_status(status);
    }
}
