//! Spinner used as the status line while a sort runs.

use console::Term;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

use crate::domain::ports::StatusSink;

const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create a spinner for indeterminate operations
///
/// Drawing is disabled when stderr is not a terminal.
pub fn create_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
        spinner.set_style(style.tick_chars(SPINNER_CHARS));
    }
    if Term::stderr().is_term() {
        spinner.enable_steady_tick(Duration::from_millis(80));
    } else {
        spinner.set_draw_target(ProgressDrawTarget::hidden());
    }
    spinner
}

/// Shows the latest status string as the spinner message.
pub struct SpinnerStatusSink {
    bar: ProgressBar,
}

impl SpinnerStatusSink {
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }

    /// Hidden spinner, for JSON mode.
    pub fn hidden() -> Self {
        Self::new(ProgressBar::hidden())
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }

    pub fn finish(&self, message: impl Into<String>) {
        self.bar.finish_with_message(format!("✓ {}", message.into()));
    }

    pub fn abandon(&self, message: impl Into<String>) {
        self.bar.abandon_with_message(format!("✗ {}", message.into()));
    }
}

impl StatusSink for SpinnerStatusSink {
    fn set_status(&self, status: &str) {
        self.bar.set_message(status.replace('\n', " | "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_lines_are_flattened() {
        let sink = SpinnerStatusSink::hidden();
        sink.set_status("Loading more items - 301 items loaded\nsorting may take a long time");
        assert_eq!(
            sink.bar().message(),
            "Loading more items - 301 items loaded | sorting may take a long time"
        );
    }
}
