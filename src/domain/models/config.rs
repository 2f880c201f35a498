use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::retry_policy::RetryPolicy;
use super::sort_key::{SortDirection, SortKeyKind};

/// Main configuration structure for the playlist sorter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// What to sort by and in which direction
    #[serde(default)]
    pub sort: SortOptions,

    /// Scroll and settle delays
    #[serde(default)]
    pub timing: TimingConfig,

    /// Retry budgets for every wait-and-poll loop
    #[serde(default)]
    pub retry: RetryConfig,

    /// Recurring sort configuration
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Options the UI shell exposes as select boxes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SortOptions {
    #[serde(default)]
    pub direction: SortDirection,

    #[serde(default)]
    pub key: SortKeyKind,

    /// Force-load the whole list before sorting ("Sort all") instead of
    /// sorting only what is already rendered
    #[serde(default = "default_true")]
    pub auto_scroll_all: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            direction: SortDirection::default(),
            key: SortKeyKind::default(),
            auto_scroll_all: true,
        }
    }
}

/// Delay configuration, all in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TimingConfig {
    /// Wait after each scroll before polling the offset again
    #[serde(default = "default_scroll_delay_ms")]
    pub scroll_delay_ms: u64,

    /// Growth of the scroll delay for every round that made no progress
    #[serde(default = "default_scroll_delay_step_ms")]
    pub scroll_delay_step_ms: u64,

    /// Upper bound for the grown scroll delay
    #[serde(default = "default_max_scroll_delay_ms")]
    pub max_scroll_delay_ms: u64,

    /// Settle delay after each drag
    #[serde(default = "default_post_move_delay_ms")]
    pub post_move_delay_ms: u64,

    /// Extra settle delay per hundred loaded items
    #[serde(default = "default_post_move_delay_per_100_ms")]
    pub post_move_delay_per_100_ms: u64,
}

const fn default_scroll_delay_ms() -> u64 {
    500
}

const fn default_scroll_delay_step_ms() -> u64 {
    100
}

const fn default_max_scroll_delay_ms() -> u64 {
    5000
}

const fn default_post_move_delay_ms() -> u64 {
    1800
}

const fn default_post_move_delay_per_100_ms() -> u64 {
    250
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            scroll_delay_ms: default_scroll_delay_ms(),
            scroll_delay_step_ms: default_scroll_delay_step_ms(),
            max_scroll_delay_ms: default_max_scroll_delay_ms(),
            post_move_delay_ms: default_post_move_delay_ms(),
            post_move_delay_per_100_ms: default_post_move_delay_per_100_ms(),
        }
    }
}

/// Retry budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Scroll attempts while waiting for the offset to stop moving
    #[serde(default = "default_max_scroll_attempts")]
    pub max_scroll_attempts: u32,

    /// Scroll attempts when a specific offset was requested
    #[serde(default = "default_max_target_scroll_attempts")]
    pub max_target_scroll_attempts: u32,

    /// Load rounds before sorting proceeds on whatever is loaded
    #[serde(default = "default_max_load_rounds")]
    pub max_load_rounds: u32,

    /// Waits for the last row's text to render
    #[serde(default = "default_max_render_waits")]
    pub max_render_waits: u32,

    /// Waits for drag handles and display rows to agree
    #[serde(default = "default_max_stream_waits")]
    pub max_stream_waits: u32,

    /// Moves at one position with no effect before skipping past it
    #[serde(default = "default_max_stalled_moves")]
    pub max_stalled_moves: u32,

    /// Host errors tolerated in a row before the run fails
    #[serde(default = "default_max_host_errors")]
    pub max_host_errors: u32,

    /// Absolute cap on sorting passes
    #[serde(default = "default_max_passes")]
    pub max_passes: u32,
}

const fn default_max_scroll_attempts() -> u32 {
    50
}

const fn default_max_target_scroll_attempts() -> u32 {
    3
}

const fn default_max_load_rounds() -> u32 {
    100
}

const fn default_max_render_waits() -> u32 {
    10
}

const fn default_max_stream_waits() -> u32 {
    10
}

const fn default_max_stalled_moves() -> u32 {
    3
}

const fn default_max_host_errors() -> u32 {
    5
}

const fn default_max_passes() -> u32 {
    100_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_scroll_attempts: default_max_scroll_attempts(),
            max_target_scroll_attempts: default_max_target_scroll_attempts(),
            max_load_rounds: default_max_load_rounds(),
            max_render_waits: default_max_render_waits(),
            max_stream_waits: default_max_stream_waits(),
            max_stalled_moves: default_max_stalled_moves(),
            max_host_errors: default_max_host_errors(),
            max_passes: default_max_passes(),
        }
    }
}

/// Recurring sort configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScheduleConfig {
    /// Seconds between recurring runs
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Failed runs in a row before the schedule stops itself
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,

    /// Start with a run instead of waiting one interval first
    #[serde(default)]
    pub run_immediately: bool,
}

const fn default_interval_secs() -> u64 {
    3600
}

const fn default_max_consecutive_failures() -> u32 {
    3
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_consecutive_failures: default_max_consecutive_failures(),
            run_immediately: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Immutable settings for a single sort run.
///
/// Captured when the run starts; later config updates only affect the next run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub direction: SortDirection,
    pub key: SortKeyKind,
    pub auto_scroll_all: bool,
    pub timing: TimingConfig,
    pub retry: RetryConfig,
}

impl From<&Config> for SortConfig {
    fn from(config: &Config) -> Self {
        Self {
            direction: config.sort.direction,
            key: config.sort.key,
            auto_scroll_all: config.sort.auto_scroll_all,
            timing: config.timing,
            retry: config.retry,
        }
    }
}

impl Default for SortConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl SortConfig {
    /// Settle delay after a drag, proportional to the number of loaded items.
    pub fn settle_delay(&self, item_count: usize) -> Duration {
        let hundreds = u64::try_from(item_count / 100).unwrap_or(u64::MAX);
        let extra = self.timing.post_move_delay_per_100_ms.saturating_mul(hundreds);
        Duration::from_millis(self.timing.post_move_delay_ms.saturating_add(extra))
    }

    /// Policy for waiting until the scroll offset stops changing.
    pub const fn settle_scroll_policy(&self, scroll_delay_ms: u64) -> RetryPolicy {
        RetryPolicy::fixed(self.retry.max_scroll_attempts, scroll_delay_ms)
    }

    /// Policy for reaching a requested scroll offset.
    pub const fn target_scroll_policy(&self, scroll_delay_ms: u64) -> RetryPolicy {
        RetryPolicy::fixed(self.retry.max_target_scroll_attempts, scroll_delay_ms)
    }

    /// Scroll delay growth across rounds that made no progress.
    pub const fn scroll_growth_policy(&self) -> RetryPolicy {
        RetryPolicy::linear(
            self.retry.max_load_rounds,
            self.timing.scroll_delay_ms,
            self.timing.scroll_delay_step_ms,
            self.timing.max_scroll_delay_ms,
        )
    }

    /// Policy for waiting on a not-yet-rendered last row.
    pub const fn render_wait_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.retry.max_render_waits, self.timing.post_move_delay_ms)
    }

    /// Policy for waiting on handles and display rows to agree.
    pub const fn stream_wait_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.retry.max_stream_waits, self.timing.post_move_delay_ms)
    }
}
