//! Recurring sort daemon.
//!
//! Re-runs the sort on a fixed interval so a playlist that keeps receiving
//! new items stays ordered. Runs that collide with a manual run are skipped,
//! and the daemon stops itself after too many failed runs in a row.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify, RwLock};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{info, warn};

use super::sort_session::SortSession;
use crate::domain::errors::SortError;
use crate::domain::models::{ScheduleConfig, SortReport};

/// Configuration for the recurring sort.
#[derive(Debug, Clone)]
pub struct RecurringSortConfig {
    /// Interval between runs.
    pub interval: Duration,
    /// Whether to run once before the first interval elapses.
    pub run_immediately: bool,
    /// Maximum consecutive failures before stopping.
    pub max_consecutive_failures: u32,
    /// Stop after this many runs; unlimited when `None`.
    pub max_runs: Option<u64>,
}

impl Default for RecurringSortConfig {
    fn default() -> Self {
        Self::from(&ScheduleConfig::default())
    }
}

impl From<&ScheduleConfig> for RecurringSortConfig {
    fn from(config: &ScheduleConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_secs),
            run_immediately: config.run_immediately,
            max_consecutive_failures: config.max_consecutive_failures,
            max_runs: None,
        }
    }
}

impl RecurringSortConfig {
    /// Create config with custom interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }
}

/// Event emitted by the recurring sort.
#[derive(Debug, Clone)]
pub enum RecurringSortEvent {
    Started,
    RunStarted { run_number: u64 },
    RunCompleted {
        run_number: u64,
        report: SortReport,
        duration_ms: u64,
    },
    /// Another run held the session.
    RunSkipped { run_number: u64 },
    RunFailed { run_number: u64, error: String },
    Stopped { reason: StopReason },
}

/// Reason the recurring sort stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Requested,
    TooManyFailures,
    RunLimitReached,
}

/// Counters for the recurring sort.
#[derive(Debug, Clone, Default)]
pub struct RecurringSortStatus {
    pub running: bool,
    pub total_runs: u64,
    pub successful_runs: u64,
    pub failed_runs: u64,
    pub skipped_runs: u64,
    pub total_moves: u64,
    pub last_run: Option<DateTime<Utc>>,
}

/// Handle to control the recurring sort.
#[derive(Clone)]
pub struct RecurringSortHandle {
    stop_flag: Arc<AtomicBool>,
    wake: Arc<Notify>,
    status: Arc<RwLock<RecurringSortStatus>>,
    session: Arc<SortSession>,
}

impl RecurringSortHandle {
    /// Stop scheduling and cancel the run in flight, if any.
    pub async fn stop(&self) {
        self.stop_flag.store(true, Ordering::Release);
        self.wake.notify_one();
        self.session.cancel().await;
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_flag.load(Ordering::Acquire)
    }

    pub async fn status(&self) -> RecurringSortStatus {
        self.status.read().await.clone()
    }
}

/// Periodically runs a [`SortSession`].
pub struct RecurringSort {
    session: Arc<SortSession>,
    config: RecurringSortConfig,
    status: Arc<RwLock<RecurringSortStatus>>,
    stop_flag: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl RecurringSort {
    pub fn new(session: Arc<SortSession>, config: RecurringSortConfig) -> Self {
        Self {
            session,
            config,
            status: Arc::new(RwLock::new(RecurringSortStatus::default())),
            stop_flag: Arc::new(AtomicBool::new(false)),
            wake: Arc::new(Notify::new()),
        }
    }

    pub fn handle(&self) -> RecurringSortHandle {
        RecurringSortHandle {
            stop_flag: Arc::clone(&self.stop_flag),
            wake: Arc::clone(&self.wake),
            status: Arc::clone(&self.status),
            session: Arc::clone(&self.session),
        }
    }

    /// Spawn the schedule, returning a channel for events.
    pub fn run(self) -> mpsc::Receiver<RecurringSortEvent> {
        let (tx, rx) = mpsc::channel(100);

        tokio::spawn(async move {
            self.run_loop(tx).await;
        });

        rx
    }

    async fn run_loop(self, tx: mpsc::Sender<RecurringSortEvent>) {
        self.status.write().await.running = true;
        let _ = tx.send(RecurringSortEvent::Started).await;
        info!(interval_secs = self.config.interval.as_secs(), "recurring sort started");

        let mut consecutive_failures = 0u32;
        let mut timer = interval(self.config.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        if !self.config.run_immediately {
            // the first tick completes immediately
            timer.tick().await;
        }

        let reason = loop {
            tokio::select! {
                _ = timer.tick() => {}
                () = self.wake.notified() => {}
            }
            if self.stop_flag.load(Ordering::Acquire) {
                break StopReason::Requested;
            }

            let run_number = self.run_cycle(&tx, &mut consecutive_failures).await;

            if self.stop_flag.load(Ordering::Acquire) {
                break StopReason::Requested;
            }
            if consecutive_failures >= self.config.max_consecutive_failures {
                warn!(consecutive_failures, "recurring sort giving up");
                break StopReason::TooManyFailures;
            }
            if self.config.max_runs.is_some_and(|max| run_number >= max) {
                break StopReason::RunLimitReached;
            }
        };

        self.status.write().await.running = false;
        info!(?reason, "recurring sort stopped");
        let _ = tx.send(RecurringSortEvent::Stopped { reason }).await;
    }

    async fn run_cycle(
        &self,
        tx: &mpsc::Sender<RecurringSortEvent>,
        consecutive_failures: &mut u32,
    ) -> u64 {
        let run_number = {
            let mut status = self.status.write().await;
            status.total_runs += 1;
            status.total_runs
        };

        let _ = tx.send(RecurringSortEvent::RunStarted { run_number }).await;

        let start = Instant::now();
        let result = self.session.start().await;
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(report) => {
                *consecutive_failures = 0;
                {
                    let mut status = self.status.write().await;
                    status.successful_runs += 1;
                    status.total_moves += u64::try_from(report.move_count()).unwrap_or(u64::MAX);
                    status.last_run = Some(Utc::now());
                }
                let _ = tx
                    .send(RecurringSortEvent::RunCompleted {
                        run_number,
                        report,
                        duration_ms,
                    })
                    .await;
            }
            Err(SortError::AlreadyRunning) => {
                self.status.write().await.skipped_runs += 1;
                let _ = tx.send(RecurringSortEvent::RunSkipped { run_number }).await;
            }
            Err(e) => {
                *consecutive_failures += 1;
                self.status.write().await.failed_runs += 1;
                warn!(run_number, error = %e, "recurring sort run failed");
                let _ = tx
                    .send(RecurringSortEvent::RunFailed {
                        run_number,
                        error: e.to_string(),
                    })
                    .await;
            }
        }

        run_number
    }

    pub async fn status(&self) -> RecurringSortStatus {
        self.status.read().await.clone()
    }

    pub fn config(&self) -> &RecurringSortConfig {
        &self.config
    }
}
