//! SortSession - the controller as seen by a UI shell.
//!
//! Owns the long-lived pieces (host, status sink, settings, cancel flag and
//! loop state) and starts one [`Reconciler`] run at a time. Settings changed
//! while a run is in flight only apply to the next run.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::errors::{SortError, SortResult};
use crate::domain::models::{LoopState, SortConfig, SortReport};
use crate::domain::ports::{HostDocument, StatusSink};
use crate::services::{CancelFlag, Reconciler};

/// Whether a run is active. Starting, ending and cancelling a run all
/// update the cancel flag under this lock, so a cancel is either applied to
/// the active run or rejected.
#[derive(Debug, Default)]
struct RunGate {
    running: Mutex<bool>,
}

impl RunGate {
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the running flag and any leftover cancel request when a run ends,
/// however it ends.
struct RunningGuard {
    gate: Arc<RunGate>,
    cancel: CancelFlag,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        let mut running = self.gate.lock();
        self.cancel.reset();
        *running = false;
    }
}

pub struct SortSession {
    host: Arc<dyn HostDocument>,
    sink: Arc<dyn StatusSink>,
    config: RwLock<SortConfig>,
    cancel: CancelFlag,
    state: Arc<RwLock<LoopState>>,
    gate: Arc<RunGate>,
}

impl SortSession {
    pub fn new(host: Arc<dyn HostDocument>, sink: Arc<dyn StatusSink>, config: SortConfig) -> Self {
        let state = LoopState::new(config.timing.scroll_delay_ms, config.timing.post_move_delay_ms);
        Self {
            host,
            sink,
            config: RwLock::new(config),
            cancel: CancelFlag::new(),
            state: Arc::new(RwLock::new(state)),
            gate: Arc::new(RunGate::default()),
        }
    }

    /// Run a sort to completion or cancellation.
    ///
    /// Fails with [`SortError::AlreadyRunning`] when another run is active.
    /// A [`cancel`](Self::cancel) accepted at any point after this call
    /// marks the session running applies to this run.
    pub async fn start(&self) -> SortResult<SortReport> {
        {
            let mut running = self.gate.lock();
            if *running {
                debug!("start ignored, a run is in progress");
                return Err(SortError::AlreadyRunning);
            }
            self.cancel.reset();
            *running = true;
        }
        let _guard = RunningGuard {
            gate: Arc::clone(&self.gate),
            cancel: self.cancel.clone(),
        };

        let config = *self.config.read().await;
        info!(key = %config.key, direction = %config.direction, all = config.auto_scroll_all, "starting sort");
        let reconciler = Reconciler::new(
            Arc::clone(&self.host),
            Arc::clone(&self.sink),
            config,
            self.cancel.clone(),
            Arc::clone(&self.state),
        );
        reconciler.run().await
    }

    /// Request the active run to stop at its next checkpoint.
    ///
    /// Returns `false` when nothing is running.
    pub async fn cancel(&self) -> bool {
        {
            let running = self.gate.lock();
            if !*running {
                return false;
            }
            self.cancel.cancel();
        }
        let mut state = self.state.write().await;
        if self.cancel.is_cancelled() {
            state.cancel_requested = true;
        }
        info!("sort cancellation requested");
        true
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub async fn update_config(&self, config: SortConfig) {
        *self.config.write().await = config;
    }

    pub async fn config(&self) -> SortConfig {
        *self.config.read().await
    }

    pub async fn state(&self) -> LoopState {
        self.state.read().await.clone()
    }

    pub fn is_running(&self) -> bool {
        *self.gate.lock()
    }
}
