//! Reconciliation loop - the sort controller.
//!
//! State machine `Idle -> Loading -> Sorting -> {Converged | Cancelled}`.
//! Every sorting pass re-reads the live list, ranks it, and performs at most
//! one corrective drag before waiting for the host to settle. Nothing is
//! carried across passes except counters: handles are always taken from the
//! snapshot of the current pass.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::domain::errors::{SortError, SortResult};
use crate::domain::models::{
    Degradation, ListSnapshot, LoopState, MoveRecord, PlannedMove, RankedItem, SortConfig,
    SortOutcome, SortPhase, SortReport,
};
use crate::domain::ports::{HostDocument, StatusSink};
use crate::services::cancellation::CancelFlag;
use crate::services::scroll_driver::ScrollDriver;
use crate::services::{comparator, gesture_simulator, key_extractor};

const MANY_ITEMS: usize = 300;
const TOO_MANY_ITEMS: usize = 600;

/// Find the first position at or after `floor` whose occupant is misplaced,
/// and the move that fixes it.
///
/// The returned move drags the item that belongs at `to` from wherever it is
/// now onto the row currently at `to`.
pub fn plan_move(ranked: &[RankedItem], floor: usize) -> Option<PlannedMove> {
    let to = ranked
        .iter()
        .skip(floor)
        .find(|item| !item.is_in_place())?
        .current_position;
    let from = ranked.iter().find(|item| item.desired_position == to)?;
    Some(PlannedMove {
        from: from.current_position,
        to,
        key: from.key.clone(),
    })
}

/// Result of one sorting pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassOutcome {
    /// A drag was performed and the settle delay has elapsed.
    Moved,
    /// The list was not ready; a delay has elapsed, nothing was moved.
    Waited,
    /// The item count changed, or more items may load; go back to loading.
    Reload { visible_sorted: bool },
    /// Visible list matches the target order and nothing more will load.
    Converged,
}

/// Per-run bookkeeping that never leaves the controller.
#[derive(Debug, Default)]
struct RunProgress {
    moves: Vec<MoveRecord>,
    degradations: Vec<Degradation>,
    known_count: usize,
    stalled_load_rounds: u32,
    host_errors: u32,
    render_waits: u32,
    stream_waits: u32,
    load_degraded: bool,
    render_degraded: bool,
    stream_degraded: bool,
    last_move_to: Option<usize>,
    repeated_moves: u32,
    floor: usize,
    passes: u32,
    last_status: String,
}

impl RunProgress {
    fn degrade(&mut self, degradation: Degradation) {
        warn!(%degradation, "continuing in degraded mode");
        self.degradations.push(degradation);
    }
}

/// Drives one sort run against a host document.
pub struct Reconciler {
    host: Arc<dyn HostDocument>,
    sink: Arc<dyn StatusSink>,
    config: SortConfig,
    cancel: CancelFlag,
    state: Arc<RwLock<LoopState>>,
}

impl Reconciler {
    pub fn new(
        host: Arc<dyn HostDocument>,
        sink: Arc<dyn StatusSink>,
        config: SortConfig,
        cancel: CancelFlag,
        state: Arc<RwLock<LoopState>>,
    ) -> Self {
        Self {
            host,
            sink,
            config,
            cancel,
            state,
        }
    }

    /// Create a controller with its own cancel flag and state.
    pub fn standalone(
        host: Arc<dyn HostDocument>,
        sink: Arc<dyn StatusSink>,
        config: SortConfig,
    ) -> Self {
        let state = LoopState::new(config.timing.scroll_delay_ms, config.timing.post_move_delay_ms);
        Self::new(host, sink, config, CancelFlag::new(), Arc::new(RwLock::new(state)))
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub async fn state(&self) -> LoopState {
        self.state.read().await.clone()
    }

    /// Run until the list converges or the run is cancelled.
    ///
    /// A cancel requested before the call is honoured at the first
    /// checkpoint. The cancel flag is cleared when the run ends.
    pub async fn run(&self) -> SortResult<SortReport> {
        let run_id = {
            let mut state = self.state.write().await;
            *state = LoopState::new(
                self.config.timing.scroll_delay_ms,
                self.config.timing.post_move_delay_ms,
            );
            // a cancel accepted before the run got here still applies
            state.cancel_requested = self.cancel.is_cancelled();
            state.run_id
        };

        let span = info_span!(
            "sort_run",
            %run_id,
            key = %self.config.key,
            direction = %self.config.direction,
        );
        let result = self.run_phases(run_id).instrument(span).await;

        if result.is_err() {
            let mut state = self.state.write().await;
            state.running = false;
            state.cancel_requested = false;
        }
        self.cancel.reset();
        result
    }

    async fn run_phases(&self, run_id: Uuid) -> SortResult<SortReport> {
        if !self.host.is_playlist_page().await? {
            return Err(SortError::NotAPlaylistPage);
        }

        let mut progress = RunProgress::default();
        self.transition(SortPhase::Loading).await;
        if !self.load_with_retry(&mut progress).await? {
            return Ok(self.finish_cancelled(run_id, progress).await);
        }
        self.transition(SortPhase::Sorting).await;

        loop {
            if self.cancel.is_cancelled() {
                return Ok(self.finish_cancelled(run_id, progress).await);
            }
            if progress.passes >= self.config.retry.max_passes {
                progress.degrade(Degradation::PassBudgetExhausted {
                    passes: progress.passes,
                });
                break;
            }
            progress.passes += 1;
            self.state.write().await.passes = progress.passes;

            match self.sort_pass(&mut progress).await {
                Ok(PassOutcome::Moved | PassOutcome::Waited) => {
                    progress.host_errors = 0;
                }
                Ok(PassOutcome::Reload { visible_sorted }) => {
                    progress.host_errors = 0;
                    let before = progress.known_count;
                    self.transition(SortPhase::Loading).await;
                    if !self.load_with_retry(&mut progress).await? {
                        return Ok(self.finish_cancelled(run_id, progress).await);
                    }
                    if visible_sorted && progress.known_count == before {
                        debug!(count = before, "no further items loaded");
                        break;
                    }
                    self.transition(SortPhase::Sorting).await;
                }
                Ok(PassOutcome::Converged) => break,
                Err(err) if err.is_retryable() => {
                    progress.host_errors += 1;
                    warn!(error = %err, attempt = progress.host_errors, "pass aborted, retrying from a fresh snapshot");
                    if progress.host_errors > self.config.retry.max_host_errors {
                        return Err(err);
                    }
                    sleep(Duration::from_millis(self.config.timing.post_move_delay_ms)).await;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(self.finish_converged(run_id, progress).await)
    }

    /// Loading phase, retried on host errors. Returns `false` when cancelled.
    async fn load_with_retry(&self, progress: &mut RunProgress) -> SortResult<bool> {
        loop {
            match self.load(progress).await {
                Ok(completed) => {
                    progress.host_errors = 0;
                    return Ok(completed);
                }
                Err(err) if err.is_retryable() => {
                    progress.host_errors += 1;
                    warn!(error = %err, attempt = progress.host_errors, "loading interrupted, retrying");
                    if progress.host_errors > self.config.retry.max_host_errors {
                        return Err(err);
                    }
                    sleep(Duration::from_millis(self.config.timing.scroll_delay_ms)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn load(&self, progress: &mut RunProgress) -> SortResult<bool> {
        let expected = self.host.reported_total().await?;
        let mut loaded = self.host.snapshot().await?.display_count;

        if self.config.auto_scroll_all {
            let driver = ScrollDriver::new(self.host.as_ref(), &self.config);
            let growth = self.config.scroll_growth_policy();

            loop {
                if self.cancel.is_cancelled() {
                    return Ok(false);
                }
                if !driver.is_loading_more().await? {
                    break;
                }
                if expected.is_some_and(|total| loaded >= total) {
                    break;
                }
                if growth.is_exhausted(progress.stalled_load_rounds) {
                    if !progress.load_degraded {
                        progress.load_degraded = true;
                        progress.degrade(Degradation::LoadStall { loaded, expected });
                    }
                    break;
                }

                let delay = growth.delay_for(progress.stalled_load_rounds);
                self.state.write().await.scroll_delay_ms =
                    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
                self.report(progress, loading_status(loaded));

                let outcome = driver.scroll_to_load_more(None, delay).await?;
                let now = self.host.snapshot().await?.display_count;
                if now <= loaded {
                    progress.stalled_load_rounds += 1;
                }
                debug!(loaded = now, settled = !outcome.is_exhausted(), "load round finished");
                loaded = now;
            }

            if self.cancel.is_cancelled() {
                return Ok(false);
            }
        }

        progress.known_count = loaded;
        progress.render_waits = 0;
        progress.stream_waits = 0;
        self.state.write().await.known_count = loaded;
        self.report(progress, format!("{loaded} items loaded."));
        info!(loaded, ?expected, "loading finished");
        Ok(true)
    }

    async fn sort_pass(&self, progress: &mut RunProgress) -> SortResult<PassOutcome> {
        let snapshot = self.host.snapshot().await?;
        let observed = snapshot.display_count;

        if observed != progress.known_count {
            info!(observed, known = progress.known_count, "item count changed");
            return Ok(PassOutcome::Reload { visible_sorted: false });
        }
        if snapshot.is_empty() {
            return Ok(PassOutcome::Converged);
        }
        if let Some(wait) = self.readiness_wait(&snapshot, progress) {
            sleep(wait).await;
            return Ok(PassOutcome::Waited);
        }

        let keys = snapshot
            .rows
            .iter()
            .map(|row| key_extractor::extract(row, self.config.key))
            .collect();
        let ranked = comparator::rank(keys, self.config.direction);

        let Some(planned) = plan_move(&ranked, progress.floor) else {
            self.state.write().await.sorted_count = snapshot.len();
            if self.config.auto_scroll_all && snapshot.loading_sentinel {
                return Ok(PassOutcome::Reload { visible_sorted: true });
            }
            return Ok(PassOutcome::Converged);
        };

        if progress.last_move_to == Some(planned.to) {
            progress.repeated_moves += 1;
        } else {
            progress.repeated_moves = 0;
        }
        if progress.repeated_moves >= self.config.retry.max_stalled_moves {
            progress.degrade(Degradation::StalledPosition { index: planned.to });
            progress.floor = planned.to + 1;
            progress.last_move_to = None;
            progress.repeated_moves = 0;
            self.state.write().await.sorted_count = progress.floor;
            return Ok(PassOutcome::Waited);
        }

        self.perform_move(&snapshot, &planned, progress).await?;
        sleep(self.config.settle_delay(snapshot.len())).await;
        Ok(PassOutcome::Moved)
    }

    /// How long to wait before the list is ready for a move, if it is not.
    ///
    /// Each wait is budgeted; once a budget runs out the pass proceeds with
    /// what is there and the degradation is recorded once.
    fn readiness_wait(&self, snapshot: &ListSnapshot, progress: &mut RunProgress) -> Option<Duration> {
        if !snapshot.last_row_rendered() {
            let policy = self.config.render_wait_policy();
            if !policy.is_exhausted(progress.render_waits) {
                let wait = policy.delay_for(progress.render_waits);
                progress.render_waits += 1;
                self.report(
                    progress,
                    format!(
                        "Item {} is not loaded yet, waiting {}ms",
                        snapshot.len(),
                        wait.as_millis()
                    ),
                );
                return Some(wait);
            }
            if !progress.render_degraded {
                progress.render_degraded = true;
                progress.degrade(Degradation::RenderTimeout {
                    index: snapshot.len().saturating_sub(1),
                });
            }
        }

        if !snapshot.is_fully_loaded(progress.known_count) {
            let policy = self.config.stream_wait_policy();
            if !policy.is_exhausted(progress.stream_waits) {
                let wait = policy.delay_for(progress.stream_waits);
                progress.stream_waits += 1;
                self.report(
                    progress,
                    format!(
                        "List is not fully loaded ({} of {} items ready), waiting {}ms",
                        snapshot.drag_handle_count.min(snapshot.display_count),
                        progress.known_count,
                        wait.as_millis()
                    ),
                );
                return Some(wait);
            }
            if !progress.stream_degraded {
                progress.stream_degraded = true;
                progress.degrade(Degradation::StreamMismatch {
                    drag_handles: snapshot.drag_handle_count,
                    display_rows: snapshot.display_count,
                    expected: progress.known_count,
                });
            }
        }

        None
    }

    async fn perform_move(
        &self,
        snapshot: &ListSnapshot,
        planned: &PlannedMove,
        progress: &mut RunProgress,
    ) -> SortResult<()> {
        let drag_handle = snapshot.rows[planned.from].drag_handle;
        let drop_target = snapshot.rows[planned.to].drag_handle;

        self.report(
            progress,
            format!(
                "Dragging item #{} {} to position #{}",
                planned.from, planned.key, planned.to
            ),
        );
        gesture_simulator::simulate_move(self.host.as_ref(), drag_handle, drop_target).await?;

        progress.moves.push(MoveRecord {
            from: planned.from,
            to: planned.to,
            key: planned.key.clone(),
        });
        progress.last_move_to = Some(planned.to);
        progress.render_waits = 0;
        progress.stream_waits = 0;

        if let Err(err) = self.host.reveal_row(planned.to).await {
            debug!(error = %err, row = planned.to, "could not scroll moved item into view");
        }

        let mut state = self.state.write().await;
        state.moves += 1;
        state.sorted_count = planned.to;
        Ok(())
    }

    async fn transition(&self, next: SortPhase) {
        let mut state = self.state.write().await;
        let from = state.phase;
        if state.transition(next) {
            info!(%from, to = %next, "sort phase changed");
        } else {
            warn!(%from, to = %next, "ignored illegal sort phase change");
        }
    }

    fn report(&self, progress: &mut RunProgress, status: String) {
        debug!(status = %status, "status");
        self.sink.set_status(&status);
        progress.last_status = status;
    }

    async fn finish_converged(&self, run_id: Uuid, mut progress: RunProgress) -> SortReport {
        let sorted_count = progress.known_count;
        {
            let mut state = self.state.write().await;
            state.sorted_count = sorted_count;
            let from = state.phase;
            if from == SortPhase::Loading {
                state.transition(SortPhase::Sorting);
            }
            state.transition(SortPhase::Converged);
            state.running = false;
            state.cancel_requested = false;
        }
        let status = format!(
            "Sort complete. Items sorted: {sorted_count}. Moves: {}.",
            progress.moves.len()
        );
        self.report(&mut progress, status);
        info!(moves = progress.moves.len(), passes = progress.passes, "sort converged");
        build_report(run_id, SortOutcome::Converged, sorted_count, progress)
    }

    async fn finish_cancelled(&self, run_id: Uuid, mut progress: RunProgress) -> SortReport {
        {
            let mut state = self.state.write().await;
            state.transition(SortPhase::Cancelled);
            state.running = false;
            state.cancel_requested = false;
            state.sorted_count = 0;
        }
        self.cancel.reset();
        self.report(&mut progress, "Sort cancelled.".to_string());
        info!(moves = progress.moves.len(), "sort cancelled");
        build_report(run_id, SortOutcome::Cancelled, 0, progress)
    }
}

fn loading_status(loaded: usize) -> String {
    let mut status = format!("Loading more items - {loaded} items loaded");
    if loaded > TOO_MANY_ITEMS {
        status.push_str("\nSorting may take an extremely long time and is likely to fail");
    } else if loaded > MANY_ITEMS {
        status.push_str("\nNumber of items loaded is high, sorting may take a long time");
    }
    status
}

fn build_report(
    run_id: Uuid,
    outcome: SortOutcome,
    sorted_count: usize,
    progress: RunProgress,
) -> SortReport {
    SortReport {
        run_id,
        outcome,
        item_count: progress.known_count,
        sorted_count,
        passes: progress.passes,
        moves: progress.moves,
        degradations: progress.degradations,
        final_status: progress.last_status,
    }
}
