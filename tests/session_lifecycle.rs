//! Start, cancel and restart through the session a UI shell drives.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{durations, fast_config};
use playlist_sort::adapters::{MemoryStatusSink, SimulatedPlaylist};
use playlist_sort::application::{RecurringSortEvent, StopReason};
use playlist_sort::domain::models::{SortOutcome, SortPhase};
use playlist_sort::{RecurringSort, RecurringSortConfig, SortConfig, SortSession};
use tokio::time::timeout;

const REVERSED: [&str; 8] = ["8:00", "7:00", "6:00", "5:00", "4:00", "3:00", "2:00", "1:00"];

/// Settings slow enough that a run can be interrupted between moves.
fn paced_config() -> SortConfig {
    let mut config = fast_config();
    config.timing.post_move_delay_ms = 20;
    config
}

fn session(page: &SimulatedPlaylist, config: SortConfig) -> Arc<SortSession> {
    Arc::new(SortSession::new(
        Arc::new(page.clone()),
        Arc::new(MemoryStatusSink::new()),
        config,
    ))
}

async fn wait_for_first_move(page: &SimulatedPlaylist) {
    timeout(Duration::from_secs(10), async {
        while page.moves_applied().await.is_empty() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("the run should move something");
}

fn ascending_titles() -> Vec<String> {
    (0..REVERSED.len()).rev().map(|i| format!("video {i}")).collect()
}

#[tokio::test]
async fn cancelled_run_can_be_restarted_to_completion() {
    let page = SimulatedPlaylist::loaded(durations(&REVERSED));
    let session = session(&page, paced_config());

    let run = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.start().await }
    });
    wait_for_first_move(&page).await;
    assert!(session.cancel().await);

    let cancelled = run.await.unwrap().unwrap();
    assert_eq!(cancelled.outcome, SortOutcome::Cancelled);
    assert!(cancelled.move_count() >= 1);
    assert!(cancelled.move_count() < REVERSED.len() - 1);
    assert_ne!(page.titles().await, ascending_titles());

    let state = session.state().await;
    assert_eq!(state.phase, SortPhase::Cancelled);
    assert_eq!(state.sorted_count, 0);
    assert!(!state.running);
    assert!(!state.cancel_requested);
    assert!(!session.is_running());
    assert!(!session.cancel_flag().is_cancelled());

    session.update_config(fast_config()).await;
    let finished = session.start().await.unwrap();

    assert_eq!(finished.outcome, SortOutcome::Converged);
    assert_eq!(page.titles().await, ascending_titles());
    let state = session.state().await;
    assert_eq!(state.phase, SortPhase::Converged);
    assert_eq!(state.sorted_count, REVERSED.len());
}

#[tokio::test]
async fn stopping_the_schedule_cancels_the_run_in_flight() {
    let page = SimulatedPlaylist::loaded(durations(&REVERSED));
    let session = session(&page, paced_config());
    let recurring = RecurringSort::new(
        Arc::clone(&session),
        RecurringSortConfig {
            run_immediately: true,
            ..RecurringSortConfig::with_interval(Duration::from_secs(3600))
        },
    );
    let handle = recurring.handle();

    let mut rx = recurring.run();
    wait_for_first_move(&page).await;
    handle.stop().await;

    let mut outcomes = Vec::new();
    let mut reason = None;
    while let Some(event) = timeout(Duration::from_secs(10), rx.recv()).await.unwrap() {
        match event {
            RecurringSortEvent::RunCompleted { report, .. } => outcomes.push(report.outcome),
            RecurringSortEvent::Stopped { reason: stopped } => {
                reason = Some(stopped);
                break;
            }
            _ => {}
        }
    }

    assert_eq!(outcomes, vec![SortOutcome::Cancelled]);
    assert_eq!(reason, Some(StopReason::Requested));
    assert_ne!(page.titles().await, ascending_titles());
    assert!(!session.is_running());
}
