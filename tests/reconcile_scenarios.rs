//! End-to-end reconcile runs against the simulated playlist page.

mod common;

use std::sync::Arc;
use tokio::sync::RwLock;

use common::{channels, durations, fast_config, loaded_page, paged, reconciler, CancelOnStatus};
use playlist_sort::adapters::{
    MemoryStatusSink, PlaylistItem, SimulatedPlaylist, SimulatedPlaylistOptions,
};
use playlist_sort::domain::models::{
    Degradation, LoopState, SortDirection, SortKeyKind, SortOutcome, SortPhase,
};
use playlist_sort::services::CancelFlag;
use playlist_sort::{Reconciler, SortError};

/// `count` items whose durations strictly decrease, one second apart.
fn descending_seconds(count: usize) -> Vec<PlaylistItem> {
    (0..count)
        .map(|i| {
            let seconds = count - i;
            PlaylistItem::with_duration(
                format!("video {i}"),
                format!("{}:{:02}", seconds / 60, seconds % 60),
            )
        })
        .collect()
}

fn expected_titles(indices: impl IntoIterator<Item = usize>) -> Vec<String> {
    indices.into_iter().map(|i| format!("video {i}")).collect()
}

#[tokio::test]
async fn sorts_three_items_with_two_moves() {
    let page = loaded_page(durations(&["3:00", "1:00", "2:00"]));
    let (reconciler, sink) = reconciler(&page, fast_config());

    let report = reconciler.run().await.unwrap();

    assert_eq!(report.outcome, SortOutcome::Converged);
    assert_eq!(report.move_count(), 2);
    assert_eq!(page.titles().await, expected_titles([1, 2, 0]));
    assert_eq!(page.moves_applied().await, vec![(1, 0), (2, 1)]);

    let history = sink.history();
    assert!(history.contains(&"Dragging item #1 00:01:00 to position #0".to_string()));
    assert!(history.contains(&"Dragging item #2 00:02:00 to position #1".to_string()));
    assert!(report.final_status.starts_with("Sort complete. Items sorted: 3."));
    assert_eq!(sink.current().as_deref(), Some(report.final_status.as_str()));

    let state = reconciler.state().await;
    assert_eq!(state.phase, SortPhase::Converged);
    assert!(!state.running);
    assert_eq!(state.sorted_count, 3);
    assert_eq!(state.moves, 2);
}

#[tokio::test]
async fn upcoming_sinks_to_the_bottom_in_both_directions() {
    let items = durations(&["Upcoming", "2:00", "1:00"]);

    let page = loaded_page(items.clone());
    let (ascending, _) = reconciler(&page, fast_config());
    ascending.run().await.unwrap();
    assert_eq!(page.titles().await, expected_titles([2, 1, 0]));

    let page = loaded_page(items);
    let mut config = fast_config();
    config.direction = SortDirection::Descending;
    let (descending, _) = reconciler(&page, config);
    descending.run().await.unwrap();
    assert_eq!(page.titles().await, expected_titles([1, 2, 0]));
}

#[tokio::test]
async fn channel_sort_folds_case_and_keeps_ties_in_order() {
    let page = loaded_page(channels(&["bravo", "Alpha", "alpha", "Bravo"]));
    let mut config = fast_config();
    config.key = SortKeyKind::Channel;
    let (reconciler, _) = reconciler(&page, config);

    reconciler.run().await.unwrap();

    assert_eq!(page.titles().await, expected_titles([1, 2, 0, 3]));
}

#[tokio::test]
async fn missing_channel_sorts_as_not_available() {
    let mut items = channels(&["Zeta", "Alpha"]);
    items.push(PlaylistItem::with_duration("video 2", "1:00"));
    let page = loaded_page(items);
    let mut config = fast_config();
    config.key = SortKeyKind::Channel;
    let (reconciler, _) = reconciler(&page, config);

    reconciler.run().await.unwrap();

    assert_eq!(page.titles().await, expected_titles([1, 2, 0]));
}

#[tokio::test]
async fn sorting_a_sorted_list_moves_nothing() {
    let page = loaded_page(durations(&["0:10", "3:00", "1:00:00", "Upcoming"]));
    let (first, _) = reconciler(&page, fast_config());
    let report = first.run().await.unwrap();
    assert_eq!(report.move_count(), 0);

    let page = loaded_page(durations(&["3:00", "0:10", "Upcoming", "1:00:00"]));
    let (first, _) = reconciler(&page, fast_config());
    first.run().await.unwrap();
    let sorted = page.titles().await;

    let (second, _) = reconciler(&page, fast_config());
    let report = second.run().await.unwrap();
    assert_eq!(report.move_count(), 0);
    assert_eq!(page.titles().await, sorted);
}

#[tokio::test]
async fn cancel_stops_after_the_move_in_flight() {
    let page = loaded_page(durations(&["4:00", "3:00", "2:00", "1:00"]));
    let flag = CancelFlag::new();
    let sink = Arc::new(CancelOnStatus {
        trigger: "Dragging",
        flag: flag.clone(),
        inner: MemoryStatusSink::new(),
    });
    let state = Arc::new(RwLock::new(LoopState::new(1, 1)));
    let reconciler = Reconciler::new(
        Arc::new(page.clone()),
        sink.clone(),
        fast_config(),
        flag.clone(),
        Arc::clone(&state),
    );

    let report = reconciler.run().await.unwrap();

    assert_eq!(report.outcome, SortOutcome::Cancelled);
    assert_eq!(report.move_count(), 1);
    assert_eq!(page.moves_applied().await.len(), 1);
    assert_eq!(report.final_status, "Sort cancelled.");
    assert_eq!(sink.inner.current().as_deref(), Some("Sort cancelled."));

    let state = state.read().await;
    assert_eq!(state.phase, SortPhase::Cancelled);
    assert!(!state.running);
    assert_eq!(state.sorted_count, 0);
    assert!(!flag.is_cancelled());
}

#[tokio::test]
async fn loads_every_page_before_sorting() {
    let page = paged(descending_seconds(30), 10);
    let (reconciler, sink) = reconciler(&page, fast_config());

    let report = reconciler.run().await.unwrap();

    assert_eq!(page.loaded_count().await, 30);
    assert_eq!(report.item_count, 30);
    assert!(!report.is_degraded());
    assert_eq!(page.titles().await, expected_titles((0..30).rev()));
    assert!(sink
        .history()
        .contains(&"Loading more items - 10 items loaded".to_string()));
    assert!(sink.history().contains(&"30 items loaded.".to_string()));
}

#[tokio::test]
async fn load_stall_sorts_what_loaded() {
    let page = SimulatedPlaylist::new(
        descending_seconds(30),
        SimulatedPlaylistOptions {
            page_size: 10,
            load_limit: Some(20),
            ..Default::default()
        },
    );
    let mut config = fast_config();
    config.retry.max_load_rounds = 2;
    let (reconciler, _) = reconciler(&page, config);

    let report = reconciler.run().await.unwrap();

    assert_eq!(report.outcome, SortOutcome::Converged);
    assert_eq!(
        report.degradations,
        vec![Degradation::LoadStall {
            loaded: 20,
            expected: Some(30),
        }]
    );
    assert_eq!(report.item_count, 20);
    let titles = page.titles().await;
    assert_eq!(titles[..20], expected_titles((0..20).rev())[..]);
    assert_eq!(titles[20..], expected_titles(20..30)[..]);
}

#[tokio::test]
async fn growing_list_is_reloaded_and_fully_sorted() {
    let page = loaded_page(durations(&["3:00", "1:00", "2:00"]));
    page.grow_after_moves(1, vec![PlaylistItem::with_duration("late", "0:30")])
        .await;
    let (reconciler, sink) = reconciler(&page, fast_config());

    let report = reconciler.run().await.unwrap();

    assert_eq!(report.item_count, 4);
    assert_eq!(
        page.titles().await,
        vec!["late", "video 1", "video 2", "video 0"]
    );
    assert!(sink.history().contains(&"4 items loaded.".to_string()));
}

#[tokio::test]
async fn ineffective_moves_are_skipped_after_the_stall_budget() {
    let page = SimulatedPlaylist::new(
        durations(&["3:00", "1:00", "2:00"]),
        SimulatedPlaylistOptions {
            ignore_moves: true,
            ..Default::default()
        },
    );
    let (reconciler, _) = reconciler(&page, fast_config());

    let report = reconciler.run().await.unwrap();

    assert_eq!(report.outcome, SortOutcome::Converged);
    assert_eq!(
        report.degradations,
        vec![
            Degradation::StalledPosition { index: 0 },
            Degradation::StalledPosition { index: 1 },
            Degradation::StalledPosition { index: 2 },
        ]
    );
    assert_eq!(report.move_count(), 9);
    assert!(page.moves_applied().await.is_empty());
    assert_eq!(page.titles().await, expected_titles([0, 1, 2]));
}

#[tokio::test]
async fn render_and_handle_lag_are_waited_out() {
    let page = SimulatedPlaylist::new(
        descending_seconds(15),
        SimulatedPlaylistOptions {
            page_size: 10,
            render_lag_snapshots: 2,
            handle_lag_snapshots: 2,
            ..Default::default()
        },
    );
    let (reconciler, sink) = reconciler(&page, fast_config());

    let report = reconciler.run().await.unwrap();

    assert!(!report.is_degraded(), "{:?}", report.degradations);
    assert_eq!(page.titles().await, expected_titles((0..15).rev()));
    let history = sink.history();
    assert!(history.iter().any(|s| s.contains("is not loaded yet")));
    assert!(history.iter().any(|s| s.starts_with("List is not fully loaded")));
}

#[tokio::test]
async fn render_wait_budget_degrades_once() {
    let page = SimulatedPlaylist::new(
        durations(&["3:00", "1:00", "2:00"]),
        SimulatedPlaylistOptions {
            initially_loaded: Some(3),
            render_lag_snapshots: 5,
            ..Default::default()
        },
    );
    let mut config = fast_config();
    config.retry.max_render_waits = 1;
    let (reconciler, _) = reconciler(&page, config);

    let report = reconciler.run().await.unwrap();

    assert_eq!(report.outcome, SortOutcome::Converged);
    assert_eq!(
        report.degradations,
        vec![Degradation::RenderTimeout { index: 2 }]
    );
}

#[tokio::test]
async fn pass_budget_ends_the_run() {
    let page = loaded_page(durations(&["4:00", "3:00", "2:00", "1:00"]));
    let mut config = fast_config();
    config.retry.max_passes = 1;
    let (reconciler, _) = reconciler(&page, config);

    let report = reconciler.run().await.unwrap();

    assert_eq!(report.passes, 1);
    assert_eq!(report.move_count(), 1);
    assert_eq!(
        report.degradations,
        vec![Degradation::PassBudgetExhausted { passes: 1 }]
    );
}

#[tokio::test]
async fn transient_host_failures_are_retried() {
    let page = SimulatedPlaylist::new(
        durations(&["2:00", "1:00"]),
        SimulatedPlaylistOptions {
            fail_snapshots: 2,
            ..Default::default()
        },
    );
    let (reconciler, _) = reconciler(&page, fast_config());

    let report = reconciler.run().await.unwrap();

    assert_eq!(report.outcome, SortOutcome::Converged);
    assert_eq!(page.titles().await, expected_titles([1, 0]));
}

#[tokio::test]
async fn stale_handles_abort_the_pass_and_retry() {
    let page = SimulatedPlaylist::new(
        durations(&["3:00", "1:00", "2:00"]),
        SimulatedPlaylistOptions {
            // the loading read plus the first two pass reads
            rerender_snapshots: 3,
            ..Default::default()
        },
    );
    let mut config = fast_config();
    config.retry.max_host_errors = 3;
    let (reconciler, _) = reconciler(&page, config);

    let report = reconciler.run().await.unwrap();

    assert_eq!(report.outcome, SortOutcome::Converged);
    assert!(!report.is_degraded());
    assert_eq!(report.move_count(), 2);
    assert_eq!(page.titles().await, expected_titles([1, 2, 0]));
    assert_eq!(page.moves_applied().await.len(), 2);
}

#[tokio::test]
async fn stale_handles_past_the_error_budget_end_the_run() {
    let page = SimulatedPlaylist::new(
        durations(&["3:00", "1:00", "2:00"]),
        SimulatedPlaylistOptions {
            rerender_snapshots: 100,
            ..Default::default()
        },
    );
    let mut config = fast_config();
    config.retry.max_host_errors = 1;
    let (reconciler, _) = reconciler(&page, config);

    let err = reconciler.run().await.unwrap_err();

    assert!(matches!(err, SortError::StaleReference { .. }));
    assert!(page.moves_applied().await.is_empty());
    assert_eq!(page.titles().await, expected_titles([0, 1, 2]));
    assert!(!reconciler.state().await.running);
}

#[tokio::test]
async fn persistent_host_failure_ends_the_run() {
    let page = SimulatedPlaylist::new(
        durations(&["2:00", "1:00"]),
        SimulatedPlaylistOptions {
            fail_snapshots: 100,
            ..Default::default()
        },
    );
    let mut config = fast_config();
    config.retry.max_host_errors = 2;
    let (reconciler, _) = reconciler(&page, config);

    let err = reconciler.run().await.unwrap_err();

    assert!(matches!(err, SortError::Host(_)));
    assert!(!reconciler.state().await.running);
}

#[tokio::test]
async fn refuses_to_run_outside_a_playlist_page() {
    let page = SimulatedPlaylist::new(
        durations(&["2:00", "1:00"]),
        SimulatedPlaylistOptions {
            is_playlist_page: false,
            ..Default::default()
        },
    );
    let (reconciler, _) = reconciler(&page, fast_config());

    assert_eq!(reconciler.run().await, Err(SortError::NotAPlaylistPage));
    assert!(page.moves_applied().await.is_empty());
}

#[tokio::test]
async fn only_loaded_mode_leaves_the_rest_alone() {
    let page = paged(descending_seconds(30), 10);
    let mut config = fast_config();
    config.auto_scroll_all = false;
    let (reconciler, sink) = reconciler(&page, config);

    let report = reconciler.run().await.unwrap();

    assert_eq!(report.item_count, 10);
    assert_eq!(page.loaded_count().await, 10);
    let titles = page.titles().await;
    assert_eq!(titles[..10], expected_titles((0..10).rev())[..]);
    assert_eq!(titles[10..], expected_titles(10..30)[..]);
    assert!(!sink.history().iter().any(|s| s.starts_with("Loading more items")));
}

#[tokio::test]
async fn large_lists_warn_while_loading() {
    let items = (0..320)
        .map(|i| PlaylistItem::with_duration(format!("video {i}"), "1:00"))
        .collect();
    let page = SimulatedPlaylist::new(
        items,
        SimulatedPlaylistOptions {
            initially_loaded: Some(310),
            ..Default::default()
        },
    );
    let (reconciler, sink) = reconciler(&page, fast_config());

    let report = reconciler.run().await.unwrap();

    assert_eq!(report.move_count(), 0);
    assert!(sink.history().contains(
        &"Loading more items - 310 items loaded\nNumber of items loaded is high, sorting may take a long time"
            .to_string()
    ));
}
