//! `schedule` command: keep a playlist fixture sorted on an interval.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::adapters::{PlaylistFixture, TracingStatusSink};
use crate::application::{RecurringSort, RecurringSortConfig, RecurringSortEvent, SortSession};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, SortConfig};

#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// Playlist fixture (YAML)
    #[arg(short, long, value_name = "FILE")]
    pub playlist: PathBuf,

    /// Stop after this many runs
    #[arg(short, long)]
    pub runs: Option<u64>,

    /// Seconds between runs (overrides schedule.interval_secs)
    #[arg(long, value_name = "SECS")]
    pub interval_secs: Option<u64>,

    /// Run once right away instead of waiting for the first interval
    #[arg(long)]
    pub run_immediately: bool,
}

// -- Output structs --

#[derive(Debug, Serialize)]
pub struct ScheduleEventOutput {
    pub event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moves: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<&RecurringSortEvent> for ScheduleEventOutput {
    fn from(event: &RecurringSortEvent) -> Self {
        let base = Self {
            event: "started",
            run_number: None,
            moves: None,
            duration_ms: None,
            detail: None,
        };
        match event {
            RecurringSortEvent::Started => base,
            RecurringSortEvent::RunStarted { run_number } => Self {
                event: "run_started",
                run_number: Some(*run_number),
                ..base
            },
            RecurringSortEvent::RunCompleted {
                run_number,
                report,
                duration_ms,
            } => Self {
                event: "run_completed",
                run_number: Some(*run_number),
                moves: Some(report.move_count()),
                duration_ms: Some(*duration_ms),
                detail: Some(report.final_status.clone()),
            },
            RecurringSortEvent::RunSkipped { run_number } => Self {
                event: "run_skipped",
                run_number: Some(*run_number),
                ..base
            },
            RecurringSortEvent::RunFailed { run_number, error } => Self {
                event: "run_failed",
                run_number: Some(*run_number),
                detail: Some(error.clone()),
                ..base
            },
            RecurringSortEvent::Stopped { reason } => Self {
                event: "stopped",
                detail: Some(format!("{reason:?}")),
                ..base
            },
        }
    }
}

impl CommandOutput for ScheduleEventOutput {
    fn to_human(&self) -> String {
        let mut line = match self.run_number {
            Some(run) => format!("[run {run}] {}", self.event.replace('_', " ")),
            None => format!("Recurring sort {}", self.event),
        };
        if let Some(moves) = self.moves {
            line.push_str(&format!(", {moves} move(s)"));
        }
        if let Some(ms) = self.duration_ms {
            line.push_str(&format!(" in {ms}ms"));
        }
        if let Some(ref detail) = self.detail {
            line.push_str(&format!(": {detail}"));
        }
        line
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

// -- Execute --

pub async fn execute(args: ScheduleArgs, config: &Config, json_mode: bool) -> Result<()> {
    let fixture = PlaylistFixture::load(&args.playlist)
        .await
        .with_context(|| format!("Failed to load playlist {}", args.playlist.display()))?;
    let page = Arc::new(fixture.into_playlist());
    let session = Arc::new(SortSession::new(
        page,
        Arc::new(TracingStatusSink),
        SortConfig::from(config),
    ));

    let mut schedule = RecurringSortConfig::from(&config.schedule);
    schedule.max_runs = args.runs;
    schedule.run_immediately |= args.run_immediately;
    if let Some(secs) = args.interval_secs {
        if secs == 0 {
            anyhow::bail!("--interval-secs must be at least 1");
        }
        schedule.interval = Duration::from_secs(secs);
    }

    let recurring = RecurringSort::new(session, schedule);
    let handle = recurring.handle();
    let mut events = recurring.run();

    let stopper = handle.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping recurring sort");
            stopper.stop().await;
        }
    });

    while let Some(event) = events.recv().await {
        output(&ScheduleEventOutput::from(&event), json_mode);
        if matches!(event, RecurringSortEvent::Stopped { .. }) {
            break;
        }
    }
    ctrl_c.abort();

    let status = handle.status().await;
    info!(
        total_runs = status.total_runs,
        failed_runs = status.failed_runs,
        total_moves = status.total_moves,
        "recurring sort finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::StopReason;

    #[test]
    fn failed_run_renders_the_error() {
        let event = RecurringSortEvent::RunFailed {
            run_number: 3,
            error: "Current page is not a playlist page".to_string(),
        };
        let line = ScheduleEventOutput::from(&event).to_human();
        assert_eq!(line, "[run 3] run failed: Current page is not a playlist page");
    }

    #[test]
    fn stop_reason_is_reported() {
        let event = RecurringSortEvent::Stopped {
            reason: StopReason::RunLimitReached,
        };
        let json = ScheduleEventOutput::from(&event).to_json();
        assert_eq!(json["event"], "stopped");
        assert_eq!(json["detail"], "RunLimitReached");
        assert!(json.get("run_number").is_none());
    }
}
