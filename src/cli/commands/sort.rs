//! `sort` command: run one sort over a playlist fixture.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::adapters::{PlaylistFixture, PlaylistItem};
use crate::application::SortSession;
use crate::cli::output::{create_spinner, output, CommandOutput, SpinnerStatusSink, TableFormatter};
use crate::domain::models::{Config, SortConfig, SortDirection, SortKeyKind, SortReport};

#[derive(Args, Debug)]
pub struct SortArgs {
    /// Playlist fixture (YAML)
    #[arg(short, long, value_name = "FILE")]
    pub playlist: PathBuf,

    /// Sort direction (ascending, descending)
    #[arg(short, long)]
    pub direction: Option<SortDirection>,

    /// Sort key (duration, channel)
    #[arg(short, long)]
    pub key: Option<SortKeyKind>,

    /// Sort only the items already loaded instead of loading the whole list
    #[arg(long)]
    pub only_loaded: bool,

    /// Wait after each scroll, in milliseconds
    #[arg(long, value_name = "MS")]
    pub scroll_delay_ms: Option<u64>,

    /// Wait after each drag, in milliseconds
    #[arg(long, value_name = "MS")]
    pub post_move_delay_ms: Option<u64>,

    /// Write the resulting order to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl SortArgs {
    /// Apply the command-line overrides to the configured run settings.
    pub fn apply(&self, config: &mut SortConfig) {
        if let Some(direction) = self.direction {
            config.direction = direction;
        }
        if let Some(key) = self.key {
            config.key = key;
        }
        if self.only_loaded {
            config.auto_scroll_all = false;
        }
        if let Some(delay) = self.scroll_delay_ms {
            config.timing.scroll_delay_ms = delay;
            config.timing.max_scroll_delay_ms = config.timing.max_scroll_delay_ms.max(delay);
        }
        if let Some(delay) = self.post_move_delay_ms {
            config.timing.post_move_delay_ms = delay;
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SortRunOutput {
    pub report: SortReport,
    pub items: Vec<PlaylistItem>,
    pub written_to: Option<String>,
}

impl CommandOutput for SortRunOutput {
    fn to_human(&self) -> String {
        let formatter = TableFormatter::new();
        let mut lines = vec![
            self.report.final_status.clone(),
            format!(
                "Moves: {}, passes: {}, items: {}",
                self.report.move_count(),
                self.report.passes,
                self.report.item_count
            ),
            formatter.format_playlist(&self.items),
        ];

        if self.report.is_degraded() {
            lines.push(formatter.format_degradations(&self.report.degradations));
        }
        if let Some(ref path) = self.written_to {
            lines.push(format!("Written to {path}"));
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: SortArgs, config: &Config, json_mode: bool) -> Result<()> {
    let fixture = PlaylistFixture::load(&args.playlist)
        .await
        .with_context(|| format!("Failed to load playlist {}", args.playlist.display()))?;
    let page = Arc::new(fixture.clone().into_playlist());

    let sink = Arc::new(if json_mode {
        SpinnerStatusSink::hidden()
    } else {
        SpinnerStatusSink::new(create_spinner())
    });

    let mut sort_config = SortConfig::from(config);
    args.apply(&mut sort_config);
    let session = SortSession::new(page.clone(), sink.clone(), sort_config);

    let cancel = session.cancel_flag();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling sort");
            cancel.cancel();
        }
    });

    let result = session.start().await;
    ctrl_c.abort();

    let report = match result {
        Ok(report) => report,
        Err(err) => {
            sink.abandon(err.to_string());
            return Err(err).context("Sort failed");
        }
    };
    if report.is_cancelled() {
        sink.abandon(report.final_status.clone());
    } else {
        sink.finish(report.final_status.clone());
    }

    let items = page.items().await;
    let written_to = match args.output {
        Some(ref path) => {
            let sorted = PlaylistFixture {
                items: items.clone(),
                ..fixture
            };
            sorted
                .save(path)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Some(path.display().to_string())
        }
        None => None,
    };

    output(
        &SortRunOutput {
            report,
            items,
            written_to,
        },
        json_mode,
    );
    Ok(())
}
