//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::config::ConfigArgs;
use super::commands::schedule::ScheduleArgs;
use super::commands::sort::SortArgs;

#[derive(Parser, Debug)]
#[command(name = "playlist-sort")]
#[command(about = "Reorder a playlist by duration or channel through simulated drags", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (replaces the project config files)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sort a playlist once
    Sort(SortArgs),

    /// Keep a playlist sorted by re-running the sort on an interval
    Schedule(ScheduleArgs),

    /// Inspect the effective configuration
    Config(ConfigArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::config::ConfigCommands;
    use crate::domain::models::{SortDirection, SortKeyKind};

    #[test]
    fn parses_sort_with_overrides() {
        let cli = Cli::try_parse_from([
            "playlist-sort",
            "--json",
            "sort",
            "--playlist",
            "list.yaml",
            "--direction",
            "desc",
            "--key",
            "channel",
            "--only-loaded",
            "--post-move-delay-ms",
            "10",
        ])
        .unwrap();

        assert!(cli.json);
        let Commands::Sort(args) = cli.command else {
            panic!("expected sort command");
        };
        assert_eq!(args.playlist, PathBuf::from("list.yaml"));
        assert_eq!(args.direction, Some(SortDirection::Descending));
        assert_eq!(args.key, Some(SortKeyKind::Channel));
        assert!(args.only_loaded);
        assert_eq!(args.post_move_delay_ms, Some(10));
        assert_eq!(args.scroll_delay_ms, None);
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from(["playlist-sort", "config", "show", "--config", "x.yaml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.yaml")));
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigArgs { command: ConfigCommands::Show })
        ));
    }

    #[test]
    fn rejects_unknown_direction() {
        assert!(Cli::try_parse_from([
            "playlist-sort",
            "sort",
            "--playlist",
            "list.yaml",
            "--direction",
            "sideways",
        ])
        .is_err());
    }
}
