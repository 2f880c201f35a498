//! playlist-sort CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::path::Path;

use playlist_sort::cli::commands::{config, schedule, sort};
use playlist_sort::cli::{handle_error, Cli, Commands};
use playlist_sort::domain::models::Config;
use playlist_sort::infrastructure::config::ConfigLoader;
use playlist_sort::infrastructure::logging::{LogConfig, LoggerImpl};

/// Load the configuration and install the logger for commands that run sorts.
fn prepare(config_path: Option<&Path>) -> Result<(Config, LoggerImpl)> {
    let config = ConfigLoader::load_with(config_path)?;
    let logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;
    Ok((config, logger))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Config(args) => config::execute(args, config_path, cli.json),
        Commands::Sort(args) => match prepare(config_path) {
            Ok((config, _logger)) => sort::execute(args, &config, cli.json).await,
            Err(err) => Err(err),
        },
        Commands::Schedule(args) => match prepare(config_path) {
            Ok((config, _logger)) => schedule::execute(args, &config, cli.json).await,
            Err(err) => Err(err),
        },
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
