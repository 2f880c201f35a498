use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project configuration file, relative to the working directory
pub const PROJECT_CONFIG: &str = ".playlist-sort/config.yaml";
/// Optional local overrides, relative to the working directory
pub const LOCAL_CONFIG: &str = ".playlist-sort/local.yaml";
/// Prefix of environment overrides; nested keys are separated by `__`
pub const ENV_PREFIX: &str = "PLAYLIST_SORT_";

/// Configuration error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {0}: must be at least 1")]
    ZeroBudget(&'static str),

    #[error(
        "Invalid scroll delay: max_scroll_delay_ms ({1}) must not be less than scroll_delay_ms ({0})"
    )]
    InvalidScrollDelay(u64, u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Invalid schedule interval: must be at least 1 second")]
    InvalidInterval,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .playlist-sort/config.yaml (project config)
    /// 3. .playlist-sort/local.yaml (local overrides, optional)
    /// 4. Environment variables (PLAYLIST_SORT_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(PROJECT_CONFIG))
            .merge(Yaml::file(LOCAL_CONFIG))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring the
    /// environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Either of the above, depending on whether a file was given
    pub fn load_with(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load(),
        }
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let retry = &config.retry;
        let budgets = [
            ("retry.max_scroll_attempts", retry.max_scroll_attempts),
            ("retry.max_target_scroll_attempts", retry.max_target_scroll_attempts),
            ("retry.max_load_rounds", retry.max_load_rounds),
            ("retry.max_stalled_moves", retry.max_stalled_moves),
            ("retry.max_passes", retry.max_passes),
            (
                "schedule.max_consecutive_failures",
                config.schedule.max_consecutive_failures,
            ),
        ];
        if let Some(&(name, _)) = budgets.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::ZeroBudget(name));
        }

        let timing = &config.timing;
        if timing.max_scroll_delay_ms < timing.scroll_delay_ms {
            return Err(ConfigError::InvalidScrollDelay(
                timing.scroll_delay_ms,
                timing.max_scroll_delay_ms,
            ));
        }

        if config.schedule.interval_secs == 0 {
            return Err(ConfigError::InvalidInterval);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        Ok(())
    }
}
