//! Command-line interface parsing for apodsaver
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! the configuration used by the API client, the cache and the logger.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use reqwest::Url;
use thiserror::Error;

use crate::cache::{CacheConfig, RetryPolicy};
use crate::data::apod::{DEFAULT_API_KEY, DEFAULT_API_URL};
use crate::data::ClientConfig;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The API URL is not an http(s) URL
    #[error("Invalid API URL: '{0}'. Expected an http:// or https:// URL")]
    InvalidApiUrl(String),

    /// The API key is blank
    #[error("The API key must not be empty")]
    EmptyApiKey,

    /// The retry count is zero
    #[error("Invalid retry count: {0}. At least one attempt is required")]
    InvalidRetries(u32),
}

/// apodsaver - NASA's Astronomy Picture of the Day as a terminal screensaver
#[derive(Parser, Debug)]
#[command(name = "apodsaver")]
#[command(about = "NASA's Astronomy Picture of the Day, rendered as ASCII art in your terminal")]
#[command(version)]
pub struct Cli {
    /// NASA API key (get one at https://api.nasa.gov)
    #[arg(long, env = "NASA_API_KEY", default_value = DEFAULT_API_KEY, hide_env_values = true)]
    pub api_key: String,

    /// APOD API endpoint
    #[arg(long, env = "APOD_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Pause in milliseconds when a reload is served from the cache
    #[arg(long, value_name = "MS", default_value_t = 2000)]
    pub hit_delay_ms: u64,

    /// Attempts per request before giving up on transient errors
    #[arg(long, value_name = "N", default_value_t = 3)]
    pub retries: u32,

    /// Where to write the log (defaults to the user cache directory)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Settings for the APOD API client
    pub client: ClientConfig,
    /// Settings for the daily cache
    pub cache: CacheConfig,
    /// Explicit log file location, if given
    pub log_file: Option<PathBuf>,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if any value is out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let api_key = cli.api_key.trim();
        if api_key.is_empty() {
            return Err(CliError::EmptyApiKey);
        }

        let api_url = parse_api_url(&cli.api_url)?;

        if cli.retries == 0 {
            return Err(CliError::InvalidRetries(cli.retries));
        }

        Ok(StartupConfig {
            client: ClientConfig {
                base_url: api_url.to_string(),
                api_key: api_key.to_string(),
                ..ClientConfig::default()
            },
            cache: CacheConfig {
                hit_delay: Duration::from_millis(cli.hit_delay_ms),
                retry: RetryPolicy {
                    max_attempts: cli.retries,
                    ..RetryPolicy::default()
                },
            },
            log_file: cli.log_file.clone(),
        })
    }
}

/// Parses an API URL argument, accepting only http and https
pub fn parse_api_url(s: &str) -> Result<Url, CliError> {
    match Url::parse(s.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        _ => Err(CliError::InvalidApiUrl(s.to_string())),
    }
}
