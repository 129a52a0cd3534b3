//! Configuration management for sentiscope.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "sentiscope";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "history.db";

/// Largest page the timeline endpoints accept.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `SENTISCOPE_`, sections split on `__`)
/// 2. TOML config file at `~/.config/sentiscope/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Posts API configuration.
    pub api: ApiConfig,
    /// Text cleaning configuration.
    pub clean: CleanConfig,
    /// Sentiment scoring configuration.
    pub sentiment: SentimentConfig,
    /// Spreadsheet export configuration.
    pub export: ExportConfig,
    /// Chart rendering configuration.
    pub chart: ChartConfig,
    /// History storage configuration.
    pub storage: StorageConfig,
}

/// Posts API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST API, without a trailing slash.
    pub base_url: String,
    /// Pre-issued bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Number of posts fetched when no count is given.
    pub default_count: u32,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

/// Text cleaning configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanConfig {
    /// Extra noise patterns (regex), tried before the built-in ones.
    pub extra_patterns: Vec<String>,
}

/// Sentiment scoring configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    /// Optional JSON file of `{"word": score}` entries merged over the
    /// built-in lexicon.
    pub lexicon_path: Option<PathBuf>,
}

/// Spreadsheet export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Where the CSV export is written.
    pub path: PathBuf,
}

/// Chart rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Where the SVG chart is written.
    pub path: PathBuf,
    /// Chart width in pixels.
    pub width: u32,
    /// Chart height in pixels.
    pub height: u32,
}

/// History storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Record every analysis in the history database.
    pub enabled: bool,
    /// Path to the database file.
    /// Defaults to `~/.local/share/sentiscope/history.db`
    pub database_path: Option<PathBuf>,
    /// Maximum number of posts to retain.
    /// Set to 0 for unlimited.
    pub max_posts: usize,
    /// Maximum age of posts to retain in days.
    /// Set to 0 for unlimited.
    pub max_age_days: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.twitter.com".to_string(),
            bearer_token: None,
            timeout_secs: 30,
            default_count: 20,
            user_agent: concat!("sentiscope/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiConfig {
    /// Request timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("output.csv"),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sentiment.svg"),
            width: 1024,
            height: 600,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            database_path: None, // Resolved at runtime
            max_posts: 50_000,
            max_age_days: 365,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("SENTISCOPE_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(Error::config_validation("api.base_url must not be empty"));
        }

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(Error::config_validation(format!(
                "api.base_url must be an http(s) URL, got {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(Error::config_validation(
                "api.timeout_secs must be greater than 0",
            ));
        }

        if self.api.default_count == 0 {
            return Err(Error::config_validation(
                "api.default_count must be greater than 0",
            ));
        }

        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(Error::config_validation(format!(
                "chart size must be non-zero, got {}x{}",
                self.chart.width, self.chart.height
            )));
        }

        for pattern in &self.clean.extra_patterns {
            if regex::Regex::new(pattern).is_err() {
                return Err(Error::config_validation(format!(
                    "invalid regex pattern: {pattern}"
                )));
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the max age as a `chrono` duration, `None` when unlimited.
    #[must_use]
    pub fn max_age(&self) -> Option<chrono::Duration> {
        if self.storage.max_age_days == 0 {
            None
        } else {
            Some(chrono::Duration::days(i64::from(self.storage.max_age_days)))
        }
    }
}
