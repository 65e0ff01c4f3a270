//! Application configuration module
//!
//! Provides configuration types for the widget configuration tooling.
//!
//! Values are resolved in three layers: built-in defaults, an optional TOML
//! file, then environment overrides (`WIFIWIDGET_PREFERENCES`, `RUST_LOG`).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default tracing filter
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Delay between the widget refresh trigger and the "updated" notification
pub const DEFAULT_SYNCED_NOTIFICATION_DELAY: Duration = Duration::from_millis(500);

/// Smallest periodic refresh interval the refresh worker accepts
pub const DEFAULT_MINIMUM_REFRESH_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Environment variable overriding the preferences file location
pub const PREFERENCES_PATH_ENV: &str = "WIFIWIDGET_PREFERENCES";

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// JSON preferences file; `None` keeps preferences in memory only
    pub preferences_path: Option<PathBuf>,
    /// tracing `EnvFilter` directive
    pub log_filter: String,
    /// Delay before the post-commit notification is broadcast
    pub synced_notification_delay: Duration,
    /// Lower bound for the periodic refresh interval
    pub minimum_refresh_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            preferences_path: Some(default_preferences_path()),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            synced_notification_delay: DEFAULT_SYNCED_NOTIFICATION_DELAY,
            minimum_refresh_interval: DEFAULT_MINIMUM_REFRESH_INTERVAL,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.minimum_refresh_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "minimum_refresh_interval",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::MissingValue("log_filter"));
        }
        Ok(())
    }

    /// Load a TOML file on top of the defaults, then apply environment overrides.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let file: ConfigFile = toml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.into_builder().with_env_overrides().build()
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        AppConfigBuilder::default().with_env_overrides().build()
    }
}

/// Returns the platform-specific location of the preferences file.
fn default_preferences_path() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
    path.push("wifiwidget");
    path.push("preferences.json");
    path
}

/// On-disk shape of the TOML configuration file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    preferences_path: Option<PathBuf>,
    in_memory: Option<bool>,
    log_filter: Option<String>,
    synced_notification_delay_ms: Option<u64>,
    minimum_refresh_interval_secs: Option<u64>,
}

impl ConfigFile {
    fn into_builder(self) -> AppConfigBuilder {
        let mut builder = AppConfigBuilder::default();
        if let Some(path) = self.preferences_path {
            builder = builder.preferences_path(path);
        }
        if self.in_memory.unwrap_or(false) {
            builder = builder.in_memory();
        }
        if let Some(filter) = self.log_filter {
            builder = builder.log_filter(filter);
        }
        if let Some(ms) = self.synced_notification_delay_ms {
            builder = builder.synced_notification_delay(Duration::from_millis(ms));
        }
        if let Some(secs) = self.minimum_refresh_interval_secs {
            builder = builder.minimum_refresh_interval(Duration::from_secs(secs));
        }
        builder
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    preferences_path: Option<PathBuf>,
    in_memory: bool,
    log_filter: Option<String>,
    synced_notification_delay: Option<Duration>,
    minimum_refresh_interval: Option<Duration>,
}

impl AppConfigBuilder {
    /// Set the preferences file path
    pub fn preferences_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.preferences_path = Some(path.into());
        self.in_memory = false;
        self
    }

    /// Keep preferences in memory, never touching the filesystem
    pub fn in_memory(mut self) -> Self {
        self.preferences_path = None;
        self.in_memory = true;
        self
    }

    /// Set the tracing filter
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    /// Set the post-commit notification delay
    pub fn synced_notification_delay(mut self, delay: Duration) -> Self {
        self.synced_notification_delay = Some(delay);
        self
    }

    /// Set the minimum periodic refresh interval
    pub fn minimum_refresh_interval(mut self, interval: Duration) -> Self {
        self.minimum_refresh_interval = Some(interval);
        self
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var(PREFERENCES_PATH_ENV) {
            if !path.is_empty() {
                self = self.preferences_path(path);
            }
        }
        if let Ok(filter) = std::env::var("RUST_LOG") {
            if !filter.is_empty() {
                self = self.log_filter(filter);
            }
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let preferences_path = if self.in_memory {
            None
        } else {
            self.preferences_path.or(defaults.preferences_path)
        };
        let config = AppConfig {
            preferences_path,
            log_filter: self.log_filter.unwrap_or(defaults.log_filter),
            synced_notification_delay: self
                .synced_notification_delay
                .unwrap_or(defaults.synced_notification_delay),
            minimum_refresh_interval: self
                .minimum_refresh_interval
                .unwrap_or(defaults.minimum_refresh_interval),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("cannot read config file {path:?}: {message}")]
    Read { path: PathBuf, message: String },
    #[error("cannot parse config file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}
