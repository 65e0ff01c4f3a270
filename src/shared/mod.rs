//! Shared Module
//!
//! Cross-cutting types used by both the reversible state core and the
//! widget configuration: error taxonomy, application configuration and
//! tracing setup.

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Tracing subscriber setup
pub mod logging;

#[cfg(test)]
pub(crate) mod test_env;

pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::{PersistenceError, StateError};
