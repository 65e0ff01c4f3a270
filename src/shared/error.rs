//! Shared Error Types
//!
//! Error types used by the reversible state layer and by the widget
//! configuration built on top of it.
//!
//! # Error Categories
//!
//! - `PersistenceError` - an injected persistence port failed to read or write
//! - `StateError` - a caller addressed a key outside a map's fixed key set
//!
//! # Usage
//!
//! ```rust
//! use wifiwidget::shared::error::PersistenceError;
//!
//! let error = PersistenceError::rejected("opacity", "value out of range");
//! assert_eq!(error.to_string(), "Write rejected for 'opacity': value out of range");
//! ```
//!
//! # Thread Safety
//!
//! All error types are `Send + Sync` and can be moved into spawned tasks.
use thiserror::Error;

/// Failure of an injected persistence port.
///
/// The reversible state layer treats the cause as opaque: it only propagates
/// the error to the caller of `sync()` and never retries on its own.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// Reading or writing the durable store failed
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
    },

    /// A value could not be encoded or decoded
    #[error("Serialization error: {message}")]
    Serialization {
        /// Human-readable error message
        message: String,
    },

    /// The store refused the write
    #[error("Write rejected for '{key}': {message}")]
    Rejected {
        /// The preference key that was being written
        key: String,
        /// Human-readable error message
        message: String,
    },
}

impl PersistenceError {
    /// Create a new I/O error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a new rejected-write error
    pub fn rejected(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}

/// Misuse of a reversible state
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The key is not part of the map's fixed key set
    #[error("Unknown key '{key}' for reversible map '{map}'")]
    UnknownKey {
        /// Name of the map
        map: String,
        /// Debug rendering of the rejected key
        key: String,
    },
}
