//! Error types for slotkeep-core

use thiserror::Error;

/// Result type alias using slotkeep-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for slotkeep
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Slot identifier outside the accepted range
    #[error("Invalid slot id: {value} (slots are numbered from 1)")]
    InvalidSlot { value: String },
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid slot error
    pub fn invalid_slot(value: impl Into<String>) -> Self {
        Self::InvalidSlot {
            value: value.into(),
        }
    }
}
