//! Configuration error module.
//!
//! Errors raised while locating, parsing and validating the catalog
//! configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// The configuration file exists but cannot be read.
    #[error("Failed to read configuration file: {0}")]
    FileReadError(String),

    /// The configuration sources could not be parsed or merged.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A setting failed validation.
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// A value was requested before it was set.
    #[error("Missing required configuration value: {0}")]
    MissingValue(String),

    /// A setting has the wrong type.
    #[error("Invalid configuration value type for {key}: expected {expected}, got {actual}")]
    InvalidValueType {
        /// Dotted key of the setting
        key: String,
        /// The expected type
        expected: String,
        /// What was found instead
        actual: String,
    },

    /// A numeric setting is outside its accepted range.
    #[error("Configuration value {key} is out of valid range: {message}")]
    ValueOutOfRange {
        /// Dotted key of the setting
        key: String,
        /// Description of the valid range
        message: String,
    },
}
