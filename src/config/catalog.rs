//! Catalog configuration module.
//!
//! This module defines how the catalog turns string paths into trie keys
//! and how eagerly it reclaims storage after erasing.

use super::ConfigResult;
use super::Validate;
use crate::error::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Upper bound accepted for `max_depth`.
pub const MAX_DEPTH_LIMIT: usize = 1024;

/// Catalog configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogSettings {
    /// Separator between path segments
    pub path_separator: String,

    /// Whether path segments are compared case-sensitively
    pub case_sensitive: bool,

    /// Maximum number of segments in a path
    pub max_depth: usize,

    /// Whether erase also reclaims released versions along the erased path
    pub compact_on_erase: bool,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            path_separator: ".".to_string(),
            case_sensitive: false,
            max_depth: 64,
            compact_on_erase: false,
        }
    }
}

impl Validate for CatalogSettings {
    fn validate(&self) -> ConfigResult<()> {
        if self.path_separator.is_empty() {
            return Err(ConfigError::ValidationError(
                "path_separator cannot be empty".to_string(),
            ));
        }

        if self.path_separator.chars().any(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "path_separator cannot contain whitespace: {:?}",
                self.path_separator
            )));
        }

        if self.max_depth == 0 || self.max_depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::ValueOutOfRange {
                key: "catalog.max_depth".to_string(),
                message: format!("must be between 1 and {MAX_DEPTH_LIMIT}, got {}", self.max_depth),
            });
        }

        Ok(())
    }
}
