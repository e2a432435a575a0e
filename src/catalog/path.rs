//! Splitting and joining of catalog paths.

use super::error::PathError;
use super::PathResult;
use crate::config::catalog::CatalogSettings;

/// How string paths map to trie keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRules {
    separator: String,
    case_sensitive: bool,
    max_depth: usize,
}

impl PathRules {
    /// Creates rules from explicit values.
    pub fn new<S: Into<String>>(separator: S, case_sensitive: bool, max_depth: usize) -> Self {
        Self {
            separator: separator.into(),
            case_sensitive,
            max_depth,
        }
    }

    /// The separator between path segments.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Splits `path` into its segments, folding case when the rules are
    /// case-insensitive.
    pub fn split(&self, path: &str) -> PathResult<Vec<String>> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for (position, segment) in path.split(self.separator.as_str()).enumerate() {
            if segment.is_empty() {
                return Err(PathError::EmptySegment {
                    path: path.to_string(),
                    position,
                });
            }
            segments.push(self.fold(segment));
        }

        if segments.len() > self.max_depth {
            return Err(PathError::TooDeep {
                path: path.to_string(),
                depth: segments.len(),
                max_depth: self.max_depth,
            });
        }
        Ok(segments)
    }

    /// Joins segments back into a path.
    pub fn join(&self, segments: &[String]) -> String {
        segments.join(&self.separator)
    }

    fn fold(&self, segment: &str) -> String {
        if self.case_sensitive {
            segment.to_string()
        } else {
            segment.to_lowercase()
        }
    }
}

impl Default for PathRules {
    fn default() -> Self {
        Self::from(&CatalogSettings::default())
    }
}

impl From<&CatalogSettings> for PathRules {
    fn from(settings: &CatalogSettings) -> Self {
        Self::new(
            settings.path_separator.clone(),
            settings.case_sensitive,
            settings.max_depth,
        )
    }
}
