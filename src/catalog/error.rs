//! Path error module.
//!
//! This module defines the errors raised when a string path cannot be turned
//! into a catalog key.

use thiserror::Error;

/// Errors that can occur when splitting a catalog path into segments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path is the empty string.
    #[error("Catalog path is empty")]
    Empty,

    /// Two separators are adjacent, or the path starts or ends with one.
    #[error("Empty segment at position {position} in path {path:?}")]
    EmptySegment {
        /// The offending path
        path: String,
        /// Zero-based index of the empty segment
        position: usize,
    },

    /// The path has more segments than the configured maximum depth.
    #[error("Path {path:?} has {depth} segments, maximum is {max_depth}")]
    TooDeep {
        /// The offending path
        path: String,
        /// Number of segments in the path
        depth: usize,
        /// Configured maximum depth
        max_depth: usize,
    },
}
