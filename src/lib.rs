//! Catalog Trie Library
//!
//! This library contains a versioned prefix trie and the catalog facade built
//! on it. A database catalog uses it to index hierarchical names
//! (namespace / table / field paths) and to keep every value ever recorded
//! for each name queryable.
//!
//! # Architecture
//!
//! - [`data_structures::versioned_trie`]: the single-threaded trie with
//!   per-key version history, longest-prefix matching and pinning cursors
//! - [`catalog`]: a lock-guarded facade taking string paths
//! - [`config`] and [`error`]: the ambient configuration and error layers

pub mod catalog;
pub mod config;
pub mod data_structures;
pub mod error;

// Internal modules that are not part of the public API
#[cfg(test)]
pub(crate) mod tests;

// Feature-gated modules
#[cfg(feature = "benchmarking")]
pub mod bench;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library initialization function.
///
/// Installs the tracing error reporter and loads the default configuration
/// into the global slot.
pub fn init() -> error::CatalogResult<()> {
    error::set_error_reporter(std::sync::Arc::new(error::TracingErrorReporter::new()));
    config::init_default_config()?;
    Ok(())
}
