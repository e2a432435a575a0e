//! Test modules for the catalog trie.
//!
//! This module contains the crate-level testing infrastructure:
//! - Tests for the configuration and error layers
//! - Catalog tests, including property-based tests against a model
//! - Shared strategies and fixtures
//!
//! Tests for the trie itself live next to it under
//! `data_structures::versioned_trie::tests`.


// Re-export commonly used testing tools to simplify imports in test modules
pub use test_utils::{catalog_path_strategy, TestFixture};
