//! Data structures for the catalog trie.
//!
//! This module contains the versioned prefix trie the catalog is built on.
//! The implementation adheres to the project requirements:
//! - No unsafe code
//! - Explicit error types for every misuse that cannot be ruled out statically
//! - Nodes addressed by arena ids rather than shared pointers

pub mod versioned_trie;

// Re-export common data structures
pub use versioned_trie::{Cursor, TrieError, TrieMap, TrieResult, VersionId};
