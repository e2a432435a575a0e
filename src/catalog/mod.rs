//! Catalog Name Index
//!
//! This module provides [`Catalog`], the thread-safe facade a database
//! catalog uses to index hierarchical names such as `schema.table.column`
//! and to keep every value ever recorded for each name.
//!
//! Paths are split on a configurable separator into segments, optionally
//! case-folded, and stored as keys of a [`TrieMap`] guarded by a
//! reader-writer lock. Reads take the shared lock and return owned
//! snapshots, so no borrow of the index ever escapes the lock.
//!
//! # Example
//!
//! ```rust
//! use catalog_trie_lib::catalog::Catalog;
//!
//! let catalog: Catalog<String> = Catalog::new();
//! catalog.insert("sales.orders.amount", "int".to_string()).unwrap();
//! catalog.insert("sales.orders.amount", "decimal".to_string()).unwrap();
//!
//! assert_eq!(catalog.get("Sales.Orders.Amount").unwrap(), Some("decimal".to_string()));
//! assert_eq!(catalog.history("sales.orders.amount").unwrap().len(), 2);
//! ```

pub mod error;
pub mod path;
pub mod replay;

use parking_lot::RwLock;
use serde::Serialize;

use crate::config::catalog::CatalogSettings;
use crate::data_structures::versioned_trie::{TrieMap, VersionId};

pub use error::PathError;
pub use path::PathRules;

/// Result type for catalog operations
pub type PathResult<T> = Result<T, PathError>;

/// One recorded value of a catalog path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoricalValue<V> {
    /// Version id the value was recorded under
    pub version: VersionId,
    /// The recorded value
    pub value: V,
}

/// Thread-safe index from catalog paths to their value histories.
pub struct Catalog<V> {
    trie: RwLock<TrieMap<String, V>>,
    rules: PathRules,
    compact_on_erase: bool,
}

impl<V: Clone> Catalog<V> {
    /// Creates an empty catalog with default settings.
    pub fn new() -> Self {
        Self::with_settings(&CatalogSettings::default())
    }

    /// Creates an empty catalog configured by `settings`.
    pub fn with_settings(settings: &CatalogSettings) -> Self {
        Self {
            trie: RwLock::new(TrieMap::new()),
            rules: PathRules::from(settings),
            compact_on_erase: settings.compact_on_erase,
        }
    }

    /// The path rules in effect.
    pub fn rules(&self) -> &PathRules {
        &self.rules
    }

    /// Whether `path` currently carries a value.
    pub fn exists(&self, path: &str) -> PathResult<bool> {
        let key = self.rules.split(path)?;
        Ok(self.trie.read().contains_key(&key))
    }

    /// Latest value recorded for `path`.
    pub fn get(&self, path: &str) -> PathResult<Option<V>> {
        let key = self.rules.split(path)?;
        Ok(self.trie.read().get(&key).cloned())
    }

    /// The longest stored prefix of `path` and its latest value.
    pub fn longest_prefix(&self, path: &str) -> PathResult<Option<(String, V)>> {
        let key = self.rules.split(path)?;
        let trie = self.trie.read();
        let found = trie
            .longest_match(&key)
            .into_value_match()
            .map(|m| (self.rules.join(&m.key()), m.value().clone()));
        Ok(found)
    }

    /// Records `value` as the newest version of `path`.
    pub fn insert(&self, path: &str, value: V) -> PathResult<VersionId> {
        let key = self.rules.split(path)?;
        let version = self.trie.write().insert(&key, value);
        tracing::debug!(path, %version, "recorded catalog entry");
        Ok(version)
    }

    /// Every visible value of `path`, oldest first. Empty when the path
    /// carries no value.
    pub fn history(&self, path: &str) -> PathResult<Vec<HistoricalValue<V>>> {
        let key = self.rules.split(path)?;
        let trie = self.trie.read();
        let history: Vec<HistoricalValue<V>> = trie
            .history(&key)
            .map(|entries| {
                entries
                    .iter()
                    .map(|e| HistoricalValue {
                        version: e.version(),
                        value: e.value().clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(history)
    }

    /// Erases the latest version of `path`. Returns whether the path
    /// carried a value.
    pub fn erase(&self, path: &str) -> PathResult<bool> {
        let key = self.rules.split(path)?;
        let mut trie = self.trie.write();
        let erased = trie.erase(&key);
        if erased && self.compact_on_erase {
            trie.prune_path(&key);
        }
        tracing::debug!(path, erased, "erased catalog entry");
        Ok(erased)
    }

    /// Snapshot of every path and its latest value, in sorted order.
    pub fn entries(&self) -> Vec<(String, V)> {
        let trie = self.trie.read();
        let entries = trie
            .iter()
            .map(|(key, value)| (self.rules.join(&key), value.clone()))
            .collect();
        entries
    }

    /// Snapshot of the paths under `prefix` (the prefix itself included).
    /// An empty prefix selects everything.
    pub fn entries_with_prefix(&self, prefix: &str) -> PathResult<Vec<(String, V)>> {
        if prefix.is_empty() {
            return Ok(self.entries());
        }
        let key = self.rules.split(prefix)?;
        let trie = self.trie.read();
        let entries = trie
            .iter_prefix(&key)
            .map(|(key, value)| (self.rules.join(&key), value.clone()))
            .collect();
        Ok(entries)
    }

    /// Whether every strict prefix of `path` is itself a stored path.
    pub fn is_path_valid(&self, path: &str) -> PathResult<bool> {
        let key = self.rules.split(path)?;
        let trie = self.trie.read();
        Ok((1..key.len()).all(|depth| trie.contains_key(&key[..depth])))
    }

    /// Number of recorded `(path, version)` pairs.
    pub fn len(&self) -> usize {
        self.trie.read().len()
    }

    /// Whether the catalog holds no versions.
    pub fn is_empty(&self) -> bool {
        self.trie.read().is_empty()
    }

    /// Number of distinct paths carrying a value.
    pub fn key_count(&self) -> usize {
        self.trie.read().key_count()
    }

    /// Number of trie nodes allocated, path nodes and the header included.
    pub fn node_count(&self) -> usize {
        self.trie.read().node_count()
    }

    /// Prunes unreferenced nodes. Returns the number of nodes freed.
    pub fn compact(&self) -> usize {
        self.trie.write().compact()
    }

    /// Removes every path.
    pub fn clear(&self) {
        self.trie.write().clear();
        tracing::debug!("cleared catalog");
    }
}

impl<V: Clone> Default for Catalog<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + std::fmt::Debug> std::fmt::Debug for Catalog<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("rules", &self.rules)
            .field("len", &self.len())
            .finish()
    }
}
