//! Versioned Prefix Trie Implementation
//!
//! This module provides an ordered prefix trie over symbol sequences in which
//! every key keeps the full history of values recorded for it. It backs the
//! catalog's index of hierarchical names (namespace / table / field paths),
//! where a name's metadata evolves over time and every historical value must
//! stay queryable.
//!
//! # Key Features
//!
//! * Append-only per-key history: re-inserting a key records a new version
//!   instead of overwriting
//! * Exact lookup and longest-prefix matching
//! * Sorted pre-order iteration that skips pure path nodes
//! * Path compaction: nodes left without children and values are pruned
//! * Pinning cursors: a node is never deallocated while a cursor pins one of
//!   its versions
//!
//! # Structure
//!
//! Nodes live in an arena. The header sentinel never carries a value; its
//! single child is the key root, the node of the empty key, and every other
//! key hangs below it.
//!
//! # Erasing pinned versions
//!
//! Erasing a version that a cursor currently pins retires it instead of
//! destroying it: the version leaves the visible history (lookups,
//! iteration, [`TrieMap::len`]) but the cursor can still read it. Retired
//! versions are reclaimed once unpinned, on the next mutation of their node
//! or by [`TrieMap::compact`].
//!
//! A leaf kept alive only by such a pin is no longer reachable through
//! lookups or iteration, but stays allocated after the pin drops. The next
//! [`TrieMap::erase`] or [`TrieMap::prune_path`] along its key removes it,
//! as does [`TrieMap::compact`]; an [`TrieMap::insert`] of that key gives it
//! a value again.
//!
//! # Example
//!
//! ```rust
//! use catalog_trie_lib::data_structures::versioned_trie::TrieMap;
//!
//! let mut trie: TrieMap<&str, &str> = TrieMap::new();
//! trie.insert(&["sales", "orders", "amount"], "int");
//! trie.insert(&["sales", "orders", "amount"], "decimal");
//!
//! assert_eq!(trie.get(&["sales", "orders", "amount"]), Some(&"decimal"));
//! let history: Vec<_> = trie
//!     .history(&["sales", "orders", "amount"])
//!     .unwrap()
//!     .iter()
//!     .map(|e| *e.value())
//!     .collect();
//! assert_eq!(history, vec!["int", "decimal"]);
//! assert_eq!(trie.len(), 2);
//! ```

mod cursor;
mod error;
mod matching;
mod node;
mod slot;

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub use cursor::{Cursor, Iter};
pub use error::TrieError;
pub use matching::{MatchResult, ValueMatch};
pub use slot::{VersionEntry, VersionId, VersionSlot};

use node::{NodeArena, NodeId, Position, HEADER};

/// Result type for versioned trie operations
pub type TrieResult<T> = Result<T, TrieError>;

static NEXT_TRIE_ID: AtomicU64 = AtomicU64::new(1);

fn next_trie_id() -> u64 {
    NEXT_TRIE_ID.fetch_add(1, Ordering::Relaxed)
}

/// An ordered map from symbol sequences to version histories.
///
/// `len()` counts live `(key, version)` pairs, not distinct keys; see
/// [`TrieMap::key_count`] for the latter.
///
/// # Type Parameters
///
/// * `S` - Key symbol type. Edges are kept sorted by `S`'s ordering.
/// * `V` - Value type recorded per version.
pub struct TrieMap<S, V> {
    /// Identifies this map to the cursors it hands out
    id: u64,

    /// Node storage, header at slot 0
    nodes: NodeArena<S, V>,

    /// Number of live `(key, version)` pairs
    len: usize,

    /// Id issued to the next inserted version
    next_version: u64,
}

impl<S: Ord + Clone, V> TrieMap<S, V> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            id: next_trie_id(),
            nodes: NodeArena::new(),
            len: 0,
            next_version: 0,
        }
    }

    /// Number of live `(key, version)` pairs.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the map holds no live versions.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct keys carrying a value. O(nodes).
    pub fn key_count(&self) -> usize {
        self.nodes
            .ids()
            .filter(|id| self.nodes[*id].has_value())
            .count()
    }

    /// Number of allocated nodes, including path nodes and the header.
    pub fn node_count(&self) -> usize {
        self.nodes.live_nodes()
    }

    /// Whether `key` currently carries a value.
    pub fn contains_key(&self, key: &[S]) -> bool {
        self.find_node(key).is_some()
    }

    /// Latest value recorded for `key`.
    pub fn get(&self, key: &[S]) -> Option<&V> {
        let node = self.find_node(key)?;
        self.nodes[node].slot().latest().map(VersionEntry::value)
    }

    /// Visible history of `key`, oldest first. `None` when the key carries
    /// no value.
    pub fn history(&self, key: &[S]) -> Option<&[VersionEntry<V>]> {
        let node = self.find_node(key)?;
        Some(self.nodes[node].slot().entries())
    }

    /// Cursor on the latest version of `key`, or `None` if the key carries
    /// no value.
    pub fn find(&self, key: &[S]) -> Option<Cursor> {
        let node = self.find_node(key)?;
        Some(self.cursor_for(Some(node)))
    }

    /// Descends as far as `key`'s symbols match edges, then backs up to the
    /// nearest node carrying a value.
    ///
    /// `consumed()` of the result is the length of the matched prefix. If
    /// not even the empty key carries a value the result is not a value
    /// match.
    pub fn longest_match(&self, key: &[S]) -> MatchResult<'_, S, V> {
        let Some(root) = self.key_root() else {
            return MatchResult::new(self, HEADER, 0);
        };
        let (node, consumed) = self.descend(root, key);
        let (node, consumed) = self.back_up(node, consumed);
        MatchResult::new(self, node, consumed)
    }

    /// Records `value` as the newest version of `key` and returns its id.
    ///
    /// Missing path nodes are created; an existing key gets an additional
    /// version rather than being overwritten.
    pub fn insert(&mut self, key: &[S], value: V) -> VersionId {
        let root = match self.key_root() {
            Some(root) => root,
            None => self.nodes.attach_key_root(),
        };
        let (mut node, consumed) = self.descend(root, key);
        for symbol in &key[consumed..] {
            node = self.nodes.insert_child(node, symbol.clone());
        }

        let version = VersionId(self.next_version);
        self.next_version += 1;
        self.nodes[node].slot_mut().append(version, value);
        self.len += 1;

        tracing::trace!(%version, depth = key.len(), created = key.len() - consumed, "inserted version");
        version
    }

    /// Erases the latest version of `key`. Returns whether the key carried
    /// a value.
    ///
    /// When it did not, nodes along `key` left behind by released pins are
    /// pruned.
    pub fn erase(&mut self, key: &[S]) -> bool {
        match self.find(key) {
            Some(cursor) => self.erase_at(cursor).is_ok(),
            None => {
                self.prune_path(key);
                false
            }
        }
    }

    /// Erases the latest version of the node under `cursor` and returns a
    /// cursor on the next element in traversal order.
    ///
    /// * A node with children stays as a path node; its previous version,
    ///   if any, becomes the latest.
    /// * A leaf with no pinned versions is removed together with its whole
    ///   remaining history.
    /// * A leaf with a pinned version stays in place with its history.
    ///
    /// Ancestors left childless, valueless and unpinned are removed as well.
    ///
    /// The cursor must pin the node's latest visible version. A cursor left
    /// on a retired or an older version yields [`TrieError::StaleCursor`]
    /// and nothing is erased.
    pub fn erase_at(&mut self, cursor: Cursor) -> TrieResult<Cursor> {
        let id = self.resolve(&cursor)?;
        if self.nodes[id].slot().latest().map(VersionEntry::version) != cursor.version() {
            return Err(TrieError::StaleCursor);
        }
        // the caller's own pin must not keep the node alive
        drop(cursor);

        let node = &mut self.nodes[id];
        if node.slot_mut().pop_latest().is_some() {
            self.len -= 1;
        }

        let node = &self.nodes[id];
        if !node.is_leaf() || node.has_live_value() {
            let next = self.next_value_after(id, HEADER);
            return Ok(self.cursor_for(next));
        }

        let discarded = node.slot().len();
        self.len -= discarded;
        let mut parent = node.parent().unwrap_or(HEADER);
        let mut index = node.index_in_parent();
        let mut freed = self.nodes.erase_child(parent, index);

        // singular predecessors
        while let Some(grandparent) = self.nodes[parent].parent() {
            let p = &self.nodes[parent];
            if !p.is_leaf() || p.has_value() || p.has_live_value() {
                break;
            }
            index = p.index_in_parent();
            freed += self.nodes.erase_child(grandparent, index);
            parent = grandparent;
        }

        tracing::debug!(freed, discarded, "pruned erased leaf");
        let next = self.first_value_from(Position { parent, index }, HEADER);
        Ok(self.cursor_for(next))
    }

    /// Erases every element in `[first, last)`, back to front, and returns
    /// `last`.
    pub fn erase_range(&mut self, first: Cursor, last: Cursor) -> TrieResult<Cursor> {
        if first.same_node(&last) {
            return Ok(last);
        }
        if !last.is_end() {
            self.resolve(&last)?;
        }

        let mut doomed = Vec::new();
        let mut cursor = first;
        while !cursor.same_node(&last) {
            if cursor.is_end() {
                return Err(TrieError::InvalidRange);
            }
            let mut next = cursor.clone();
            self.advance(&mut next)?;
            doomed.push(cursor);
            cursor = next;
        }
        drop(cursor);

        for cursor in doomed.into_iter().rev() {
            self.erase_at(cursor)?;
        }
        Ok(last)
    }

    /// Reclaims unpinned retired versions on the nodes along `key` and prunes
    /// the trailing ones left without children, values and pins. Returns the
    /// number of nodes freed. O(key length).
    pub fn prune_path(&mut self, key: &[S]) -> usize {
        let Some(root) = self.key_root() else {
            return 0;
        };
        let mut path = vec![root];
        let mut node = root;
        for symbol in key {
            match self.nodes[node].find(symbol) {
                Some(child) => {
                    node = child;
                    path.push(child);
                }
                None => break,
            }
        }

        let mut reclaimed = 0;
        let mut freed = 0;
        let mut pruning = true;
        for id in path.into_iter().rev() {
            reclaimed += self.nodes[id].slot_mut().reclaim_retired();
            let node = &self.nodes[id];
            if !pruning || !node.is_leaf() || node.has_value() || node.has_live_value() {
                pruning = false;
                continue;
            }
            let Some(parent) = node.parent() else {
                continue;
            };
            let index = node.index_in_parent();
            freed += self.nodes.erase_child(parent, index);
        }

        if reclaimed > 0 || freed > 0 {
            tracing::debug!(reclaimed, freed, depth = key.len(), "pruned key path");
        }
        freed
    }

    /// Reclaims unpinned retired versions everywhere and prunes every node
    /// left without children, values and pins. Returns the number of nodes
    /// freed.
    pub fn compact(&mut self) -> usize {
        let mut order = Vec::new();
        let mut stack = vec![HEADER];
        while let Some(id) = stack.pop() {
            order.push(id);
            let node = &self.nodes[id];
            stack.extend((0..node.child_count()).filter_map(|i| node.child(i)));
        }

        let mut reclaimed = 0;
        let mut freed = 0;
        // children are visited before their parents
        for id in order.into_iter().rev() {
            reclaimed += self.nodes[id].slot_mut().reclaim_retired();
            let node = &self.nodes[id];
            let Some(parent) = node.parent() else {
                continue;
            };
            if node.is_leaf() && !node.has_value() && !node.has_live_value() {
                let index = node.index_in_parent();
                freed += self.nodes.erase_child(parent, index);
            }
        }

        tracing::debug!(reclaimed, freed, "compacted trie");
        freed
    }

    /// Removes every key. Version ids keep increasing afterwards; cursors
    /// obtained before become stale.
    pub fn clear(&mut self) {
        self.nodes = NodeArena::new();
        self.len = 0;
    }

    fn key_root(&self) -> Option<NodeId> {
        self.nodes[HEADER].first_child()
    }

    /// Node of `key` if it carries a value.
    fn find_node(&self, key: &[S]) -> Option<NodeId> {
        let (node, consumed) = self.descend(self.key_root()?, key);
        (consumed == key.len() && self.nodes[node].has_value()).then_some(node)
    }

    /// Follows matching edges from `from`. Returns the deepest node reached
    /// and the number of symbols consumed.
    pub(crate) fn descend(&self, from: NodeId, key: &[S]) -> (NodeId, usize) {
        let mut node = from;
        let mut consumed = 0;
        for symbol in key {
            match self.nodes[node].find(symbol) {
                Some(child) => {
                    node = child;
                    consumed += 1;
                }
                None => break,
            }
        }
        (node, consumed)
    }

    /// Walks up from `node` to the nearest node with a value, stopping at
    /// the key root.
    pub(crate) fn back_up(&self, mut node: NodeId, mut consumed: usize) -> (NodeId, usize) {
        while !self.nodes[node].has_value() && consumed > 0 {
            match self.nodes[node].parent() {
                Some(parent) if parent != HEADER => {
                    node = parent;
                    consumed -= 1;
                }
                _ => break,
            }
        }
        (node, consumed)
    }
}

impl<S: Ord + Clone, V> Default for TrieMap<S, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep copy of keys and visible history. Pins and retired versions stay
/// with the source map, and cursors of the source do not apply to the copy.
impl<S: Ord + Clone, V: Clone> Clone for TrieMap<S, V> {
    fn clone(&self) -> Self {
        Self {
            id: next_trie_id(),
            nodes: self.nodes.clone(),
            len: self.len,
            next_version: self.next_version,
        }
    }
}

impl<S: Ord + Clone, V: PartialEq> PartialEq for TrieMap<S, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<S: Ord + Clone, V: Eq> Eq for TrieMap<S, V> {}

impl<S: Ord + Clone + fmt::Debug, V: fmt::Debug> fmt::Debug for TrieMap<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<S: Ord + Clone, V, K: AsRef<[S]>> Extend<(K, V)> for TrieMap<S, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key.as_ref(), value);
        }
    }
}

impl<S: Ord + Clone, V, K: AsRef<[S]>> FromIterator<(K, V)> for TrieMap<S, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}
