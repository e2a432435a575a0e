//! Results of descending the trie along a key.

use std::fmt;

use super::cursor::Cursor;
use super::node::{NodeId, HEADER};
use super::TrieMap;

/// Outcome of a descent: the node reached, how many key symbols were
/// consumed to reach it, whether it carries a value and whether it is a leaf.
///
/// A `MatchResult` borrows the trie it came from, so it cannot outlive a
/// mutation of that trie.
pub struct MatchResult<'t, S, V> {
    trie: &'t TrieMap<S, V>,
    node: NodeId,
    consumed: usize,
    is_value_match: bool,
    is_leaf: bool,
}

impl<'t, S: Ord + Clone, V> MatchResult<'t, S, V> {
    pub(crate) fn new(trie: &'t TrieMap<S, V>, node: NodeId, consumed: usize) -> Self {
        let n = &trie.nodes[node];
        Self {
            trie,
            node,
            consumed,
            is_value_match: n.has_value(),
            is_leaf: n.is_leaf(),
        }
    }

    /// Number of key symbols consumed to reach the matched node.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Whether the matched node carries a value.
    pub fn is_value_match(&self) -> bool {
        self.is_value_match
    }

    /// Whether the matched node has no children.
    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    /// The key of the matched node, i.e. the first `consumed()` symbols of
    /// the searched key.
    pub fn key(&self) -> Vec<S> {
        if self.node == HEADER {
            return Vec::new();
        }
        self.trie.nodes.key_of(self.node)
    }

    /// Latest value of the matched node, if it carries one.
    pub fn value(&self) -> Option<&'t V> {
        self.trie.nodes[self.node].slot().latest().map(|e| e.value())
    }

    /// The symbol labelling the edge into the matched node. `None` for the
    /// empty key.
    pub fn edge_symbol(&self) -> Option<&'t S> {
        self.trie.nodes.edge_symbol(self.node)
    }

    /// Continues the descent from the matched node with more symbols.
    ///
    /// Equivalent to `longest_match` on `self.key()` followed by `more`.
    pub fn extend(&self, more: &[S]) -> MatchResult<'t, S, V> {
        if self.node == HEADER {
            return *self;
        }
        let (node, consumed) = self.trie.descend(self.node, more);
        let (node, consumed) = self.trie.back_up(node, self.consumed + consumed);
        MatchResult::new(self.trie, node, consumed)
    }

    /// Converts into a proven match if the matched node carries a value.
    pub fn into_value_match(self) -> Option<ValueMatch<'t, S, V>> {
        let value = self.value()?;
        Some(ValueMatch { inner: self, value })
    }
}

impl<S, V> Clone for MatchResult<'_, S, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, V> Copy for MatchResult<'_, S, V> {}

impl<S, V> PartialEq for MatchResult<'_, S, V> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.trie, other.trie)
            && self.node == other.node
            && self.consumed == other.consumed
            && self.is_value_match == other.is_value_match
            && self.is_leaf == other.is_leaf
    }
}

impl<S, V> fmt::Debug for MatchResult<'_, S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchResult")
            .field("node", &self.node)
            .field("consumed", &self.consumed)
            .field("is_value_match", &self.is_value_match)
            .field("is_leaf", &self.is_leaf)
            .finish()
    }
}

/// A [`MatchResult`] known to land on a value-bearing node.
///
/// This is the only way to turn a descent into a [`Cursor`].
pub struct ValueMatch<'t, S, V> {
    inner: MatchResult<'t, S, V>,
    value: &'t V,
}

impl<'t, S: Ord + Clone, V> ValueMatch<'t, S, V> {
    /// Number of key symbols consumed.
    pub fn consumed(&self) -> usize {
        self.inner.consumed
    }

    /// Key of the matched node.
    pub fn key(&self) -> Vec<S> {
        self.inner.key()
    }

    /// Latest value of the matched node.
    pub fn value(&self) -> &'t V {
        self.value
    }

    /// Pins the matched node's latest version and returns a cursor on it.
    pub fn cursor(&self) -> Cursor {
        self.inner.trie.cursor_for(Some(self.inner.node))
    }

    /// The underlying match.
    pub fn as_match(&self) -> &MatchResult<'t, S, V> {
        &self.inner
    }
}

impl<S, V> Clone for ValueMatch<'_, S, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, V> Copy for ValueMatch<'_, S, V> {}

impl<S, V> fmt::Debug for ValueMatch<'_, S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValueMatch").field(&self.inner).finish()
    }
}
