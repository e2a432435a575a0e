//! Cursors and iteration over the versioned trie.
//!
//! A [`Cursor`] is a handle, not a borrow: it names a value-bearing node and
//! pins the version it exposes, so it can be held across mutations of the
//! trie. Reading through a cursor goes back through the trie
//! ([`TrieMap::get_at`], [`TrieMap::get_at_mut`]).
//!
//! Traversal is pre-order depth-first with edges visited in symbol order.
//! Nodes without a visible value (pure path nodes) are skipped.

use std::fmt;

use super::error::TrieError;
use super::node::{NodeId, Position, HEADER};
use super::slot::{Pin, VersionId};
use super::{TrieMap, TrieResult};

/// A position in a [`TrieMap`] holding a pin on the version it exposes.
///
/// Cloning a cursor acquires another pin on the same version; dropping it
/// releases the pin. While any cursor pins a version of a node, erase will
/// not deallocate that node.
#[derive(Clone)]
pub struct Cursor {
    trie: u64,
    node: Option<NodeId>,
    pin: Option<Pin>,
}

impl Cursor {
    pub(crate) fn end(trie: u64) -> Self {
        Self {
            trie,
            node: None,
            pin: None,
        }
    }

    /// Whether this cursor is past the last element.
    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    /// The version this cursor pins, `None` at the end.
    pub fn version(&self) -> Option<VersionId> {
        self.pin.as_ref().map(Pin::version)
    }

    pub(crate) fn same_node(&self, other: &Cursor) -> bool {
        self.trie == other.trie && self.node == other.node
    }
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        self.same_node(other)
            && match (&self.pin, &other.pin) {
                (Some(a), Some(b)) => a.same_entry(b),
                (None, None) => true,
                _ => false,
            }
    }
}

impl Eq for Cursor {}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.node, &self.pin) {
            (Some(node), Some(pin)) => f
                .debug_struct("Cursor")
                .field("trie", &self.trie)
                .field("node", node)
                .field("version", &pin.version())
                .finish(),
            _ => f.debug_struct("Cursor").field("trie", &self.trie).field("end", &true).finish(),
        }
    }
}

impl<S: Ord + Clone, V> TrieMap<S, V> {
    /// Cursor on the first element in traversal order, or the end cursor.
    pub fn begin(&self) -> Cursor {
        let first = self.first_value_from(Position::first_child_of(HEADER), HEADER);
        self.cursor_for(first)
    }

    /// The cursor one past the last element.
    pub fn end(&self) -> Cursor {
        Cursor::end(self.id)
    }

    /// Moves `cursor` to the next element in traversal order, releasing its
    /// old pin and acquiring the new one.
    pub fn advance(&self, cursor: &mut Cursor) -> TrieResult<()> {
        let node = self.resolve(cursor)?;
        let next = self.next_value_after(node, HEADER);
        *cursor = self.cursor_for(next);
        Ok(())
    }

    /// Reads the key and pinned value under `cursor`.
    ///
    /// The value is the version the cursor pinned, even if newer versions
    /// were inserted or the pinned one was erased since.
    pub fn get_at(&self, cursor: &Cursor) -> TrieResult<(Vec<S>, &V)> {
        let node = self.resolve(cursor)?;
        let version = cursor.version().ok_or(TrieError::CursorAtEnd)?;
        let entry = self.nodes[node]
            .slot()
            .get(version)
            .ok_or(TrieError::StaleCursor)?;
        Ok((self.nodes.key_of(node), entry.value()))
    }

    /// Mutable view of the value under `cursor`.
    pub fn get_at_mut(&mut self, cursor: &Cursor) -> TrieResult<(Vec<S>, &mut V)> {
        let node = self.resolve(cursor)?;
        let version = cursor.version().ok_or(TrieError::CursorAtEnd)?;
        let key = self.nodes.key_of(node);
        let entry = self.nodes[node]
            .slot_mut()
            .get_mut(version)
            .ok_or(TrieError::StaleCursor)?;
        Ok((key, entry.value_mut()))
    }

    /// Borrowing iterator over every key and its latest value.
    pub fn iter(&self) -> Iter<'_, S, V> {
        Iter {
            trie: self,
            next: self.first_value_from(Position::first_child_of(HEADER), HEADER),
            boundary: HEADER,
        }
    }

    /// Borrowing iterator over the keys starting with `prefix` (the prefix
    /// itself included when it carries a value).
    pub fn iter_prefix(&self, prefix: &[S]) -> Iter<'_, S, V> {
        let start = self.key_root().and_then(|root| {
            let (node, consumed) = self.descend(root, prefix);
            (consumed == prefix.len()).then_some(node)
        });
        let next = start.and_then(|node| {
            if self.nodes[node].has_value() {
                Some(node)
            } else {
                self.first_value_from(Position::first_child_of(node), node)
            }
        });
        Iter {
            trie: self,
            next,
            boundary: start.unwrap_or(HEADER),
        }
    }

    /// Pins the latest version of `node`, or builds the end cursor.
    pub(crate) fn cursor_for(&self, node: Option<NodeId>) -> Cursor {
        let pin = node.and_then(|id| self.nodes[id].slot().latest().map(Pin::acquire));
        match pin {
            Some(pin) => Cursor {
                trie: self.id,
                node,
                pin: Some(pin),
            },
            None => self.end(),
        }
    }

    /// Checks that `cursor` belongs to this trie and still pins a live entry.
    pub(crate) fn resolve(&self, cursor: &Cursor) -> TrieResult<NodeId> {
        if cursor.trie != self.id {
            return Err(TrieError::ForeignCursor {
                cursor_trie: cursor.trie,
                trie: self.id,
            });
        }
        let (node, pin) = match (cursor.node, &cursor.pin) {
            (Some(node), Some(pin)) => (node, pin),
            _ => return Err(TrieError::CursorAtEnd),
        };
        self.nodes
            .get(node)
            .and_then(|n| n.slot().get(pin.version()))
            .map(|_| node)
            .ok_or(TrieError::StaleCursor)
    }

    /// Skips forward from `pos` over exhausted child lists, climbing toward
    /// `boundary`. Returns `None` once every sibling up to the boundary is
    /// exhausted.
    pub(crate) fn settle(&self, mut pos: Position, boundary: NodeId) -> Option<Position> {
        while pos.index >= self.nodes[pos.parent].child_count() {
            if pos.parent == boundary {
                return None;
            }
            let parent = &self.nodes[pos.parent];
            pos = Position {
                parent: parent.parent()?,
                index: parent.index_in_parent() + 1,
            };
        }
        Some(pos)
    }

    /// First value-bearing node at or after `pos` in pre-order, descending
    /// through first children.
    pub(crate) fn first_value_from(&self, pos: Position, boundary: NodeId) -> Option<NodeId> {
        let mut pos = self.settle(pos, boundary)?;
        loop {
            let id = self.nodes.child_at(pos)?;
            let node = &self.nodes[id];
            if node.has_value() {
                return Some(id);
            }
            pos = if node.is_leaf() {
                self.settle(
                    Position {
                        parent: pos.parent,
                        index: pos.index + 1,
                    },
                    boundary,
                )?
            } else {
                Position::first_child_of(id)
            };
        }
    }

    /// The value-bearing node following `id` in pre-order.
    pub(crate) fn next_value_after(&self, id: NodeId, boundary: NodeId) -> Option<NodeId> {
        let node = &self.nodes[id];
        if !node.is_leaf() {
            return self.first_value_from(Position::first_child_of(id), boundary);
        }
        if id == boundary {
            return None;
        }
        let next = Position {
            parent: node.parent()?,
            index: node.index_in_parent() + 1,
        };
        self.first_value_from(next, boundary)
    }
}

/// Borrowing iterator over `(key, latest value)` pairs in traversal order.
///
/// Holds no pins: the shared borrow already keeps the trie from changing.
pub struct Iter<'t, S, V> {
    trie: &'t TrieMap<S, V>,
    next: Option<NodeId>,
    boundary: NodeId,
}

impl<'t, S: Ord + Clone, V> Iterator for Iter<'t, S, V> {
    type Item = (Vec<S>, &'t V);

    fn next(&mut self) -> Option<Self::Item> {
        let trie = self.trie;
        let id = self.next?;
        self.next = trie.next_value_after(id, self.boundary);
        let value = trie.nodes[id].slot().latest()?.value();
        Some((trie.nodes.key_of(id), value))
    }
}

impl<S, V> Clone for Iter<'_, S, V> {
    fn clone(&self) -> Self {
        Self {
            trie: self.trie,
            next: self.next,
            boundary: self.boundary,
        }
    }
}

impl<'t, S: Ord + Clone, V> IntoIterator for &'t TrieMap<S, V> {
    type Item = (Vec<S>, &'t V);
    type IntoIter = Iter<'t, S, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
