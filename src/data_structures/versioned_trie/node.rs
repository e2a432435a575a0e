//! Node storage for the versioned trie.
//!
//! Nodes live in a [`NodeArena`] and refer to each other by [`NodeId`].
//! A node owns its children (removing a node releases its whole subtree);
//! the parent link is a plain id and never owns anything.

use std::ops::{Index, IndexMut};

use super::slot::VersionSlot;

/// Stable handle of a node inside its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

/// The valueless sentinel at the top of every trie.
pub(crate) const HEADER: NodeId = NodeId(0);

/// A `(parent, index)` pair naming the node `parent.child(index)`, or the
/// position one past the last child when `index == parent.child_count()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Position {
    pub(crate) parent: NodeId,
    pub(crate) index: usize,
}

impl Position {
    pub(crate) fn first_child_of(parent: NodeId) -> Self {
        Self { parent, index: 0 }
    }
}

/// A node in the versioned trie.
///
/// `symbols[i]` labels the edge to `children[i]`; both vectors are kept
/// sorted by symbol. The header is the one exception: it has no symbols and
/// at most one child, the node for the empty key.
#[derive(Debug, Clone)]
pub(crate) struct Node<S, V> {
    symbols: Vec<S>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    index_in_parent: usize,
    slot: VersionSlot<V>,
}

impl<S: Ord, V> Node<S, V> {
    fn new(parent: Option<NodeId>, index_in_parent: usize) -> Self {
        Self {
            symbols: Vec::new(),
            children: Vec::new(),
            parent,
            index_in_parent,
            slot: VersionSlot::new(),
        }
    }

    /// Binary search for the child reached through `symbol`.
    pub(crate) fn find(&self, symbol: &S) -> Option<NodeId> {
        self.symbols
            .binary_search(symbol)
            .ok()
            .map(|i| self.children[i])
    }

    pub(crate) fn child(&self, index: usize) -> Option<NodeId> {
        self.children.get(index).copied()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn first_child(&self) -> Option<NodeId> {
        self.children.first().copied()
    }

    pub(crate) fn symbol(&self, index: usize) -> Option<&S> {
        self.symbols.get(index)
    }

    pub(crate) fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub(crate) fn index_in_parent(&self) -> usize {
        self.index_in_parent
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether the node carries at least one visible version.
    pub(crate) fn has_value(&self) -> bool {
        !self.slot.is_empty()
    }

    /// Whether any version of the node, visible or retired, is pinned.
    pub(crate) fn has_live_value(&self) -> bool {
        self.slot.has_live_entries()
    }

    pub(crate) fn slot(&self) -> &VersionSlot<V> {
        &self.slot
    }

    pub(crate) fn slot_mut(&mut self) -> &mut VersionSlot<V> {
        &mut self.slot
    }
}

/// Slab of trie nodes with a free list.
///
/// Slot 0 always holds the header.
#[derive(Debug, Clone)]
pub(crate) struct NodeArena<S, V> {
    slots: Vec<Option<Node<S, V>>>,
    free: Vec<NodeId>,
}

impl<S: Ord, V> NodeArena<S, V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: vec![Some(Node::new(None, 0))],
            free: Vec::new(),
        }
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<S, V>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Number of allocated nodes, header included.
    pub(crate) fn live_nodes(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Ids of every allocated node except the header.
    pub(crate) fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| NodeId(i))
    }

    /// Node at `pos`, if the position names an existing child.
    pub(crate) fn child_at(&self, pos: Position) -> Option<NodeId> {
        self.get(pos.parent).and_then(|p| p.child(pos.index))
    }

    fn alloc(&mut self, node: Node<S, V>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.slots[id.0] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Frees `id` and its whole subtree. Returns the number of nodes freed.
    fn release(&mut self, id: NodeId) -> usize {
        let mut stack = vec![id];
        let mut freed = 0;
        while let Some(next) = stack.pop() {
            if let Some(node) = self.slots.get_mut(next.0).and_then(Option::take) {
                stack.extend(node.children);
                self.free.push(next);
                freed += 1;
            }
        }
        freed
    }

    /// Creates the empty-key node under the header.
    pub(crate) fn attach_key_root(&mut self) -> NodeId {
        debug_assert!(self[HEADER].is_leaf());
        let id = self.alloc(Node::new(Some(HEADER), 0));
        self[HEADER].children.push(id);
        id
    }

    /// Creates a child of `parent` reached through `symbol`, keeping the
    /// edges sorted. Every sibling shifted right has its cached index bumped.
    pub(crate) fn insert_child(&mut self, parent: NodeId, symbol: S) -> NodeId {
        let pos = match self[parent].symbols.binary_search(&symbol) {
            Ok(existing) => return self[parent].children[existing],
            Err(pos) => pos,
        };
        let id = self.alloc(Node::new(Some(parent), pos));
        let node = &mut self[parent];
        node.symbols.insert(pos, symbol);
        node.children.insert(pos, id);
        self.renumber_from(parent, pos + 1);
        id
    }

    /// Detaches and frees the child at `index`, renumbering later siblings.
    /// Returns the number of nodes freed.
    pub(crate) fn erase_child(&mut self, parent: NodeId, index: usize) -> usize {
        let node = &mut self[parent];
        // the header has no edge symbols
        if !node.symbols.is_empty() {
            node.symbols.remove(index);
        }
        let child = node.children.remove(index);
        self.renumber_from(parent, index);
        self.release(child)
    }

    fn renumber_from(&mut self, parent: NodeId, start: usize) {
        for index in start..self[parent].children.len() {
            let sibling = self[parent].children[index];
            self[sibling].index_in_parent = index;
        }
    }

    /// The symbol labelling the edge from the node's parent.
    pub(crate) fn edge_symbol(&self, id: NodeId) -> Option<&S> {
        let node = self.get(id)?;
        self.get(node.parent?)?.symbol(node.index_in_parent)
    }

    /// Rebuilds the full key of `id` by walking up to the key root.
    pub(crate) fn key_of(&self, id: NodeId) -> Vec<S>
    where
        S: Clone,
    {
        let mut key = Vec::new();
        let mut current = id;
        while let Some(symbol) = self.edge_symbol(current) {
            key.push(symbol.clone());
            match self.get(current).and_then(Node::parent) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        key.reverse();
        key
    }
}

impl<S, V> Index<NodeId> for NodeArena<S, V> {
    type Output = Node<S, V>;

    fn index(&self, id: NodeId) -> &Self::Output {
        match self.slots.get(id.0) {
            Some(Some(node)) => node,
            _ => panic!("trie node {id:?} is not allocated"),
        }
    }
}

impl<S, V> IndexMut<NodeId> for NodeArena<S, V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        match self.slots.get_mut(id.0) {
            Some(Some(node)) => node,
            _ => panic!("trie node {id:?} is not allocated"),
        }
    }
}
