//! Per-key version history for the versioned trie.
//!
//! A [`VersionSlot`] is an append-only log of [`VersionEntry`] values. Only the
//! most recently appended entry may be removed. Each entry carries a shared pin
//! counter that cursors increment while they expose the entry.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Identifier of a single recorded version.
///
/// Ids are issued by the owning trie and are strictly increasing across the
/// whole map; they are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct VersionId(pub u64);

impl VersionId {
    /// Returns the raw id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// One historical value recorded for a key.
pub struct VersionEntry<V> {
    version: VersionId,
    value: V,
    pins: Arc<AtomicU32>,
}

impl<V> VersionEntry<V> {
    fn new(version: VersionId, value: V) -> Self {
        Self {
            version,
            value,
            pins: Arc::new(AtomicU32::new(0)),
        }
    }

    /// The id this entry was recorded under.
    pub fn version(&self) -> VersionId {
        self.version
    }

    /// The recorded value.
    pub fn value(&self) -> &V {
        &self.value
    }

    pub(crate) fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Number of cursors currently exposing this entry.
    pub fn pin_count(&self) -> u32 {
        self.pins.load(Ordering::Acquire)
    }

    /// Whether at least one cursor currently exposes this entry.
    pub fn is_pinned(&self) -> bool {
        self.pin_count() > 0
    }
}

// Copies start unpinned: pins belong to cursors of the source map.
impl<V: Clone> Clone for VersionEntry<V> {
    fn clone(&self) -> Self {
        Self::new(self.version, self.value.clone())
    }
}

impl<V: fmt::Debug> fmt::Debug for VersionEntry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionEntry")
            .field("version", &self.version)
            .field("value", &self.value)
            .field("pins", &self.pin_count())
            .finish()
    }
}

/// A live reference mark on a [`VersionEntry`].
///
/// Acquiring increments the entry's counter, cloning acquires again and
/// dropping releases. The pin never owns the entry's storage.
pub(crate) struct Pin {
    version: VersionId,
    count: Arc<AtomicU32>,
}

impl Pin {
    pub(crate) fn acquire<V>(entry: &VersionEntry<V>) -> Self {
        entry.pins.fetch_add(1, Ordering::AcqRel);
        Self {
            version: entry.version,
            count: Arc::clone(&entry.pins),
        }
    }

    pub(crate) fn version(&self) -> VersionId {
        self.version
    }

    /// Whether both pins reference the same entry.
    pub(crate) fn same_entry(&self, other: &Pin) -> bool {
        Arc::ptr_eq(&self.count, &other.count)
    }
}

impl Clone for Pin {
    fn clone(&self) -> Self {
        self.count.fetch_add(1, Ordering::AcqRel);
        Self {
            version: self.version,
            count: Arc::clone(&self.count),
        }
    }
}

impl Drop for Pin {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::AcqRel);
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pin({})", self.version)
    }
}

/// Append-only history of the values recorded for one key.
///
/// Entries popped while pinned are moved to a retired list instead of being
/// dropped: they no longer belong to the visible history, but the cursors
/// pinning them can still read them. Retired entries are reclaimed on the
/// next mutation of the slot once their pins are gone.
pub struct VersionSlot<V> {
    entries: Vec<VersionEntry<V>>,
    retired: Vec<VersionEntry<V>>,
}

impl<V> VersionSlot<V> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            retired: Vec::new(),
        }
    }

    /// The most recently appended visible entry.
    pub fn latest(&self) -> Option<&VersionEntry<V>> {
        self.entries.last()
    }

    /// Visible history, oldest first.
    pub fn entries(&self) -> &[VersionEntry<V>] {
        &self.entries
    }

    /// Number of visible entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the slot has no visible entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of retired entries still held for their pins.
    pub fn retired_len(&self) -> usize {
        self.retired.len()
    }

    /// Appends a new entry. `version` must be greater than every id already
    /// recorded in this slot.
    pub fn append(&mut self, version: VersionId, value: V) {
        debug_assert!(self.entries.last().map_or(true, |e| e.version < version));
        self.reclaim_retired();
        self.entries.push(VersionEntry::new(version, value));
    }

    /// Removes the most recent visible entry and returns its id.
    ///
    /// A pinned entry is retired rather than dropped.
    pub fn pop_latest(&mut self) -> Option<VersionId> {
        self.reclaim_retired();
        let entry = self.entries.pop()?;
        let version = entry.version;
        if entry.is_pinned() {
            tracing::debug!(%version, pins = entry.pin_count(), "retiring pinned entry");
            self.retired.push(entry);
        }
        Some(version)
    }

    /// True iff any entry, visible or retired, is pinned.
    pub fn has_live_entries(&self) -> bool {
        self.entries
            .iter()
            .chain(self.retired.iter())
            .any(VersionEntry::is_pinned)
    }

    /// Looks up an entry by id among visible and retired entries.
    pub fn get(&self, version: VersionId) -> Option<&VersionEntry<V>> {
        match self.entries.binary_search_by_key(&version, |e| e.version) {
            Ok(i) => Some(&self.entries[i]),
            Err(_) => self.retired.iter().find(|e| e.version == version),
        }
    }

    pub(crate) fn get_mut(&mut self, version: VersionId) -> Option<&mut VersionEntry<V>> {
        match self.entries.binary_search_by_key(&version, |e| e.version) {
            Ok(i) => Some(&mut self.entries[i]),
            Err(_) => self.retired.iter_mut().find(|e| e.version == version),
        }
    }

    /// Drops retired entries that are no longer pinned. Returns how many
    /// were dropped.
    pub fn reclaim_retired(&mut self) -> usize {
        let before = self.retired.len();
        self.retired.retain(VersionEntry::is_pinned);
        before - self.retired.len()
    }
}

impl<V> Default for VersionSlot<V> {
    fn default() -> Self {
        Self::new()
    }
}

// Retired entries are only kept alive for cursors of the source map.
impl<V: Clone> Clone for VersionSlot<V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            retired: Vec::new(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for VersionSlot<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionSlot")
            .field("entries", &self.entries)
            .field("retired", &self.retired.len())
            .finish()
    }
}
