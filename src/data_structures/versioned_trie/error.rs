//! Error types for the versioned trie.
//!
//! Absence of a key is never an error; these cover misuse of cursor handles.

/// Errors that can occur when a cursor is handed back to a trie.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrieError {
    /// The cursor was produced by a different trie.
    #[error("cursor belongs to trie #{cursor_trie}, not trie #{trie}")]
    ForeignCursor {
        /// Id of the trie that produced the cursor.
        cursor_trie: u64,
        /// Id of the trie the cursor was used with.
        trie: u64,
    },

    /// The cursor is positioned past the last element.
    #[error("cursor is at the end of the trie")]
    CursorAtEnd,

    /// The entry the cursor pinned no longer exists (the trie was cleared),
    /// or an erase went through a cursor not on its node's latest version.
    #[error("cursor no longer references a live entry")]
    StaleCursor,

    /// The end of a range is not reachable from its start.
    #[error("range end is not reachable from range start")]
    InvalidRange,
}
