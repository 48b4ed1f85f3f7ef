//! Cache Entry Types
//!
//! Keys and per-entry metadata.

use crate::error::{Error, Result};

/// Longest accepted key
pub const MAX_KEY_LEN: usize = 64;

/// Validate a key against `[a-z0-9_-]{1,64}`
pub fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidKey {
            key: key.to_string(),
        })
    }
}

/// Identity of the editor holding an entry's edit lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditorId(pub(crate) u64);

impl EditorId {
    /// Placeholder for a `DIRTY` record seen during journal replay
    pub(crate) const RECOVERED: EditorId = EditorId(0);
}

/// Metadata for one cache entry
#[derive(Debug, Clone)]
pub struct Entry {
    key: String,
    /// Byte length of each clean value file
    pub(crate) lengths: Vec<u64>,
    /// True once this entry has been published at least once
    pub(crate) readable: bool,
    /// Editor currently holding the edit lock
    pub(crate) current_editor: Option<EditorId>,
    /// Sequence number of the most recent successful commit
    pub(crate) sequence_number: u64,
}

impl Entry {
    /// Create an empty, unpublished entry
    pub fn new(key: impl Into<String>, value_count: usize) -> Self {
        Self {
            key: key.into(),
            lengths: vec![0; value_count],
            readable: false,
            current_editor: None,
            sequence_number: 0,
        }
    }

    /// Entry key
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Clean value lengths, one per slot
    #[inline]
    pub fn lengths(&self) -> &[u64] {
        &self.lengths
    }

    /// Whether the entry has ever been published
    #[inline]
    pub fn is_readable(&self) -> bool {
        self.readable
    }

    /// Whether an edit is in flight
    #[inline]
    pub fn is_being_edited(&self) -> bool {
        self.current_editor.is_some()
    }

    /// Sequence number of the last commit
    #[inline]
    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }
}

// =============================================================================
// Tests
// =============================================================================
