//! Error types for the disk cache

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while operating a disk cache
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // =========================================================================
    // Precondition Violations
    // =========================================================================
    /// Key does not match `[a-z0-9_-]{1,64}`
    #[error("keys must match regex [a-z0-9_-]{{1,64}}: \"{key}\"")]
    InvalidKey { key: String },

    /// Invalid constructor argument or value index
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation on a closed cache
    #[error("cache is closed")]
    Closed,

    /// First-time entry committed without a value for every slot
    #[error("newly created entry {key} didn't create value for index {index}")]
    IncompleteEdit { key: String, index: usize },

    /// Editor used after its edit lock was released elsewhere
    #[error("editor for {key} is no longer the active editor")]
    EditorDetached { key: String },

    /// A value stream failed while writing; the edit was aborted and the
    /// entry removed
    #[error("writing a value for {key} failed; edit aborted and entry removed")]
    StreamFault { key: String },

    // =========================================================================
    // Journal Errors
    // =========================================================================
    /// Structural journal corruption
    #[error("Corrupt journal: {0}")]
    CorruptJournal(String),

    /// Line reader constructed with a multi-byte charset
    #[error("Unsupported encoding: {0}")]
    UnsupportedCharset(String),
}

impl Error {
    /// True for errors that `open()` answers by wiping the directory
    pub fn is_corruption(&self) -> bool {
        match self {
            Error::CorruptJournal(_) => true,
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
