//! Journaled Disk LRU Cache
//!
//! A bounded key/value cache on the local filesystem. Each entry holds a
//! fixed number of values stored as plain files; an append-only journal
//! records every edit, publish, read and removal so the cache survives
//! process crashes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                          DiskLruCache                                 │
//! │        open / get / edit / remove / flush / close / delete            │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │  Mutex<State>                          │  CleanupWorker               │
//! │  ┌──────────────┐  ┌───────────────┐   │  ┌────────────────────────┐ │
//! │  │ EntryTable   │  │ JournalWriter │   │  │ disk-lru-cleanup thread│ │
//! │  │ (LRU order)  │  │ (append-only) │   │  │ trim + rebuild journal │ │
//! │  └──────────────┘  └───────────────┘   │  └────────────────────────┘ │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │  Editor ──▶ key.N.tmp ──commit──▶ key.N ◀── Snapshot (open files)     │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Guarantees
//!
//! - A snapshot never mixes values from two commits
//! - At most one editor per key at a time
//! - After `flush()` or `close()`, size and file count are within bounds
//!   unless every remaining entry is being edited
//! - A corrupt journal never serves partial state: the cache starts empty

mod disk_lru;
mod editor;
mod entry;
mod journal;
mod layout;
mod line_reader;
mod metrics;
mod snapshot;
mod table;
mod worker;

#[cfg(test)]
mod proptest;

pub use disk_lru::{CacheConfig, DiskLruCache};
pub use editor::{Editor, ValueWriter};
pub use entry::{validate_key, MAX_KEY_LEN};
pub use journal::{JournalHeader, Record, JOURNAL_FILE, JOURNAL_FILE_BACKUP, JOURNAL_FILE_TEMP, MAGIC};
pub use line_reader::{Charset, StrictLineReader};
pub use metrics::{CacheMetrics, CacheStats};
pub use snapshot::Snapshot;

/// Superseded journal records tolerated before a rebuild is considered
pub const REDUNDANT_OP_COMPACT_THRESHOLD: u64 = 2000;

/// Default byte budget (50MB)
pub const DEFAULT_MAX_SIZE: u64 = 50 * 1024 * 1024;

/// Default file budget
pub const DEFAULT_MAX_FILE_COUNT: u64 = 10_000;

// =============================================================================
// Tests
// =============================================================================
