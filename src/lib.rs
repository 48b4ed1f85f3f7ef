//! disklru - Journaled Disk LRU Cache
//!
//! A bounded, crash-tolerant key/value cache stored as plain files in one
//! directory. Entries carry a fixed number of byte values and are published
//! atomically; the least recently used entries are evicted when the total
//! size or file count exceeds its limit.
//!
//! ```no_run
//! use disklru::DiskLruCache;
//!
//! # fn main() -> disklru::Result<()> {
//! let cache = DiskLruCache::open("/tmp/thumbs", 1, 1, 10 * 1024 * 1024, 1000)?;
//!
//! if let Some(mut editor) = cache.edit("avatar-42")? {
//!     editor.set(0, "png bytes")?;
//!     editor.commit()?;
//! }
//!
//! if let Some(mut snapshot) = cache.get("avatar-42")? {
//!     let value = snapshot.bytes(0)?;
//!     assert_eq!(&value[..], b"png bytes");
//! }
//! cache.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`cache`] - Cache facade, journal, editors and snapshots
//! - [`error`] - Error types

pub mod cache;
pub mod error;

// Re-export commonly used types
pub use cache::{CacheConfig, CacheStats, DiskLruCache, Editor, Snapshot, ValueWriter};
pub use error::{Error, Result};
