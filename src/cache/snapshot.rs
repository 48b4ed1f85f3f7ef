//! Snapshot - point-in-time view of one entry's values

use std::fs::File;
use std::io::Read;
use std::sync::Arc;

use bytes::Bytes;

use super::disk_lru::Inner;
use super::editor::Editor;
use crate::error::{Error, Result};

/// Values of an entry as of one commit.
///
/// Every value file is already open, so later commits, removals or
/// evictions of the same key do not change what this snapshot reads.
pub struct Snapshot {
    cache: Arc<Inner>,
    key: String,
    sequence_number: u64,
    readers: Vec<File>,
    lengths: Vec<u64>,
}

impl Snapshot {
    pub(crate) fn new(
        cache: Arc<Inner>,
        key: String,
        sequence_number: u64,
        readers: Vec<File>,
        lengths: Vec<u64>,
    ) -> Self {
        Self {
            cache,
            key,
            sequence_number,
            readers,
            lengths,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Sequence number of the commit this snapshot reads
    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.readers.len() {
            return Err(Error::InvalidArgument(format!(
                "expected index {} to be less than the value count of {}",
                index,
                self.readers.len()
            )));
        }
        Ok(())
    }

    /// Byte length of value `index` as recorded at commit
    pub fn length(&self, index: usize) -> Result<u64> {
        self.check_index(index)?;
        Ok(self.lengths[index])
    }

    /// Reader over value `index`
    pub fn reader(&mut self, index: usize) -> Result<&mut File> {
        self.check_index(index)?;
        Ok(&mut self.readers[index])
    }

    /// Remaining contents of value `index` as UTF-8
    pub fn string(&mut self, index: usize) -> Result<String> {
        let mut value = String::new();
        self.reader(index)?.read_to_string(&mut value)?;
        Ok(value)
    }

    /// Remaining contents of value `index`
    pub fn bytes(&mut self, index: usize) -> Result<Bytes> {
        let file = self.reader(index)?;
        // Size from the open file, not the journaled length.
        let hint = usize::try_from(file.metadata()?.len()).unwrap_or(0);
        let mut value = Vec::with_capacity(hint);
        file.read_to_end(&mut value)?;
        Ok(Bytes::from(value))
    }

    /// Editor for this entry, or `None` if it changed since the snapshot
    /// was taken or another edit is in progress
    pub fn edit(&self) -> Result<Option<Editor>> {
        self.cache.edit(&self.key, Some(self.sequence_number))
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("key", &self.key)
            .field("sequence_number", &self.sequence_number)
            .field("lengths", &self.lengths)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
