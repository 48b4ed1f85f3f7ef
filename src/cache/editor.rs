//! Editor - exclusive write session for one entry
//!
//! Values are written to dirty files (`key.N.tmp`) and only become visible
//! when [`Editor::commit`] renames them over the clean files. Write errors
//! are hidden from the stream caller and surface at commit time instead.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use super::disk_lru::Inner;
use super::entry::EditorId;
use crate::error::{Error, Result};

/// Edit session returned by [`DiskLruCache::edit`](super::DiskLruCache::edit).
///
/// Ends with exactly one of [`commit`](Editor::commit) or
/// [`abort`](Editor::abort). An editor dropped without either is aborted.
pub struct Editor {
    cache: Arc<Inner>,
    key: String,
    id: EditorId,
    /// Slots written so far; only tracked for entries not yet published
    written: Option<Vec<bool>>,
    value_count: usize,
    faulted: Arc<AtomicBool>,
    done: bool,
}

impl Editor {
    pub(crate) fn new(
        cache: Arc<Inner>,
        key: String,
        id: EditorId,
        readable: bool,
        value_count: usize,
    ) -> Self {
        Self {
            cache,
            key,
            id,
            written: (!readable).then(|| vec![false; value_count]),
            value_count,
            faulted: Arc::new(AtomicBool::new(false)),
            done: false,
        }
    }

    /// Key being edited
    pub fn key(&self) -> &str {
        &self.key
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.value_count {
            return Err(Error::InvalidArgument(format!(
                "expected index {} to be less than the value count of {}",
                index, self.value_count
            )));
        }
        Ok(())
    }

    /// Reader over the last committed value for `index`, or `None` if the
    /// entry has never been published
    pub fn new_input_stream(&self, index: usize) -> Result<Option<File>> {
        self.check_index(index)?;
        let state = self.cache.lock_open()?;
        let entry = match state.table.get(&self.key) {
            Some(entry) if entry.current_editor == Some(self.id) => entry,
            _ => {
                return Err(Error::EditorDetached {
                    key: self.key.clone(),
                })
            }
        };
        if !entry.is_readable() {
            return Ok(None);
        }
        match File::open(state.layout.clean_file(&self.key, index)) {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Last committed value for `index` as a string
    pub fn string(&self, index: usize) -> Result<Option<String>> {
        match self.new_input_stream(index)? {
            Some(mut file) => {
                let mut value = String::new();
                file.read_to_string(&mut value)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Writer for the new value at `index`.
    ///
    /// The writer never reports I/O errors. A failed write marks the edit
    /// faulted, and [`commit`](Editor::commit) then removes the entry.
    pub fn new_output_stream(&mut self, index: usize) -> Result<ValueWriter> {
        self.check_index(index)?;
        let state = self.cache.lock_open()?;
        match state.table.get(&self.key) {
            Some(entry) if entry.current_editor == Some(self.id) => {}
            _ => {
                return Err(Error::EditorDetached {
                    key: self.key.clone(),
                })
            }
        }
        if let Some(written) = self.written.as_mut() {
            written[index] = true;
        }

        // Created under the lock so close() cannot abort between the check
        // and the create and leave an orphan dirty file.
        let path = state.layout.dirty_file(&self.key, index);
        let file = match File::create(&path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // The directory was removed from under us.
                fs::create_dir_all(state.layout.directory())
                    .and_then(|()| File::create(&path))
            }
            other => other,
        };
        drop(state);

        match file {
            Ok(file) => Ok(ValueWriter {
                file: Some(file),
                faulted: Arc::clone(&self.faulted),
            }),
            Err(e) => {
                warn!(key = %self.key, path = %path.display(), "failed to create dirty file: {}", e);
                self.faulted.store(true, Ordering::Release);
                Ok(ValueWriter {
                    file: None,
                    faulted: Arc::clone(&self.faulted),
                })
            }
        }
    }

    /// Replace the value at `index`
    pub fn set(&mut self, index: usize, value: impl AsRef<[u8]>) -> Result<()> {
        let mut writer = self.new_output_stream(index)?;
        writer.write_all(value.as_ref())?;
        Ok(())
    }

    /// Publish the written values, or fail with [`Error::StreamFault`] if a
    /// value stream hit an I/O error. In that case the entry is removed, as
    /// it is when renaming the written files into place fails.
    pub fn commit(mut self) -> Result<()> {
        let metrics = &self.cache.metrics;
        if self.faulted.load(Ordering::Acquire) {
            self.done = true;
            self.cache
                .abort_and_remove(&self.key, self.id, self.written.as_deref())?;
            metrics.record_stream_fault();
            warn!(key = %self.key, "value stream failed, entry removed");
            return Err(Error::StreamFault {
                key: self.key.clone(),
            });
        }

        let result = self
            .cache
            .complete_edit(&self.key, self.id, self.written.as_deref(), true);
        match &result {
            Ok(()) => {
                self.done = true;
                metrics.record_commit();
            }
            Err(Error::IncompleteEdit { .. }) => {
                self.done = true;
                metrics.record_abort();
            }
            Err(Error::EditorDetached { .. }) | Err(Error::Closed) => self.done = true,
            // The entry is gone or its editor already cleared.
            Err(_) => {
                self.done = true;
                metrics.record_abort();
            }
        }
        result
    }

    /// Discard the written values. A first-time entry is removed.
    pub fn abort(mut self) -> Result<()> {
        self.abort_unless_committed()
    }

    /// Abort unless `commit` or `abort` already finished this edit
    pub fn abort_unless_committed(&mut self) -> Result<()> {
        if self.done {
            return Ok(());
        }
        let result = self
            .cache
            .complete_edit(&self.key, self.id, self.written.as_deref(), false);
        match &result {
            Ok(()) => {
                self.done = true;
                self.cache.metrics.record_abort();
            }
            Err(Error::EditorDetached { .. }) | Err(Error::Closed) => self.done = true,
            // The entry is gone or its editor already cleared.
            Err(_) => {
                self.done = true;
                self.cache.metrics.record_abort();
            }
        }
        result
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        if let Err(e) = self.abort_unless_committed() {
            debug!(key = %self.key, "abort on drop failed: {}", e);
        }
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("key", &self.key)
            .field("done", &self.done)
            .finish()
    }
}

// =============================================================================
// Fault-hiding value writer
// =============================================================================

/// Writer over one dirty file.
///
/// I/O errors are swallowed and recorded on the owning editor, so callers
/// streaming into the cache never see a partial-write error.
#[derive(Debug)]
pub struct ValueWriter {
    file: Option<File>,
    faulted: Arc<AtomicBool>,
}

impl ValueWriter {
    fn fault(&mut self, e: io::Error) {
        debug!("value stream failed: {}", e);
        self.faulted.store(true, Ordering::Release);
        self.file = None;
    }

    /// Whether a write on this edit has failed
    pub fn is_faulted(&self) -> bool {
        self.faulted.load(Ordering::Acquire)
    }
}

impl Write for ValueWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(file) = self.file.as_mut() {
            if let Err(e) = file.write_all(buf) {
                self.fault(e);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.as_mut() {
            if let Err(e) = file.flush() {
                self.fault(e);
            }
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::super::DiskLruCache;
    use super::*;
    use assert_matches::assert_matches;

    fn cache(dir: &std::path::Path, value_count: usize) -> DiskLruCache {
        DiskLruCache::open(dir, 1, value_count, 1000, 100).unwrap()
    }

    #[test]
    fn test_output_stream_writes_dirty_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path(), 1);
        let mut editor = cache.edit("k").unwrap().unwrap();
        let mut writer = editor.new_output_stream(0).unwrap();
        writer.write_all(b"hello").unwrap();
        writer.flush().unwrap();
        assert!(!writer.is_faulted());
        assert_eq!(fs::read(dir.path().join("k.0.tmp")).unwrap(), b"hello");
        assert!(!dir.path().join("k.0").exists());

        editor.commit().unwrap();
        assert_eq!(fs::read(dir.path().join("k.0")).unwrap(), b"hello");
        assert!(!dir.path().join("k.0.tmp").exists());
    }

    #[test]
    fn test_index_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path(), 2);
        let mut editor = cache.edit("k").unwrap().unwrap();
        assert_matches!(editor.new_output_stream(2), Err(Error::InvalidArgument(_)));
        assert_matches!(editor.new_input_stream(5), Err(Error::InvalidArgument(_)));
    }

    #[test]
    fn test_first_commit_requires_every_slot() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path(), 2);
        let mut editor = cache.edit("k").unwrap().unwrap();
        editor.set(0, "a").unwrap();
        assert_matches!(
            editor.commit(),
            Err(Error::IncompleteEdit { index: 1, .. })
        );
        assert!(cache.get("k").unwrap().is_none());
        assert!(!dir.path().join("k.0.tmp").exists());
        // The lock was released.
        assert!(cache.edit("k").unwrap().is_some());
    }

    #[test]
    fn test_partial_update_keeps_other_slots() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path(), 2);
        let mut editor = cache.edit("k").unwrap().unwrap();
        editor.set(0, "a").unwrap();
        editor.set(1, "b").unwrap();
        editor.commit().unwrap();

        let mut editor = cache.edit("k").unwrap().unwrap();
        assert_eq!(editor.string(1).unwrap().as_deref(), Some("b"));
        editor.set(1, "bb").unwrap();
        editor.commit().unwrap();

        let mut snapshot = cache.get("k").unwrap().unwrap();
        assert_eq!(snapshot.string(0).unwrap(), "a");
        assert_eq!(snapshot.string(1).unwrap(), "bb");
    }

    #[test]
    fn test_input_stream_of_new_entry_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path(), 1);
        let editor = cache.edit("k").unwrap().unwrap();
        assert!(editor.new_input_stream(0).unwrap().is_none());
        assert!(editor.string(0).unwrap().is_none());
    }

    #[test]
    fn test_drop_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path(), 1);
        {
            let mut editor = cache.edit("k").unwrap().unwrap();
            editor.set(0, "x").unwrap();
        }
        assert!(!dir.path().join("k.0.tmp").exists());
        assert!(cache.get("k").unwrap().is_none());
        assert_eq!(cache.stats().aborts, 1);
    }

    #[test]
    fn test_abort_unless_committed_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path(), 1);
        let mut editor = cache.edit("k").unwrap().unwrap();
        editor.set(0, "x").unwrap();
        editor.abort_unless_committed().unwrap();
        editor.abort_unless_committed().unwrap();
        drop(editor);
        assert_eq!(cache.stats().aborts, 1);
    }

    #[test]
    fn test_stream_fault_removes_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path(), 1);
        let mut editor = cache.edit("k").unwrap().unwrap();
        editor.set(0, "old").unwrap();
        editor.commit().unwrap();

        let mut editor = cache.edit("k").unwrap().unwrap();
        let mut writer = editor.new_output_stream(0).unwrap();
        writer.fault(io::Error::new(io::ErrorKind::Other, "disk full"));
        assert!(writer.is_faulted());
        // Further writes are swallowed.
        writer.write_all(b"ignored").unwrap();

        assert_matches!(editor.commit(), Err(Error::StreamFault { .. }));
        assert!(cache.get("k").unwrap().is_none());
        assert_eq!(cache.stats().stream_faults, 1);
    }

    #[test]
    fn test_stream_fault_aborts_and_removes_in_one_step() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path(), 1);
        let mut editor = cache.edit("k").unwrap().unwrap();
        editor.set(0, "old").unwrap();
        editor.commit().unwrap();

        let mut editor = cache.edit("k").unwrap().unwrap();
        editor
            .new_output_stream(0)
            .unwrap()
            .fault(io::Error::new(io::ErrorKind::Other, "disk full"));
        assert_matches!(editor.commit(), Err(Error::StreamFault { .. }));

        let journal = fs::read_to_string(dir.path().join("journal")).unwrap();
        let tail: Vec<&str> = journal.lines().rev().take(3).collect();
        assert_eq!(tail, vec!["REMOVE k", "CLEAN k 3", "DIRTY k"]);
        assert!(!dir.path().join("k.0").exists());
    }

    #[test]
    fn test_stream_fault_removes_entry_despite_competing_editors() {
        for _ in 0..20 {
            let dir = tempfile::tempdir().unwrap();
            let cache = cache(dir.path(), 1);
            let mut editor = cache.edit("k").unwrap().unwrap();
            editor.set(0, "old").unwrap();
            editor.commit().unwrap();

            let stop = Arc::new(AtomicBool::new(false));
            let racer = {
                let cache = cache.clone();
                let stop = Arc::clone(&stop);
                std::thread::spawn(move || {
                    while !stop.load(Ordering::Acquire) {
                        // Dropping aborts, which keeps a readable entry.
                        if let Ok(Some(editor)) = cache.edit("k") {
                            drop(editor);
                        }
                    }
                })
            };

            let mut editor = loop {
                if let Some(editor) = cache.edit("k").unwrap() {
                    break editor;
                }
            };
            editor
                .new_output_stream(0)
                .unwrap()
                .fault(io::Error::new(io::ErrorKind::Other, "disk full"));
            assert_matches!(editor.commit(), Err(Error::StreamFault { .. }));
            stop.store(true, Ordering::Release);
            racer.join().unwrap();

            assert!(cache.get("k").unwrap().is_none());
        }
    }

    #[test]
    fn test_stale_editor_after_close() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path(), 1);
        let mut editor = cache.edit("k").unwrap().unwrap();
        cache.close().unwrap();
        assert_matches!(editor.new_output_stream(0), Err(Error::Closed));
        assert_matches!(editor.abort(), Err(Error::Closed));
    }
}
