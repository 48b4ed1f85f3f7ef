//! Disk LRU Cache - journaled, size- and count-bounded key/value store
//!
//! Each entry has a key and a fixed number of values. Values are byte
//! sequences stored as files in the cache directory. The cache keeps the
//! sum of value lengths under `max_size` and the number of value files under
//! `max_file_count`, evicting least recently used entries on a background
//! thread when a commit pushes it past either bound.
//!
//! # Durability
//!
//! Every state change is appended to a journal before or as it becomes
//! visible:
//!
//! ```text
//!  edit(k) ──▶ DIRTY k (flushed) ──▶ write k.N.tmp ──▶ commit ──▶ rename ──▶ CLEAN k len..
//!                                                  └─▶ abort  ──▶ delete .tmp
//! ```
//!
//! A crash between `DIRTY` and `CLEAN` leaves the edit invisible; replay at
//! [`DiskLruCache::open`] drops such entries and their files. A journal that
//! cannot be parsed means the whole directory is discarded and the cache
//! starts empty.
//!
//! # Concurrency
//!
//! A single mutex guards the entry table, the counters and journal appends.
//! It is never held while callers copy value bytes, so editors on different
//! keys stream concurrently.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, instrument, warn};

use super::editor::Editor;
use super::entry::{validate_key, EditorId};
use super::journal::{JournalHeader, JournalWriter, Record};
use super::layout::{delete_dir_if_exists, delete_if_exists, CacheLayout};
use super::line_reader::{Charset, StrictLineReader};
use super::metrics::{CacheMetrics, CacheStats};
use super::snapshot::Snapshot;
use super::table::EntryTable;
use super::worker::{Cleanup, CleanupWorker};
use super::{DEFAULT_MAX_FILE_COUNT, DEFAULT_MAX_SIZE, REDUNDANT_OP_COMPACT_THRESHOLD};
use crate::error::{Error, Result};

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory exclusively owned by the cache
    pub directory: PathBuf,
    /// Application version; changing it discards existing contents
    pub app_version: u32,
    /// Value slots per entry
    pub value_count: usize,
    /// Maximum total bytes of clean values
    pub max_size: u64,
    /// Maximum number of clean value files
    pub max_file_count: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("disklru"),
            app_version: 1,
            value_count: 1,
            max_size: DEFAULT_MAX_SIZE,
            max_file_count: DEFAULT_MAX_FILE_COUNT,
        }
    }
}

impl CacheConfig {
    /// Configuration for `directory` with default bounds
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Default::default()
        }
    }

    /// Check the argument rules enforced by `open`
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(Error::InvalidArgument("maxSize <= 0".to_string()));
        }
        if self.max_file_count == 0 {
            return Err(Error::InvalidArgument("maxFileCount <= 0".to_string()));
        }
        if self.value_count == 0 {
            return Err(Error::InvalidArgument("valueCount <= 0".to_string()));
        }
        Ok(())
    }

    fn header(&self) -> JournalHeader {
        JournalHeader {
            app_version: self.app_version,
            value_count: self.value_count,
        }
    }
}

// =============================================================================
// State (guarded by the cache lock)
// =============================================================================

pub(crate) struct State {
    pub(crate) layout: CacheLayout,
    header: JournalHeader,
    /// `None` once the cache is closed
    journal: Option<JournalWriter>,
    pub(crate) table: EntryTable,
    size: u64,
    file_count: u64,
    max_size: u64,
    max_file_count: u64,
    redundant_op_count: u64,
    next_sequence_number: u64,
}

impl State {
    pub(crate) fn new(config: &CacheConfig) -> Self {
        Self {
            layout: CacheLayout::new(config.directory.clone()),
            header: config.header(),
            journal: None,
            table: EntryTable::new(config.value_count),
            size: 0,
            file_count: 0,
            max_size: config.max_size,
            max_file_count: config.max_file_count,
            redundant_op_count: 0,
            next_sequence_number: 0,
        }
    }

    #[inline]
    pub(crate) fn value_count(&self) -> usize {
        self.header.value_count
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.journal.is_none()
    }

    fn journal(&mut self) -> Result<&mut JournalWriter> {
        self.journal.as_mut().ok_or(Error::Closed)
    }

    /// Replay the journal at `layout.journal()`. Returns true if it ended
    /// with an unterminated record.
    pub(crate) fn read_journal(&mut self) -> Result<bool> {
        let file = File::open(self.layout.journal())?;
        let mut reader = StrictLineReader::new(file, Charset::UsAscii)?;
        self.header.read_from(&mut reader)?;

        let value_count = self.value_count();
        let mut line_count: u64 = 0;
        loop {
            match reader.read_line() {
                Ok(Some(line)) => {
                    self.table.replay(Record::parse(&line, value_count)?);
                    line_count += 1;
                }
                Ok(None) => break,
                Err(e)
                    if e.kind() == io::ErrorKind::UnexpectedEof
                        && reader.has_unterminated_line() =>
                {
                    break
                }
                Err(e) => return Err(e.into()),
            }
        }
        self.redundant_op_count = line_count.saturating_sub(self.table.len() as u64);
        Ok(reader.has_unterminated_line())
    }

    /// Drop entries a crash left mid-edit and total up the survivors
    fn process_journal(&mut self) -> Result<()> {
        let value_count = self.value_count();
        for entry in self.table.drain_incomplete() {
            debug!(key = entry.key(), "dropping incomplete entry");
            for i in 0..value_count {
                delete_if_exists(&self.layout.clean_file(entry.key(), i))?;
                delete_if_exists(&self.layout.dirty_file(entry.key(), i))?;
            }
        }
        for entry in self.table.iter() {
            let total = entry
                .lengths()
                .iter()
                .try_fold(self.size, |acc, len| acc.checked_add(*len))
                .ok_or_else(|| {
                    Error::CorruptJournal(format!("lengths of {} overflow the cache size", entry.key()))
                })?;
            self.size = total;
            self.file_count += value_count as u64;
        }
        Ok(())
    }

    /// Replace the journal with the minimal record set for the current table
    pub(crate) fn rebuild_journal(&mut self, metrics: &CacheMetrics) -> Result<()> {
        if let Some(journal) = self.journal.as_mut() {
            journal.flush()?;
        }

        let journal = self.layout.journal();
        let temp = self.layout.journal_temp();
        let backup = self.layout.journal_backup();

        JournalWriter::write_fresh(&temp, &self.header, &self.table.snapshot_records())?;
        if journal.exists() {
            fs::rename(&journal, &backup)?;
        }
        fs::rename(&temp, &journal)?;
        delete_if_exists(&backup)?;

        self.journal = Some(JournalWriter::open_append(&journal)?);
        self.redundant_op_count = 0;
        metrics.record_rebuild();
        debug!(entries = self.table.len(), "rebuilt journal");
        Ok(())
    }

    /// Rebuild only when it would shrink the journal meaningfully
    fn journal_rebuild_required(&self) -> bool {
        self.redundant_op_count >= REDUNDANT_OP_COMPACT_THRESHOLD
            && self.redundant_op_count >= self.table.len() as u64
    }

    fn over_bounds(&self) -> bool {
        self.size > self.max_size || self.file_count > self.max_file_count
    }

    fn needs_cleanup(&self) -> bool {
        self.over_bounds() || self.journal_rebuild_required()
    }

    /// Delete an entry's clean files and log `REMOVE`. Refuses entries that
    /// are missing or being edited.
    fn remove_entry(&mut self, key: &str) -> Result<bool> {
        let lengths = match self.table.get(key) {
            Some(entry) if !entry.is_being_edited() => entry.lengths().to_vec(),
            _ => return Ok(false),
        };

        for (i, len) in lengths.iter().enumerate() {
            delete_if_exists(&self.layout.clean_file(key, i))?;
            self.size = self.size.saturating_sub(*len);
            self.file_count = self.file_count.saturating_sub(1);
            if let Some(entry) = self.table.get_mut(key) {
                entry.lengths[i] = 0;
            }
        }

        self.redundant_op_count += 1;
        let journal = self.journal()?;
        journal.append(&Record::Remove(key.to_string()))?;
        journal.flush()?;
        self.table.remove(key);
        Ok(true)
    }

    /// Evict from the least recently used end until both bounds hold
    fn trim(&mut self, metrics: &CacheMetrics) -> Result<()> {
        while self.over_bounds() {
            let key = match self.table.eviction_candidate() {
                Some(key) => key.to_string(),
                None => break,
            };
            if !self.remove_entry(&key)? {
                break;
            }
            metrics.record_eviction();
            debug!(key = %key, size = self.size, file_count = self.file_count, "evicted entry");
        }
        Ok(())
    }

    /// Publish or discard the dirty files of an edit and release its lock.
    ///
    /// `written` is the editor's per-slot write record, present only for
    /// entries that were not yet readable when the edit began.
    pub(crate) fn complete_edit(
        &mut self,
        key: &str,
        id: EditorId,
        written: Option<&[bool]>,
        success: bool,
    ) -> Result<()> {
        let readable = match self.table.get(key) {
            Some(entry) if entry.current_editor == Some(id) => entry.is_readable(),
            _ => {
                return Err(Error::EditorDetached {
                    key: key.to_string(),
                })
            }
        };
        let value_count = self.value_count();

        if success && !readable {
            for i in 0..value_count {
                let was_written = written.map_or(true, |w| w[i]);
                if !was_written || !self.layout.dirty_file(key, i).exists() {
                    self.complete_edit(key, id, written, false)?;
                    return Err(Error::IncompleteEdit {
                        key: key.to_string(),
                        index: i,
                    });
                }
            }
        }

        if success {
            if let Err(e) = self.publish_slots(key) {
                // Some slots may already be renamed; never journal a mix.
                warn!(key = %key, "publishing edit failed, removing entry: {}", e);
                self.discard_entry(key)?;
                return Err(e);
            }
        } else {
            for i in 0..value_count {
                let dirty = self.layout.dirty_file(key, i);
                if let Err(e) = delete_if_exists(&dirty) {
                    warn!(path = %dirty.display(), "failed to delete dirty file: {}", e);
                }
            }
        }

        self.redundant_op_count += 1;
        let next_sequence_number = self.next_sequence_number;
        let record = match self.table.get_mut(key) {
            Some(entry) => {
                entry.current_editor = None;
                if readable || success {
                    entry.readable = true;
                    if success {
                        entry.sequence_number = next_sequence_number;
                    }
                    Some(Record::Clean {
                        key: key.to_string(),
                        lengths: entry.lengths.clone(),
                    })
                } else {
                    None
                }
            }
            None => None,
        };
        let record = match record {
            Some(record) => {
                if success {
                    self.next_sequence_number += 1;
                }
                record
            }
            None => {
                self.table.remove(key);
                Record::Remove(key.to_string())
            }
        };

        let journal = self.journal()?;
        journal.append(&record)?;
        journal.flush()?;
        Ok(())
    }

    /// Rename every written dirty file over its clean file
    fn publish_slots(&mut self, key: &str) -> Result<()> {
        for i in 0..self.value_count() {
            let dirty = self.layout.dirty_file(key, i);
            if !dirty.exists() {
                continue;
            }
            let clean = self.layout.clean_file(key, i);
            let had_clean = clean.exists();
            fs::rename(&dirty, &clean)?;
            let new_len = fs::metadata(&clean)?.len();
            if let Some(entry) = self.table.get_mut(key) {
                let old_len = std::mem::replace(&mut entry.lengths[i], new_len);
                self.size = self.size.saturating_sub(old_len).saturating_add(new_len);
            }
            if !had_clean {
                self.file_count += 1;
            }
        }
        Ok(())
    }

    /// Drop an entry and all of its files regardless of edit state, and log
    /// `REMOVE`. Deletes are best effort.
    fn discard_entry(&mut self, key: &str) -> Result<()> {
        let lengths = match self.table.remove(key) {
            Some(entry) => entry.lengths,
            None => return Ok(()),
        };
        for (i, len) in lengths.iter().enumerate() {
            let clean = self.layout.clean_file(key, i);
            if clean.exists() {
                self.file_count = self.file_count.saturating_sub(1);
            }
            self.size = self.size.saturating_sub(*len);
            for path in [clean, self.layout.dirty_file(key, i)] {
                if let Err(e) = delete_if_exists(&path) {
                    warn!(path = %path.display(), "failed to delete value file: {}", e);
                }
            }
        }

        self.redundant_op_count += 1;
        let journal = self.journal()?;
        journal.append(&Record::Remove(key.to_string()))?;
        journal.flush()?;
        Ok(())
    }

    fn fill_stats(&self, stats: &mut CacheStats) {
        stats.size = self.size;
        stats.max_size = self.max_size;
        stats.file_count = self.file_count;
        stats.max_file_count = self.max_file_count;
        stats.entries = self.table.len();
        stats.redundant_op_count = self.redundant_op_count;
    }
}

// =============================================================================
// Shared cache internals
// =============================================================================

pub(crate) struct Inner {
    directory: PathBuf,
    pub(crate) state: Mutex<State>,
    pub(crate) metrics: CacheMetrics,
    worker: CleanupWorker,
    next_editor_id: AtomicU64,
    span: tracing::Span,
}

impl Inner {
    /// Lock the state, failing if the cache is closed
    pub(crate) fn lock_open(&self) -> Result<MutexGuard<'_, State>> {
        let state = self.state.lock();
        if state.is_closed() {
            return Err(Error::Closed);
        }
        Ok(state)
    }

    /// Hand a cleanup pass to the background worker
    pub(crate) fn schedule_cleanup(&self) {
        if self.worker.schedule() {
            debug!(parent: &self.span, "scheduled cleanup");
        }
    }

    /// Begin an edit, optionally only if the entry is still at `expected`
    pub(crate) fn edit(
        self: &Arc<Self>,
        key: &str,
        expected_sequence_number: Option<u64>,
    ) -> Result<Option<Editor>> {
        let mut guard = self.lock_open()?;
        validate_key(key)?;
        let state = &mut *guard;

        let current = state
            .table
            .get(key)
            .map(|entry| (entry.sequence_number(), entry.is_being_edited()));
        match (expected_sequence_number, current) {
            (Some(_), None) => return Ok(None),
            (Some(expected), Some((actual, _))) if expected != actual => return Ok(None),
            (_, Some((_, true))) => return Ok(None),
            _ => {}
        }

        // DIRTY must be durable before any dirty file exists.
        let journal = state.journal()?;
        journal.append(&Record::Dirty(key.to_string()))?;
        journal.flush()?;

        let id = EditorId(self.next_editor_id.fetch_add(1, Ordering::Relaxed));
        let entry = state.table.get_or_insert(key);
        entry.current_editor = Some(id);
        let readable = entry.is_readable();
        let value_count = state.value_count();
        drop(guard);

        Ok(Some(Editor::new(
            Arc::clone(self),
            key.to_string(),
            id,
            readable,
            value_count,
        )))
    }

    /// Finish an edit and schedule cleanup if it pushed the cache over a bound
    pub(crate) fn complete_edit(
        &self,
        key: &str,
        id: EditorId,
        written: Option<&[bool]>,
        success: bool,
    ) -> Result<()> {
        let mut state = self.lock_open()?;
        let result = state.complete_edit(key, id, written, success);
        if state.needs_cleanup() {
            self.schedule_cleanup();
        }
        result
    }

    /// Abort a faulted edit and remove its entry under one lock hold, so no
    /// other editor can claim the key in between
    pub(crate) fn abort_and_remove(
        &self,
        key: &str,
        id: EditorId,
        written: Option<&[bool]>,
    ) -> Result<()> {
        let mut state = self.lock_open()?;
        state.complete_edit(key, id, written, false)?;
        state.remove_entry(key)?;
        if state.needs_cleanup() {
            self.schedule_cleanup();
        }
        Ok(())
    }

    /// Remove an entry
    pub(crate) fn remove(&self, key: &str) -> Result<bool> {
        let mut state = self.lock_open()?;
        validate_key(key)?;
        let removed = state.remove_entry(key)?;
        if removed && state.journal_rebuild_required() {
            self.schedule_cleanup();
        }
        Ok(removed)
    }
}

impl Cleanup for Inner {
    fn cleanup(&self) {
        let mut state = self.state.lock();
        if state.is_closed() {
            return;
        }
        let result = state.trim(&self.metrics).and_then(|()| {
            if state.journal_rebuild_required() {
                state.rebuild_journal(&self.metrics)
            } else {
                Ok(())
            }
        });
        if let Err(e) = result {
            tracing::error!(parent: &self.span, "background cleanup failed: {}", e);
        }
    }
}

// =============================================================================
// Public facade
// =============================================================================

/// Journaled, bounded LRU cache on the local filesystem.
///
/// Cheap to clone; all clones share one cache instance. A directory must be
/// used by at most one open cache at a time.
#[derive(Clone)]
pub struct DiskLruCache {
    inner: Arc<Inner>,
}

impl DiskLruCache {
    /// Open the cache in `directory`, creating it if needed.
    ///
    /// A corrupt journal, or one written with another `app_version` or
    /// `value_count`, causes the directory to be wiped and the cache to
    /// start empty.
    pub fn open(
        directory: impl AsRef<Path>,
        app_version: u32,
        value_count: usize,
        max_size: u64,
        max_file_count: u64,
    ) -> Result<Self> {
        Self::with_config(CacheConfig {
            directory: directory.as_ref().to_path_buf(),
            app_version,
            value_count,
            max_size,
            max_file_count,
        })
    }

    /// Open the cache described by `config`
    #[instrument(skip_all, fields(dir = %config.directory.display()))]
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let metrics = CacheMetrics::new();
        let layout = CacheLayout::new(config.directory.clone());

        // A backup without a live journal means a rebuild swap was interrupted.
        let backup = layout.journal_backup();
        if backup.exists() {
            let journal = layout.journal();
            if journal.exists() {
                delete_if_exists(&backup)?;
            } else {
                fs::rename(&backup, &journal)?;
            }
        }

        let mut recovered = None;
        if layout.journal().exists() {
            match Self::recover(&config, &metrics) {
                Ok(state) => recovered = Some(state),
                Err(e) if e.is_corruption() => {
                    warn!("journal is corrupt, removing cache contents: {}", e);
                    delete_dir_if_exists(layout.directory())?;
                }
                Err(e) => return Err(e),
            }
        }

        let state = match recovered {
            Some(state) => state,
            None => {
                fs::create_dir_all(layout.directory())?;
                let mut state = State::new(&config);
                state.rebuild_journal(&metrics)?;
                state
            }
        };
        info!(
            entries = state.table.len(),
            size = state.size,
            file_count = state.file_count,
            "opened disk cache"
        );

        let span = info_span!("disk_lru_cache", dir = %config.directory.display());
        let inner = Arc::new_cyclic(|weak| Inner {
            directory: config.directory.clone(),
            state: Mutex::new(state),
            metrics,
            worker: CleanupWorker::spawn(weak.clone(), span.clone()),
            next_editor_id: AtomicU64::new(1),
            span,
        });
        Ok(Self { inner })
    }

    fn recover(config: &CacheConfig, metrics: &CacheMetrics) -> Result<State> {
        let mut state = State::new(config);
        let unterminated = state.read_journal()?;
        state.process_journal()?;
        if unterminated {
            debug!("journal ends mid-record, rebuilding");
            state.rebuild_journal(metrics)?;
        } else {
            state.journal = Some(JournalWriter::open_append(&state.layout.journal())?);
        }
        Ok(state)
    }

    /// Snapshot of `key`, or `None` if it is absent or not yet published.
    ///
    /// All value files are opened before returning, so the snapshot never
    /// mixes values from different commits.
    pub fn get(&self, key: &str) -> Result<Option<Snapshot>> {
        let mut guard = self.inner.lock_open()?;
        validate_key(key)?;
        let state = &mut *guard;

        let (sequence_number, lengths) = match state.table.get(key) {
            Some(entry) if entry.is_readable() => {
                (entry.sequence_number(), entry.lengths().to_vec())
            }
            _ => {
                self.inner.metrics.record_miss();
                return Ok(None);
            }
        };

        let mut readers = Vec::with_capacity(lengths.len());
        for i in 0..state.value_count() {
            match File::open(state.layout.clean_file(key, i)) {
                Ok(file) => readers.push(file),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    // Deleted behind our back; readers opened so far drop here.
                    self.inner.metrics.record_miss();
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            }
        }

        state.redundant_op_count += 1;
        state.journal()?.append(&Record::Read(key.to_string()))?;
        state.table.touch(key);
        if state.journal_rebuild_required() {
            self.inner.schedule_cleanup();
        }
        drop(guard);

        self.inner.metrics.record_hit();
        Ok(Some(Snapshot::new(
            Arc::clone(&self.inner),
            key.to_string(),
            sequence_number,
            readers,
            lengths,
        )))
    }

    /// Editor for `key`, or `None` if another edit is in progress
    pub fn edit(&self, key: &str) -> Result<Option<Editor>> {
        self.inner.edit(key, None)
    }

    /// Editor for `key` only if its last commit has `sequence_number`
    pub fn edit_if_unchanged(&self, key: &str, sequence_number: u64) -> Result<Option<Editor>> {
        self.inner.edit(key, Some(sequence_number))
    }

    /// Drop `key` if it exists and is not being edited
    pub fn remove(&self, key: &str) -> Result<bool> {
        self.inner.remove(key)
    }

    /// Trim to the bounds now and push buffered journal records to disk
    pub fn flush(&self) -> Result<()> {
        let mut state = self.inner.lock_open()?;
        state.trim(&self.inner.metrics)?;
        state.journal()?.flush()
    }

    /// Abort in-flight edits, trim, and close the journal. Idempotent.
    pub fn close(&self) -> Result<()> {
        let result = {
            let mut guard = self.inner.state.lock();
            let state = &mut *guard;
            if state.is_closed() {
                return Ok(());
            }
            for (key, id) in state.table.keys_being_edited() {
                if let Err(e) = state.complete_edit(&key, id, None, false) {
                    warn!(parent: &self.inner.span, key = %key, "failed to abort edit on close: {}", e);
                }
                self.inner.metrics.record_abort();
            }
            let trimmed = state.trim(&self.inner.metrics);
            let flushed = state.journal().and_then(|journal| journal.flush());
            state.journal = None;
            trimmed.and(flushed)
        };
        self.inner.worker.shutdown();
        debug!(parent: &self.inner.span, "closed disk cache");
        result
    }

    /// Close the cache and delete its directory with all contents
    pub fn delete(&self) -> Result<()> {
        self.close()?;
        delete_dir_if_exists(&self.inner.directory)?;
        Ok(())
    }

    /// Cache directory
    pub fn directory(&self) -> &Path {
        &self.inner.directory
    }

    /// Byte budget
    pub fn max_size(&self) -> u64 {
        self.inner.state.lock().max_size
    }

    /// Change the byte budget; shrinking it schedules an eviction pass
    pub fn set_max_size(&self, max_size: u64) -> Result<()> {
        if max_size == 0 {
            return Err(Error::InvalidArgument("maxSize <= 0".to_string()));
        }
        let mut state = self.inner.state.lock();
        state.max_size = max_size;
        if state.needs_cleanup() {
            self.inner.schedule_cleanup();
        }
        Ok(())
    }

    /// File budget
    pub fn max_file_count(&self) -> u64 {
        self.inner.state.lock().max_file_count
    }

    /// Bytes of clean values; may exceed `max_size` until cleanup runs
    pub fn size(&self) -> u64 {
        self.inner.state.lock().size
    }

    /// Number of clean value files
    pub fn file_count(&self) -> u64 {
        self.inner.state.lock().file_count
    }

    /// Whether `close` has run
    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().is_closed()
    }

    /// Counters and current bounds
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        self.inner.state.lock().fill_stats(&mut stats);
        self.inner.metrics.fill(&mut stats);
        stats
    }
}

impl std::fmt::Debug for DiskLruCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskLruCache")
            .field("directory", &self.inner.directory)
            .field("closed", &self.is_closed())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
