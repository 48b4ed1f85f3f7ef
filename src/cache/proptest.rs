//! Property-Based Tests for the Disk Cache
//!
//! # Test Properties
//!
//! 1. **Crash Recovery**: a journal cut at any byte reopens without error and
//!    only serves values that were committed
//! 2. **Replay Fidelity**: reopening reproduces exactly the committed state
//! 3. **Bounds**: after `flush()` size and file count respect the limits and
//!    match the files on disk
//! 4. **Rebuild Fidelity**: replaying a rebuilt journal reproduces the entry
//!    table, and rebuilding again writes the same bytes

#![cfg(test)]

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use proptest::prelude::*;

use super::disk_lru::State;
use super::journal::Record;
use super::table::EntryTable;
use super::{CacheConfig, CacheMetrics, DiskLruCache};

// =============================================================================
// Property Strategies
// =============================================================================

#[derive(Debug, Clone)]
enum Op {
    Put(String, Vec<u8>),
    Remove(String),
    Get(String),
}

/// Small key space so operations collide
fn key_strategy() -> impl Strategy<Value = String> {
    (0u8..6).prop_map(|i| format!("k{}", i))
}

fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (key_strategy(), value_strategy()).prop_map(|(k, v)| Op::Put(k, v)),
        1 => key_strategy().prop_map(Op::Remove),
        1 => key_strategy().prop_map(Op::Get),
    ]
}

/// Journal records over the same small key space, with two-slot lengths
fn record_strategy() -> impl Strategy<Value = Record> {
    prop_oneof![
        3 => (key_strategy(), prop::collection::vec(0u64..1 << 20, 2))
            .prop_map(|(key, lengths)| Record::Clean { key, lengths }),
        2 => key_strategy().prop_map(Record::Dirty),
        1 => key_strategy().prop_map(Record::Remove),
        2 => key_strategy().prop_map(Record::Read),
    ]
}

/// What a rebuild must preserve, in recency order. An entry being edited
/// is journaled as `DIRTY` only, so its lengths are not part of the view.
fn table_view(table: &EntryTable) -> Vec<(String, bool, Option<Vec<u64>>)> {
    table
        .iter()
        .map(|entry| {
            let edited = entry.is_being_edited();
            let lengths = (!edited).then(|| entry.lengths().to_vec());
            (entry.key().to_string(), edited, lengths)
        })
        .collect()
}

fn put(cache: &DiskLruCache, key: &str, value: &[u8]) -> crate::Result<()> {
    if let Some(mut editor) = cache.edit(key)? {
        editor.set(0, value)?;
        editor.commit()?;
    }
    Ok(())
}

fn read(cache: &DiskLruCache, key: &str) -> crate::Result<Option<Vec<u8>>> {
    match cache.get(key)? {
        Some(mut snapshot) => Ok(Some(snapshot.bytes(0)?.to_vec())),
        None => Ok(None),
    }
}

fn clean_bytes_on_disk(dir: &Path) -> u64 {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            !name.starts_with("journal") && !name.ends_with(".tmp")
        })
        .map(|e| e.metadata().unwrap().len())
        .sum()
}

// =============================================================================
// Recovery Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: cutting the journal anywhere never yields a torn or
    /// uncommitted value.
    #[test]
    fn prop_truncated_journal_recovers(
        values in prop::collection::vec(value_strategy(), 1..8),
        cut in any::<prop::sample::Index>(),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskLruCache::open(dir.path(), 1, 1, 1 << 20, 1000)?;
        for (i, value) in values.iter().enumerate() {
            put(&cache, &format!("k{}", i), value)?;
        }
        cache.close()?;

        let journal = dir.path().join("journal");
        let bytes = fs::read(&journal).unwrap();
        let keep = cut.index(bytes.len() + 1);
        fs::write(&journal, &bytes[..keep]).unwrap();

        let cache = DiskLruCache::open(dir.path(), 1, 1, 1 << 20, 1000)?;
        let mut served = 0u64;
        for (i, value) in values.iter().enumerate() {
            if let Some(read_back) = read(&cache, &format!("k{}", i))? {
                prop_assert_eq!(&read_back, value);
                served += value.len() as u64;
            }
        }
        // Files committed after the cut are orphaned, so only the counter
        // is compared here.
        prop_assert_eq!(cache.size(), served);
        cache.close()?;
    }

    /// Property: a reopened cache serves exactly what a map model holds.
    #[test]
    fn prop_reopen_matches_model(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskLruCache::open(dir.path(), 1, 1, 1 << 20, 1000)?;
        let mut model: BTreeMap<String, Vec<u8>> = BTreeMap::new();

        for op in &ops {
            match op {
                Op::Put(key, value) => {
                    put(&cache, key, value)?;
                    model.insert(key.clone(), value.clone());
                }
                Op::Remove(key) => {
                    let removed = cache.remove(key)?;
                    prop_assert_eq!(removed, model.remove(key).is_some());
                }
                Op::Get(key) => {
                    prop_assert_eq!(read(&cache, key)?, model.get(key).cloned());
                }
            }
        }
        cache.close()?;

        let cache = DiskLruCache::open(dir.path(), 1, 1, 1 << 20, 1000)?;
        for i in 0..6 {
            let key = format!("k{}", i);
            prop_assert_eq!(read(&cache, &key)?, model.get(&key).cloned());
        }
        let expected: u64 = model.values().map(|v| v.len() as u64).sum();
        prop_assert_eq!(cache.size(), expected);
        prop_assert_eq!(cache.file_count(), model.len() as u64);
        cache.close()?;
    }
}

// =============================================================================
// Bound Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: flush() enforces both bounds and the counters agree with disk.
    #[test]
    fn prop_flush_enforces_bounds(
        ops in prop::collection::vec(op_strategy(), 1..40),
        max_size in 16u64..256,
        max_file_count in 1u64..6,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskLruCache::open(dir.path(), 1, 1, max_size, max_file_count)?;
        for op in &ops {
            match op {
                Op::Put(key, value) => put(&cache, key, value)?,
                Op::Remove(key) => {
                    cache.remove(key)?;
                }
                Op::Get(key) => {
                    read(&cache, key)?;
                }
            }
        }
        cache.flush()?;

        prop_assert!(cache.size() <= max_size);
        prop_assert!(cache.file_count() <= max_file_count);
        prop_assert_eq!(clean_bytes_on_disk(dir.path()), cache.size());
        cache.close()?;
    }
}

// =============================================================================
// Rebuild Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: rebuild then replay preserves keys, order, lengths and edit
    /// state, and a second rebuild is byte-identical.
    #[test]
    fn prop_rebuild_replay_is_stable(records in prop::collection::vec(record_strategy(), 0..40)) {
        let dir = tempfile::tempdir().unwrap();
        let config = CacheConfig {
            directory: dir.path().to_path_buf(),
            app_version: 7,
            value_count: 2,
            ..CacheConfig::default()
        };
        let metrics = CacheMetrics::new();

        let mut original = State::new(&config);
        for record in records {
            original.table.replay(record);
        }
        original.rebuild_journal(&metrics)?;
        let journal = dir.path().join("journal");
        let first = fs::read(&journal).unwrap();

        let mut replayed = State::new(&config);
        prop_assert!(!replayed.read_journal()?);
        prop_assert_eq!(table_view(&replayed.table), table_view(&original.table));
        for entry in replayed.table.iter() {
            prop_assert_eq!(entry.is_readable(), !entry.is_being_edited());
        }

        replayed.rebuild_journal(&metrics)?;
        prop_assert_eq!(fs::read(&journal).unwrap(), first);
    }
}
