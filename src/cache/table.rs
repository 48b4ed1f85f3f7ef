//! Entry Table
//!
//! Access-ordered map of key to [`Entry`]. The front is the least recently
//! used entry and is the first eviction candidate. The table has no lock of
//! its own; it lives inside the cache state mutex.

use hashlink::linked_hash_map;
use hashlink::LinkedHashMap;

use super::entry::{EditorId, Entry};
use super::journal::Record;

/// Access-ordered entry map
#[derive(Debug, Default)]
pub struct EntryTable {
    entries: LinkedHashMap<String, Entry>,
    value_count: usize,
}

impl EntryTable {
    /// Create an empty table for entries with `value_count` slots
    pub fn new(value_count: usize) -> Self {
        Self {
            entries: LinkedHashMap::new(),
            value_count,
        }
    }

    /// Look up an entry without touching recency
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Mutable lookup without touching recency
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.entries.get_mut(key)
    }

    /// Return the entry for `key`, inserting a fresh one if absent.
    /// Either way the entry becomes the most recently used.
    pub fn get_or_insert(&mut self, key: &str) -> &mut Entry {
        let value_count = self.value_count;
        match self.entries.entry(key.to_string()) {
            linked_hash_map::Entry::Occupied(mut occupied) => {
                occupied.to_back();
                occupied.into_mut()
            }
            linked_hash_map::Entry::Vacant(vacant) => vacant.insert(Entry::new(key, value_count)),
        }
    }

    /// Move an entry to the most recently used position
    pub fn touch(&mut self, key: &str) -> bool {
        self.entries.to_back(key).is_some()
    }

    /// Remove an entry
    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        self.entries.remove(key)
    }

    /// Oldest entry that is not being edited
    pub fn eviction_candidate(&self) -> Option<&str> {
        self.entries
            .values()
            .find(|entry| !entry.is_being_edited())
            .map(Entry::key)
    }

    /// Iterate from least to most recently used
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    /// Keys of entries with an edit in flight
    pub fn keys_being_edited(&self) -> Vec<(String, EditorId)> {
        self.entries
            .values()
            .filter_map(|entry| {
                entry
                    .current_editor
                    .map(|id| (entry.key().to_string(), id))
            })
            .collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Apply one replayed journal record
    pub fn replay(&mut self, record: Record) {
        match record {
            Record::Remove(key) => {
                self.entries.remove(&key);
            }
            Record::Dirty(key) => {
                self.get_or_insert(&key).current_editor = Some(EditorId::RECOVERED);
            }
            Record::Clean { key, lengths } => {
                let entry = self.get_or_insert(&key);
                entry.readable = true;
                entry.current_editor = None;
                entry.lengths = lengths;
            }
            Record::Read(key) => {
                self.touch(&key);
            }
        }
    }

    /// Minimal record set equivalent to the current table
    pub fn snapshot_records(&self) -> Vec<Record> {
        self.entries
            .values()
            .map(|entry| {
                if entry.is_being_edited() {
                    Record::Dirty(entry.key().to_string())
                } else {
                    Record::Clean {
                        key: entry.key().to_string(),
                        lengths: entry.lengths.clone(),
                    }
                }
            })
            .collect()
    }

    /// Drop entries left mid-edit by a crash; returns them
    pub fn drain_incomplete(&mut self) -> Vec<Entry> {
        let keys: Vec<String> = self
            .entries
            .values()
            .filter(|entry| entry.is_being_edited() || !entry.is_readable())
            .map(|entry| entry.key().to_string())
            .collect();
        keys.iter()
            .filter_map(|key| self.entries.remove(key.as_str()))
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
