//! Cache directory layout
//!
//! ```text
//! journal           live operation log
//! journal.tmp       rebuild target
//! journal.bkp       previous journal, kept until the rebuild swap completes
//! <key>.<N>         clean value N for key
//! <key>.<N>.tmp     dirty value N for key
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::journal::{JOURNAL_FILE, JOURNAL_FILE_BACKUP, JOURNAL_FILE_TEMP};

/// Paths inside one cache directory
#[derive(Debug, Clone)]
pub struct CacheLayout {
    directory: PathBuf,
}

impl CacheLayout {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    #[inline]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn journal(&self) -> PathBuf {
        self.directory.join(JOURNAL_FILE)
    }

    pub fn journal_temp(&self) -> PathBuf {
        self.directory.join(JOURNAL_FILE_TEMP)
    }

    pub fn journal_backup(&self) -> PathBuf {
        self.directory.join(JOURNAL_FILE_BACKUP)
    }

    /// Published file for slot `index`
    pub fn clean_file(&self, key: &str, index: usize) -> PathBuf {
        self.directory.join(format!("{}.{}", key, index))
    }

    /// In-progress file for slot `index`
    pub fn dirty_file(&self, key: &str, index: usize) -> PathBuf {
        self.directory.join(format!("{}.{}.tmp", key, index))
    }
}

/// Delete a file, treating "already gone" as success
pub(crate) fn delete_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Recursively delete a directory, treating "already gone" as success
pub(crate) fn delete_dir_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        let layout = CacheLayout::new("/cache");
        assert_eq!(layout.journal(), PathBuf::from("/cache/journal"));
        assert_eq!(layout.journal_temp(), PathBuf::from("/cache/journal.tmp"));
        assert_eq!(layout.journal_backup(), PathBuf::from("/cache/journal.bkp"));
        assert_eq!(layout.clean_file("photo", 0), PathBuf::from("/cache/photo.0"));
        assert_eq!(layout.dirty_file("photo", 1), PathBuf::from("/cache/photo.1.tmp"));
    }

    #[test]
    fn test_delete_if_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f");
        delete_if_exists(&path).unwrap();
        fs::write(&path, b"x").unwrap();
        delete_if_exists(&path).unwrap();
        assert!(!path.exists());

        let sub = dir.path().join("sub");
        fs::create_dir_all(sub.join("nested")).unwrap();
        delete_dir_if_exists(&sub).unwrap();
        delete_dir_if_exists(&sub).unwrap();
        assert!(!sub.exists());
    }
}
