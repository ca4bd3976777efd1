//! # Snapshot File Lock
//!
//! Uses `fs2` for cross-platform advisory locking (flock on Unix, LockFile on
//! Windows) of a sibling `<snapshot>.lock` file. Serializes load, mutate and
//! save sequences across threads and processes sharing one snapshot.

use crate::domain::RegistryError;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exclusive lock on a snapshot file.
///
/// Released on drop (RAII).
#[derive(Debug)]
pub struct StoreLock {
    /// Open handle; the lock lives as long as it does.
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Block until the exclusive lock on `lock_path` is held.
    ///
    /// Creates the lock file and its parent directory if needed.
    pub fn acquire(lock_path: &Path) -> Result<Self, RegistryError> {
        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                RegistryError::Storage(format!("create {}: {e}", parent.display()))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(lock_path)
            .map_err(|e| RegistryError::Storage(format!("open {}: {e}", lock_path.display())))?;

        file.lock_exclusive()
            .map_err(|e| RegistryError::Storage(format!("lock {}: {e}", lock_path.display())))?;
        debug!(path = %lock_path.display(), "Snapshot lock acquired");

        Ok(Self {
            file,
            path: lock_path.to_path_buf(),
        })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        // The lock file is kept; only the lock itself is released
        let _ = FileExt::unlock(&self.file);
        debug!(path = %self.path.display(), "Snapshot lock released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_acquire_creates_lock_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("registry.json.lock");

        let lock = StoreLock::acquire(&path).unwrap();
        assert!(path.exists());
        assert_eq!(lock.path(), path.as_path());
    }

    #[test]
    fn test_reacquire_after_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json.lock");

        drop(StoreLock::acquire(&path).unwrap());
        let again = StoreLock::acquire(&path);
        assert!(again.is_ok());
    }

    #[test]
    fn test_lock_excludes_other_holders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json.lock");
        let inside = Arc::new(AtomicUsize::new(0));

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let path = path.clone();
                let inside = Arc::clone(&inside);
                scope.spawn(move || {
                    for _ in 0..5 {
                        let _lock = StoreLock::acquire(&path).unwrap();
                        assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                        std::thread::sleep(Duration::from_millis(2));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                });
            }
        });
    }
}
