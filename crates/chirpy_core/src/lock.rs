//! Single-process advisory lock.
//!
//! A store file `database.json` is guarded by a sibling `database.json.lock`.
//! The lock is held for as long as the [`StoreLock`] lives.

use crate::error::{CoreError, CoreResult};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Exclusive lock on a store file.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
    _file: File,
}

impl StoreLock {
    /// Returns the lock path used for `store_path`.
    #[must_use]
    pub fn lock_path_for(store_path: &Path) -> PathBuf {
        let mut name = store_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        store_path.with_file_name(name)
    }

    /// Takes the lock for `store_path` without blocking.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseLocked` if another handle holds it, or an I/O error
    /// if the lock file cannot be opened.
    pub fn acquire(store_path: &Path) -> CoreResult<Self> {
        let path = Self::lock_path_for(store_path);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        if file.try_lock_exclusive().is_err() {
            return Err(CoreError::DatabaseLocked {
                path: path.display().to_string(),
            });
        }

        Ok(Self { path, _file: file })
    }

    /// Returns the path of the lock file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn lock_path_is_sibling() {
        let path = StoreLock::lock_path_for(Path::new("/data/database.json"));
        assert_eq!(path, Path::new("/data/database.json.lock"));
    }

    #[test]
    fn lock_prevents_second_acquire() {
        let temp = tempdir().unwrap();
        let store = temp.path().join("db.json");

        let _first = StoreLock::acquire(&store).unwrap();
        let second = StoreLock::acquire(&store);
        assert!(matches!(second, Err(CoreError::DatabaseLocked { .. })));
    }

    #[test]
    fn lock_released_on_drop() {
        let temp = tempdir().unwrap();
        let store = temp.path().join("db.json");

        {
            let lock = StoreLock::acquire(&store).unwrap();
            assert!(lock.path().exists());
        }

        let _again = StoreLock::acquire(&store).unwrap();
    }
}
