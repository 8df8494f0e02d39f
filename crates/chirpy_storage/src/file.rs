//! File-based storage backend for persistent storage.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix of the sibling file an image is staged in before the rename.
const TEMP_SUFFIX: &str = ".tmp";

/// A file-based storage backend.
///
/// The image lives in a single file. Every [`replace`](StorageBackend::replace)
/// writes the new image to a sibling temporary file and renames it over the
/// target, so a crash mid-write leaves either the old or the new image on
/// disk, never a truncated one.
///
/// # Durability
///
/// With `sync` enabled (the default), the temporary file is `fsync`ed before
/// the rename and the parent directory is `fsync`ed after it.
///
/// # Thread Safety
///
/// Concurrent `replace` calls are serialized internally; they share one
/// temporary path.
///
/// # Example
///
/// ```no_run
/// use chirpy_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::open_with_create_dirs(Path::new("database/db.json")).unwrap();
/// backend.replace(b"{\"chirps\":{},\"users\":{},\"tokens\":{}}").unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    sync: bool,
    write_lock: Mutex<()>,
}

impl FileBackend {
    /// Creates a backend for the file at `path`.
    ///
    /// The file is not touched until the first read or write.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            sync: true,
            write_lock: Mutex::new(()),
        }
    }

    /// Creates a backend, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created.
    pub fn open_with_create_dirs(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self::new(path))
    }

    /// Sets whether every replace is synced to disk.
    #[must_use]
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(TEMP_SUFFIX);
        self.path.with_file_name(name)
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn write_temp(&self, temp_path: &Path, data: &[u8]) -> io::Result<()> {
        let mut file = File::create(temp_path)?;
        file.write_all(data)?;
        if self.sync {
            file.sync_all()?;
        }
        Ok(())
    }

    /// Syncs the parent directory so the rename itself is durable.
    ///
    /// On Windows NTFS the journal covers metadata updates and directories
    /// cannot be opened for syncing, so this is a no-op there.
    #[cfg(unix)]
    fn sync_directory(&self) -> io::Result<()> {
        let dir = File::open(self.parent_dir())?;
        dir.sync_all()
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> io::Result<()> {
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn exists(&self) -> StorageResult<bool> {
        Ok(self.path.try_exists()?)
    }

    fn read_all(&self) -> StorageResult<Vec<u8>> {
        match fs::read(&self.path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::not_found(self.location()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn replace(&self, data: &[u8]) -> StorageResult<()> {
        let _guard = self.write_lock.lock();
        let temp_path = self.temp_path();

        if let Err(e) = self.write_temp(&temp_path, data) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        if self.sync {
            self.sync_directory()?;
        }

        debug!(path = %self.path.display(), bytes = data.len(), "image replaced");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_missing_until_first_replace() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");

        let backend = FileBackend::new(&path);
        assert!(!backend.exists().unwrap());
        assert!(!path.exists());

        let err = backend.read_all().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn file_replace_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");

        let backend = FileBackend::new(&path);
        backend.replace(b"hello").unwrap();

        assert!(backend.exists().unwrap());
        assert_eq!(backend.read_all().unwrap(), b"hello");
    }

    #[test]
    fn file_replace_overwrites_whole_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");

        let backend = FileBackend::new(&path);
        backend.replace(b"a much longer first image").unwrap();
        backend.replace(b"short").unwrap();

        assert_eq!(backend.read_all().unwrap(), b"short");
    }

    #[test]
    fn file_leaves_no_temp_file_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");

        let backend = FileBackend::new(&path);
        backend.replace(b"data").unwrap();

        assert!(!backend.temp_path().exists());
        assert_eq!(
            backend.temp_path().file_name().unwrap().to_string_lossy(),
            "db.json.tmp"
        );
    }

    #[test]
    fn file_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");

        {
            let backend = FileBackend::new(&path);
            backend.replace(b"persistent data").unwrap();
        }

        {
            let backend = FileBackend::new(&path);
            assert_eq!(backend.read_all().unwrap(), b"persistent data");
        }
    }

    #[test]
    fn file_create_with_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("path").join("db.json");

        let backend = FileBackend::open_with_create_dirs(&path).unwrap();
        backend.replace(b"{}").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn file_replace_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("db.json");

        let backend = FileBackend::new(&path).with_sync(false);
        assert!(backend.replace(b"data").is_err());
        assert!(!backend.exists().unwrap());
    }

    #[test]
    fn file_path_and_location() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");

        let backend = FileBackend::new(&path);
        assert_eq!(backend.path(), path);
        assert_eq!(backend.location(), path.display().to_string());
    }
}
