//! Storage backend trait definition.

use crate::error::StorageResult;

/// A whole-image storage backend.
///
/// Backends hold exactly one byte image. The document store serializes its
/// entire state on every mutation and hands the bytes to [`replace`];
/// on startup it reads them back with [`read_all`].
///
/// # Invariants
///
/// - `read_all` returns exactly the bytes of the last successful `replace`
/// - A failed `replace` leaves the previous image intact
/// - Backends must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
///
/// [`replace`]: StorageBackend::replace
/// [`read_all`]: StorageBackend::read_all
pub trait StorageBackend: Send + Sync {
    /// Returns true if an image has ever been written.
    ///
    /// # Errors
    ///
    /// Returns an error if existence cannot be determined.
    fn exists(&self) -> StorageResult<bool>;

    /// Reads the complete stored image.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`](crate::StorageError::NotFound) if
    /// no image exists, or an I/O error.
    fn read_all(&self) -> StorageResult<Vec<u8>>;

    /// Replaces the stored image with `data`.
    ///
    /// After this returns successfully the new image survives process
    /// termination (subject to the backend's sync policy).
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails. The previous image is kept.
    fn replace(&self, data: &[u8]) -> StorageResult<()>;

    /// Human-readable location, used in log lines and error messages.
    fn location(&self) -> String;
}
