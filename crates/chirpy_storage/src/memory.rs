//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;

/// An in-memory storage backend.
///
/// This backend keeps the image in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// # Example
///
/// ```rust
/// use chirpy_storage::{StorageBackend, InMemoryBackend};
///
/// let backend = InMemoryBackend::with_data(b"seed".to_vec());
/// assert_eq!(backend.read_all().unwrap(), b"seed");
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: RwLock<Option<Vec<u8>>>,
}

impl InMemoryBackend {
    /// Creates a new backend holding no image.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend holding a pre-existing image.
    ///
    /// Useful for testing load and corruption scenarios.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(Some(data)),
        }
    }

    /// Returns a copy of the current image, if any.
    #[must_use]
    pub fn data(&self) -> Option<Vec<u8>> {
        self.data.read().clone()
    }
}

impl StorageBackend for InMemoryBackend {
    fn exists(&self) -> StorageResult<bool> {
        Ok(self.data.read().is_some())
    }

    fn read_all(&self) -> StorageResult<Vec<u8>> {
        self.data
            .read()
            .clone()
            .ok_or_else(|| StorageError::not_found(self.location()))
    }

    fn replace(&self, data: &[u8]) -> StorageResult<()> {
        *self.data.write() = Some(data.to_vec());
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let backend = InMemoryBackend::new();
        assert!(!backend.exists().unwrap());
        assert!(backend.data().is_none());
        assert!(backend.read_all().unwrap_err().is_not_found());
    }

    #[test]
    fn memory_replace_then_read() {
        let backend = InMemoryBackend::new();
        backend.replace(b"first").unwrap();
        backend.replace(b"second").unwrap();

        assert!(backend.exists().unwrap());
        assert_eq!(backend.read_all().unwrap(), b"second");
    }

    #[test]
    fn memory_with_data() {
        let backend = InMemoryBackend::with_data(vec![1, 2, 3]);
        assert_eq!(backend.data(), Some(vec![1, 2, 3]));
    }
}
