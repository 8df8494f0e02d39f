//! Fault injection.
//!
//! [`FlakyBackend`] is an in-memory backend whose writes can be switched
//! to fail. It is used to observe what the store does when a persist fails
//! after the in-memory change was already applied.

use chirpy_codec::{Decode, StoreImage};
use chirpy_storage::{InMemoryBackend, StorageBackend, StorageError, StorageResult};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Shared {
    inner: InMemoryBackend,
    fail_writes: AtomicBool,
    failed_writes: AtomicU64,
}

/// In-memory backend with switchable write failures.
#[derive(Debug)]
pub struct FlakyBackend {
    shared: Arc<Shared>,
}

/// Test-side handle controlling a [`FlakyBackend`].
#[derive(Debug, Clone)]
pub struct FaultSwitch {
    shared: Arc<Shared>,
}

impl FlakyBackend {
    /// Creates an empty backend and its control handle.
    pub fn new() -> (Self, FaultSwitch) {
        let shared = Arc::new(Shared::default());
        (
            Self {
                shared: Arc::clone(&shared),
            },
            FaultSwitch { shared },
        )
    }
}

impl StorageBackend for FlakyBackend {
    fn exists(&self) -> StorageResult<bool> {
        self.shared.inner.exists()
    }

    fn read_all(&self) -> StorageResult<Vec<u8>> {
        self.shared.inner.read_all()
    }

    fn replace(&self, data: &[u8]) -> StorageResult<()> {
        if self.shared.fail_writes.load(Ordering::SeqCst) {
            self.shared.failed_writes.fetch_add(1, Ordering::SeqCst);
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::Other,
                "injected write failure",
            )));
        }
        self.shared.inner.replace(data)
    }

    fn location(&self) -> String {
        "<flaky>".to_string()
    }
}

impl FaultSwitch {
    /// Makes every following write fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.shared.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of writes that were refused.
    pub fn failed_writes(&self) -> u64 {
        self.shared.failed_writes.load(Ordering::SeqCst)
    }

    /// Decodes what the backend currently holds.
    pub fn stored_image(&self) -> Option<StoreImage> {
        let bytes = self.shared.inner.data()?;
        Some(StoreImage::decode(&bytes).expect("Stored image should decode"))
    }
}
