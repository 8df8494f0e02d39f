//! Store statistics.
//!
//! Two views are offered. [`DatabaseStats`] counts persistence activity
//! since the handle was opened; [`StoreCounts`] describes what the store
//! currently holds.

use std::sync::atomic::{AtomicU64, Ordering};

/// Persistence counters for one open store.
///
/// All counters are atomic and can be read while operations are in progress.
#[derive(Debug, Default)]
pub struct DatabaseStats {
    /// Successful persists.
    persists: AtomicU64,
    /// Persists that failed after the in-memory change was applied.
    persist_failures: AtomicU64,
    /// Bytes handed to the backend by successful persists.
    bytes_written: AtomicU64,
    /// Mutations refused with a validation error.
    rejected: AtomicU64,
}

impl DatabaseStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_persist(&self, bytes: u64) {
        self.persists.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_persist_failure(&self) {
        self.persist_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of successful persists.
    pub fn persists(&self) -> u64 {
        self.persists.load(Ordering::Relaxed)
    }

    /// Returns the number of failed persists.
    ///
    /// Each one marks a moment where memory was ahead of the file.
    pub fn persist_failures(&self) -> u64 {
        self.persist_failures.load(Ordering::Relaxed)
    }

    /// Returns the total bytes written.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Returns the number of rejected mutations.
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            persists: self.persists(),
            persist_failures: self.persist_failures(),
            bytes_written: self.bytes_written(),
            rejected: self.rejected(),
        }
    }
}

/// A point-in-time copy of [`DatabaseStats`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Successful persists.
    pub persists: u64,
    /// Failed persists.
    pub persist_failures: u64,
    /// Total bytes written.
    pub bytes_written: u64,
    /// Rejected mutations.
    pub rejected: u64,
}

/// Entity counts at one moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreCounts {
    /// Number of chirps.
    pub chirps: usize,
    /// Number of users.
    pub users: usize,
    /// Users with the premium flag set.
    pub premium_users: usize,
    /// Refresh tokens still valid.
    pub valid_tokens: usize,
    /// Refresh tokens that were revoked.
    pub revoked_tokens: usize,
}
