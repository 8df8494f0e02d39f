//! # Chirpy Storage
//!
//! Storage backend trait and implementations for the Chirpy document store.
//!
//! Backends are **opaque whole-image byte stores**: the store hands them a
//! complete serialized image on every write and reads the complete image
//! back on open. They never interpret the bytes.
//!
//! ## Design Principles
//!
//! - One image per backend; every write replaces the previous image
//! - A replace is all-or-nothing: readers see the old image or the new one
//! - Must be `Send + Sync` for concurrent access
//! - The store owns all format interpretation
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral stores
//! - [`FileBackend`] - For persistent storage using write-then-rename
//!
//! ## Example
//!
//! ```rust
//! use chirpy_storage::{StorageBackend, InMemoryBackend};
//!
//! let backend = InMemoryBackend::new();
//! assert!(!backend.exists().unwrap());
//! backend.replace(b"{}").unwrap();
//! assert_eq!(backend.read_all().unwrap(), b"{}");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
