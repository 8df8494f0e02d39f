//! # Chirpy Testkit
//!
//! Test utilities for the Chirpy store.
//!
//! This crate provides:
//! - Temporary databases that clean up after themselves
//! - A fast, deterministic password hasher
//! - A storage backend whose writes can be made to fail on demand
//! - Property-based generators for store operations
//!
//! ## Usage
//!
//! ```rust
//! use chirpy_testkit::prelude::*;
//!
//! let db = TestDatabase::file();
//! db.create_chirp("hello", 1).unwrap();
//!
//! let db = db.reopen();
//! assert_eq!(db.get_chirp(1).unwrap().body, "hello");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod faults;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::faults::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use faults::*;
pub use fixtures::*;
pub use generators::*;
