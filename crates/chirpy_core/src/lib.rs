//! # Chirpy Core
//!
//! The Chirpy document store: chirps, users and revocable refresh tokens
//! held in memory behind one reader/writer lock and rewritten to a single
//! JSON file after every mutation.
//!
//! ## Guarantees
//!
//! - Chirp and user ids are positive and assigned in order; a deleted id is
//!   never handed out again by the same handle
//! - No two users share an email (compared case-sensitively)
//! - A revoked token stays revoked
//! - The file is replaced atomically, so it always holds some complete
//!   image; after a successful mutation it holds every completed mutation
//!
//! A failed write is reported to the caller but not rolled back; see
//! [`Database`] for details.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chirpy_core::{ChirpQuery, Database};
//! use std::path::Path;
//!
//! let db = Database::open(Path::new("database/database.json"))?;
//!
//! let digest = db.hash_password(b"pw1")?;
//! let alice = db.add_user("alice@x.com", digest)?;
//! db.create_chirp("hello", alice.id)?;
//!
//! for chirp in db.list_chirps(ChirpQuery::all().by_author(alice.id)) {
//!     println!("{}: {}", chirp.id, chirp.body);
//! }
//! # Ok::<(), chirpy_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod database;
mod error;
mod integrity;
mod lock;
mod password;
mod query;
mod stats;

pub use chirpy_codec::{Chirp, RevocableToken, StoreImage, User};
pub use config::Config;
pub use database::Database;
pub use error::{CoreError, CoreResult};
pub use integrity::{IntegrityIssue, IntegrityReport};
pub use lock::StoreLock;
pub use password::{Argon2Hasher, PasswordHasher};
pub use query::{ChirpQuery, SortOrder};
pub use stats::{DatabaseStats, StatsSnapshot, StoreCounts};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
