//! Test fixtures and database helpers.

use chirpy_core::{Config, CoreResult, Database, PasswordHasher};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Unsalted SHA-256 password hasher.
///
/// Deterministic and fast, which keeps tests quick. Never use it outside
/// tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct FastHasher;

impl PasswordHasher for FastHasher {
    fn hash(&self, password: &[u8]) -> CoreResult<Vec<u8>> {
        Ok(Sha256::digest(password).to_vec())
    }

    fn verify(&self, digest: &[u8], password: &[u8]) -> bool {
        Sha256::digest(password).as_slice() == digest
    }
}

/// A test database with automatic cleanup.
///
/// Every `TestDatabase` uses [`FastHasher`].
pub struct TestDatabase {
    /// The database instance.
    pub db: Database,
    path: Option<PathBuf>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestDatabase {
    /// Creates a new in-memory test database.
    pub fn memory() -> Self {
        let db = Database::open_in_memory()
            .expect("Failed to open in-memory database")
            .with_hasher(Arc::new(FastHasher));
        Self {
            db,
            path: None,
            _temp_dir: None,
        }
    }

    /// Creates a new file-based test database in a fresh temp directory.
    pub fn file() -> Self {
        Self::file_with_config(Config::default().sync_on_write(false))
    }

    /// Creates a new file-based test database with custom configuration.
    pub fn file_with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("database").join("database.json");
        let db = open_file(&path, config);
        Self {
            db,
            path: Some(path),
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the store file path if file-based, None if in-memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Closes the store and opens the same file again.
    ///
    /// Models a process restart. In-memory databases cannot be reopened.
    pub fn reopen(self) -> Self {
        let Self {
            db,
            path,
            _temp_dir,
        } = self;
        let config = db.config().clone();
        drop(db);

        let path = path.expect("Only file databases can be reopened");
        let db = open_file(&path, config);
        Self {
            db,
            path: Some(path),
            _temp_dir,
        }
    }

    /// Hashes a password with the test hasher.
    pub fn digest(password: &str) -> Vec<u8> {
        Sha256::digest(password.as_bytes()).to_vec()
    }
}

fn open_file(path: &Path, config: Config) -> Database {
    Database::open_with_config(path, config)
        .expect("Failed to open file database")
        .with_hasher(Arc::new(FastHasher))
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

/// Runs a test with a temporary in-memory database.
pub fn with_temp_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let test_db = TestDatabase::memory();
    f(&test_db.db)
}

/// Runs a test with a temporary file-based database.
pub fn with_file_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database, &Path) -> R,
{
    let test_db = TestDatabase::file();
    let path = test_db.path().expect("File database should have a path");
    f(&test_db.db, path)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a database holding `users` users (`user1@example.com`, ...,
    /// password `password<n>`) who each wrote `chirps_per_user` chirps.
    pub fn populated_database(users: u64, chirps_per_user: u64) -> TestDatabase {
        let test_db = TestDatabase::memory();
        for n in 1..=users {
            let user = test_db
                .add_user(
                    format!("user{n}@example.com"),
                    TestDatabase::digest(&format!("password{n}")),
                )
                .expect("Failed to add user");
            for c in 0..chirps_per_user {
                test_db
                    .create_chirp(format!("chirp {c} by {n}"), user.id)
                    .expect("Failed to create chirp");
            }
        }
        test_db
    }
}
