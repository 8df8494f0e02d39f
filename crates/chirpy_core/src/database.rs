//! Database facade.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::integrity::{self, IntegrityIssue, IntegrityReport};
use crate::lock::StoreLock;
use crate::password::{Argon2Hasher, PasswordHasher};
use crate::query::{ChirpQuery, SortOrder};
use crate::stats::{DatabaseStats, StatsSnapshot, StoreCounts};
use chirpy_codec::{Chirp, Decode, Encode, RevocableToken, StoreImage, User};
use chirpy_storage::{FileBackend, InMemoryBackend, StorageBackend};
use chrono::Utc;
use parking_lot::{RwLock, RwLockWriteGuard};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything guarded by the store lock.
#[derive(Debug)]
struct StoreState {
    image: StoreImage,
    /// Next chirp id to hand out. Never rewound by deletion.
    next_chirp_id: u64,
    /// Next user id to hand out.
    next_user_id: u64,
}

impl StoreState {
    fn load(image: StoreImage) -> CoreResult<Self> {
        let next_chirp_id = next_id("chirp", image.chirps.keys().next_back().copied())?;
        let next_user_id = next_id("user", image.users.keys().next_back().copied())?;
        Ok(Self {
            image,
            next_chirp_id,
            next_user_id,
        })
    }

    fn email_owner(&self, email: &str) -> Option<u64> {
        self.image
            .users
            .values()
            .find(|user| user.email == email)
            .map(|user| user.id)
    }
}

/// First free id after `max`. The largest `u64` is never a usable id.
fn next_id(kind: &str, max: Option<u64>) -> CoreResult<u64> {
    match max {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| CoreError::invalid_format(format!("{kind} id {max} is out of range"))),
    }
}

/// The document store handle.
///
/// `Database` owns every chirp, user and refresh-token record. Callers get
/// value copies; nothing inside is shared by reference. Share a handle
/// between threads with `Arc<Database>`.
///
/// # Persistence
///
/// Every successful mutation rewrites the whole image to the backend. The
/// mutation runs under the exclusive lock, which is then downgraded to a
/// shared lock for the write. Readers keep going during disk I/O while the
/// next writer waits, so images reach the disk in mutation order.
///
/// If the write fails the error is returned but the in-memory change stays.
/// Memory is then ahead of the file until the next successful persist.
///
/// # Example
///
/// ```rust
/// use chirpy_core::Database;
///
/// let db = Database::open_in_memory().unwrap();
/// let chirp = db.create_chirp("hello", 1).unwrap();
/// assert_eq!(chirp.id, 1);
/// assert_eq!(db.get_chirp(1), Some(chirp));
/// ```
pub struct Database {
    config: Config,
    backend: Box<dyn StorageBackend>,
    hasher: Arc<dyn PasswordHasher>,
    state: RwLock<StoreState>,
    stats: DatabaseStats,
    /// Held for the lifetime of a file-backed store opened with `lock_file`.
    _lock: Option<StoreLock>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("location", &self.backend.location())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Opens the store file at `path`, creating it if needed.
    ///
    /// A missing file is created holding an empty store, along with any
    /// missing parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Another handle holds the store's lock file (`DatabaseLocked`)
    /// - The file exists but cannot be read
    /// - The file is not a valid store image
    ///
    /// None of these can be recovered from; the caller should not start.
    pub fn open(path: &Path) -> CoreResult<Self> {
        Self::open_with_config(path, Config::default())
    }

    /// Opens the store file at `path` with custom configuration.
    ///
    /// # Errors
    ///
    /// As [`open`](Self::open), plus `InvalidFormat` if the file does not
    /// exist and `create_if_missing` is false.
    pub fn open_with_config(path: &Path, config: Config) -> CoreResult<Self> {
        let backend = if config.create_if_missing {
            FileBackend::open_with_create_dirs(path)?
        } else {
            if !path.try_exists()? {
                return Err(CoreError::invalid_format(format!(
                    "database file does not exist: {}",
                    path.display()
                )));
            }
            FileBackend::new(path)
        };
        let backend = backend.with_sync(config.sync_on_write);

        let lock = if config.lock_file {
            Some(StoreLock::acquire(path)?)
        } else {
            None
        };

        let mut db = Self::open_with_backend(Box::new(backend), config)?;
        db._lock = lock;
        Ok(db)
    }

    /// Opens a store over an arbitrary backend.
    ///
    /// No lock file is taken; the backend is assumed to be exclusive to
    /// this handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or written, or holds
    /// an invalid image.
    pub fn open_with_backend(backend: Box<dyn StorageBackend>, config: Config) -> CoreResult<Self> {
        if !backend.exists()? {
            if !config.create_if_missing {
                return Err(CoreError::invalid_format(format!(
                    "no store image at {}",
                    backend.location()
                )));
            }
            let empty = StoreImage::new().encode()?;
            backend.replace(&empty)?;
            info!(location = %backend.location(), "created empty store");
        }

        let bytes = backend.read_all()?;
        let image = StoreImage::decode(&bytes)?;
        info!(
            location = %backend.location(),
            chirps = image.chirps.len(),
            users = image.users.len(),
            tokens = image.tokens.len(),
            "opened store"
        );

        Ok(Self {
            config,
            backend,
            hasher: Arc::new(Argon2Hasher::default()),
            state: RwLock::new(StoreState::load(image)?),
            stats: DatabaseStats::new(),
            _lock: None,
        })
    }

    /// Opens an empty store that lives only in memory.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the signature matches the other openers.
    pub fn open_in_memory() -> CoreResult<Self> {
        Self::open_with_backend(Box::new(InMemoryBackend::new()), Config::default())
    }

    /// Replaces the password hasher (Argon2id by default).
    #[must_use]
    pub fn with_hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Returns the configuration the store was opened with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a description of where the image is stored.
    pub fn location(&self) -> String {
        self.backend.location()
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Writes the current image to the backend.
    ///
    /// Mutations persist on their own; call this to retry after a failed
    /// write brought memory ahead of the file.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the backend write fails.
    pub fn persist(&self) -> CoreResult<()> {
        let state = self.state.read();
        self.write_image(&state.image)
    }

    /// Applies `f` under the exclusive lock, then persists under the shared
    /// lock obtained by downgrading it.
    ///
    /// If `f` fails nothing was changed and nothing is written.
    fn mutate<T>(&self, f: impl FnOnce(&mut StoreState) -> CoreResult<T>) -> CoreResult<T> {
        let mut guard = self.state.write();
        let value = match f(&mut *guard) {
            Ok(value) => value,
            Err(e) => {
                if e.is_validation() {
                    self.stats.record_rejected();
                }
                return Err(e);
            }
        };
        let guard = RwLockWriteGuard::downgrade(guard);
        self.write_image(&guard.image)?;
        Ok(value)
    }

    fn write_image(&self, image: &StoreImage) -> CoreResult<()> {
        let bytes = image.encode()?;
        match self.backend.replace(&bytes) {
            Ok(()) => {
                self.stats.record_persist(bytes.len() as u64);
                debug!(bytes = bytes.len(), "persisted store");
                Ok(())
            }
            Err(e) => {
                self.stats.record_persist_failure();
                warn!(error = %e, location = %self.backend.location(), "persist failed; memory is ahead of the file");
                Err(e.into())
            }
        }
    }

    // ------------------------------------------------------------------
    // Chirps
    // ------------------------------------------------------------------

    /// Creates a chirp with the next id.
    ///
    /// # Errors
    ///
    /// Returns `IdsExhausted` once the largest id has been reached, or an
    /// error if the persist fails. The chirp stays in memory.
    pub fn create_chirp(&self, body: impl Into<String>, author_id: u64) -> CoreResult<Chirp> {
        let body = body.into();
        self.mutate(|state| {
            let id = state.next_chirp_id;
            state.next_chirp_id = id
                .checked_add(1)
                .ok_or(CoreError::IdsExhausted { kind: "chirp" })?;
            let chirp = Chirp {
                id,
                body,
                author_id,
            };
            state.image.chirps.insert(id, chirp.clone());
            Ok(chirp)
        })
    }

    /// Returns the chirp with `id`, if any.
    pub fn get_chirp(&self, id: u64) -> Option<Chirp> {
        self.state.read().image.chirps.get(&id).cloned()
    }

    /// Lists chirps matching `query`, sorted by id.
    pub fn list_chirps(&self, query: ChirpQuery) -> Vec<Chirp> {
        let state = self.state.read();
        let matching = state
            .image
            .chirps
            .values()
            .filter(|chirp| query.matches(chirp.author_id))
            .cloned();
        match query.order {
            SortOrder::Ascending => matching.collect(),
            SortOrder::Descending => {
                let mut chirps: Vec<_> = matching.collect();
                chirps.reverse();
                chirps
            }
        }
    }

    /// Deletes the chirp with `id` and returns it.
    ///
    /// The id is not handed out again by this handle.
    ///
    /// # Errors
    ///
    /// Returns `ChirpNotFound` if there is no such chirp, or an error if
    /// the persist fails.
    pub fn delete_chirp(&self, id: u64) -> CoreResult<Chirp> {
        self.mutate(|state| {
            state
                .image
                .chirps
                .remove(&id)
                .ok_or(CoreError::ChirpNotFound { id })
        })
    }

    /// Deletes the chirp with `id` on behalf of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `ChirpNotFound` if there is no such chirp and `NotAuthor` if
    /// `user_id` did not write it.
    pub fn delete_chirp_as(&self, id: u64, user_id: u64) -> CoreResult<Chirp> {
        self.mutate(|state| {
            let chirp = state
                .image
                .chirps
                .get(&id)
                .ok_or(CoreError::ChirpNotFound { id })?;
            if chirp.author_id != user_id {
                return Err(CoreError::NotAuthor {
                    chirp_id: id,
                    user_id,
                });
            }
            state
                .image
                .chirps
                .remove(&id)
                .ok_or(CoreError::ChirpNotFound { id })
        })
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Hashes a plaintext password with the configured hasher.
    ///
    /// # Errors
    ///
    /// Returns `PasswordHash` if the hasher fails.
    pub fn hash_password(&self, password: &[u8]) -> CoreResult<Vec<u8>> {
        self.hasher.hash(password)
    }

    /// Registers a user with the next id.
    ///
    /// Emails are compared exactly, so `A@x.com` and `a@x.com` are two
    /// different users.
    ///
    /// # Errors
    ///
    /// Returns `TakenEmail` if any user already has `email`, `IdsExhausted`
    /// once the largest id has been reached, or an error if the persist
    /// fails.
    pub fn add_user(&self, email: impl Into<String>, password_digest: Vec<u8>) -> CoreResult<User> {
        let email = email.into();
        self.mutate(|state| {
            if state.email_owner(&email).is_some() {
                return Err(CoreError::TakenEmail { email });
            }
            let id = state.next_user_id;
            state.next_user_id = id
                .checked_add(1)
                .ok_or(CoreError::IdsExhausted { kind: "user" })?;
            let user = User {
                id,
                email,
                password_digest,
                premium: false,
            };
            state.image.users.insert(id, user.clone());
            Ok(user)
        })
    }

    /// Overwrites the email and password digest of user `id`.
    ///
    /// The premium flag is kept. There is no existence check: an unknown
    /// id creates a fresh, non-premium user under that id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUserId` for id 0 and `u64::MAX`, `TakenEmail` if
    /// another user has `email`, or an error if the persist fails.
    pub fn update_user(
        &self,
        id: u64,
        email: impl Into<String>,
        password_digest: Vec<u8>,
    ) -> CoreResult<User> {
        let email = email.into();
        self.mutate(|state| {
            let after = match id.checked_add(1) {
                Some(after) if id != 0 => after,
                _ => return Err(CoreError::InvalidUserId { id }),
            };
            if matches!(state.email_owner(&email), Some(owner) if owner != id) {
                return Err(CoreError::TakenEmail { email });
            }
            let premium = state.image.users.get(&id).is_some_and(|user| user.premium);
            let user = User {
                id,
                email,
                password_digest,
                premium,
            };
            state.image.users.insert(id, user.clone());
            state.next_user_id = state.next_user_id.max(after);
            Ok(user)
        })
    }

    /// Returns the user with `id`, if any.
    pub fn get_user(&self, id: u64) -> Option<User> {
        self.state.read().image.users.get(&id).cloned()
    }

    /// Returns the user with exactly this email, if any.
    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.state
            .read()
            .image
            .users
            .values()
            .find(|user| user.email == email)
            .cloned()
    }

    /// Checks a login.
    ///
    /// The digest is verified after the lock is released, so a slow hasher
    /// never blocks writers.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEmail` if no user has `email` and
    /// `IncorrectPassword` if the password does not verify.
    pub fn authenticate_user(&self, email: &str, password: &[u8]) -> CoreResult<User> {
        let user = self
            .find_user_by_email(email)
            .ok_or_else(|| CoreError::InvalidEmail {
                email: email.to_string(),
            })?;
        if !self.hasher.verify(&user.password_digest, password) {
            return Err(CoreError::IncorrectPassword);
        }
        Ok(user)
    }

    /// Sets the premium flag on an existing user.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUserId` if there is no such user, or an error if the
    /// persist fails.
    pub fn set_premium(&self, user_id: u64) -> CoreResult<()> {
        self.mutate(|state| {
            let user = state
                .image
                .users
                .get_mut(&user_id)
                .ok_or(CoreError::InvalidUserId { id: user_id })?;
            user.premium = true;
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Refresh tokens
    // ------------------------------------------------------------------

    /// Registers a freshly issued refresh token as valid.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateToken` if the token string is already registered,
    /// whether valid or revoked, or an error if the persist fails.
    pub fn add_token(&self, token: &str) -> CoreResult<()> {
        self.mutate(|state| {
            if state.image.tokens.contains_key(token) {
                return Err(CoreError::DuplicateToken);
            }
            state
                .image
                .tokens
                .insert(token.to_string(), RevocableToken::issued(token));
            Ok(())
        })?;
        debug!("registered refresh token");
        Ok(())
    }

    /// Revokes a registered token and stamps the revocation time.
    ///
    /// # Errors
    ///
    /// Returns `UnknownToken` if the token was never registered,
    /// `AlreadyRevoked` if it is already revoked, or an error if the
    /// persist fails.
    pub fn revoke_token(&self, token: &str) -> CoreResult<()> {
        self.mutate(|state| {
            let record = state
                .image
                .tokens
                .get_mut(token)
                .ok_or(CoreError::UnknownToken)?;
            if record.is_revoked() {
                return Err(CoreError::AlreadyRevoked);
            }
            record.valid = false;
            record.revoked_at = Some(Utc::now());
            Ok(())
        })?;
        debug!("revoked refresh token");
        Ok(())
    }

    /// Returns the record of a token, if registered.
    pub fn token_status(&self, token: &str) -> Option<RevocableToken> {
        self.state.read().image.tokens.get(token).cloned()
    }

    /// Returns true if the token is registered and not revoked.
    pub fn is_token_valid(&self, token: &str) -> bool {
        self.state
            .read()
            .image
            .tokens
            .get(token)
            .is_some_and(|record| record.valid)
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// Returns current entity counts.
    pub fn counts(&self) -> StoreCounts {
        let state = self.state.read();
        let image = &state.image;
        let valid_tokens = image.tokens.values().filter(|t| t.valid).count();
        StoreCounts {
            chirps: image.chirps.len(),
            users: image.users.len(),
            premium_users: image.users.values().filter(|u| u.premium).count(),
            valid_tokens,
            revoked_tokens: image.tokens.len() - valid_tokens,
        }
    }

    /// Returns persistence counters since the store was opened.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Returns a copy of the whole in-memory image.
    pub fn snapshot(&self) -> StoreImage {
        self.state.read().image.clone()
    }

    /// Re-checks every store invariant.
    ///
    /// Besides the structural rules, this reads the backend back and
    /// reports whether it still holds the in-memory image, which is not
    /// the case after a failed persist.
    pub fn check_integrity(&self) -> IntegrityReport {
        let state = self.state.read();
        let mut report = IntegrityReport::default();

        integrity::check_image(&state.image, &mut report);
        integrity::check_counter(
            "chirp",
            state.next_chirp_id,
            state.image.chirps.keys().next_back().copied(),
            &mut report,
        );
        integrity::check_counter(
            "user",
            state.next_user_id,
            state.image.users.keys().next_back().copied(),
            &mut report,
        );

        let on_disk = self
            .backend
            .read_all()
            .map_err(CoreError::from)
            .and_then(|bytes| StoreImage::decode(&bytes).map_err(CoreError::from));
        match on_disk {
            Ok(image) if image == state.image => {}
            Ok(_) => report.issues.push(IntegrityIssue::FileDiverged {
                detail: "stored image differs from memory".to_string(),
            }),
            Err(e) => report.issues.push(IntegrityIssue::FileDiverged {
                detail: e.to_string(),
            }),
        }

        report
    }
}
