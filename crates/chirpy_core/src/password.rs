//! Password digest capability.
//!
//! The store never looks inside a digest. It asks a [`PasswordHasher`] to
//! produce one when a caller registers a password and to check one when a
//! user logs in.

use crate::error::{CoreError, CoreResult};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Argon2, Params};

/// Produces and checks opaque password digests.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password into a storable digest.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PasswordHash`] if hashing fails.
    fn hash(&self, password: &[u8]) -> CoreResult<Vec<u8>>;

    /// Returns true if `password` produced `digest`.
    ///
    /// Malformed digests simply fail verification.
    fn verify(&self, digest: &[u8], password: &[u8]) -> bool;
}

/// Argon2id hasher producing PHC strings (`$argon2id$v=19$...`).
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    /// Creates a hasher with the recommended default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an Argon2id hasher with explicit cost parameters.
    #[must_use]
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        }
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &[u8]) -> CoreResult<Vec<u8>> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = self
            .argon2
            .hash_password(password, &salt)
            .map_err(|e| CoreError::password_hash(e.to_string()))?;
        Ok(digest.to_string().into_bytes())
    }

    fn verify(&self, digest: &[u8], password: &[u8]) -> bool {
        let Ok(encoded) = std::str::from_utf8(digest) else {
            return false;
        };
        let Ok(parsed) = PasswordHash::new(encoded) else {
            return false;
        };
        self.argon2.verify_password(password, &parsed).is_ok()
    }
}
