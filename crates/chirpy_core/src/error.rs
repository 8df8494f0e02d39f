//! Error types for the Chirpy document store.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in document store operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] chirpy_storage::StorageError),

    /// Image codec error.
    #[error("codec error: {0}")]
    Codec(#[from] chirpy_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Another user already has this email.
    #[error("email already taken: {email}")]
    TakenEmail {
        /// The contested email.
        email: String,
    },

    /// No user has this email.
    #[error("invalid email address: {email}")]
    InvalidEmail {
        /// The email that matched nobody.
        email: String,
    },

    /// The password does not match the stored digest.
    #[error("incorrect password")]
    IncorrectPassword,

    /// No user with this id, or the id is not usable.
    #[error("invalid user id: {id}")]
    InvalidUserId {
        /// The offending id.
        id: u64,
    },

    /// No chirp with this id.
    #[error("chirp not found: {id}")]
    ChirpNotFound {
        /// The missing id.
        id: u64,
    },

    /// The user is not the chirp's author.
    #[error("user {user_id} is not the author of chirp {chirp_id}")]
    NotAuthor {
        /// The chirp that was targeted.
        chirp_id: u64,
        /// The user who tried.
        user_id: u64,
    },

    /// Every id of this kind has been handed out.
    #[error("no {kind} ids left")]
    IdsExhausted {
        /// Which id sequence ran out.
        kind: &'static str,
    },

    /// The token string was never registered.
    #[error("unknown token")]
    UnknownToken,

    /// The token was revoked earlier.
    #[error("token already revoked")]
    AlreadyRevoked,

    /// The token string is already registered.
    #[error("token already registered")]
    DuplicateToken,

    /// Another process holds the store's lock file.
    #[error("database locked: another process has exclusive access to {path}")]
    DatabaseLocked {
        /// Path of the lock file.
        path: String,
    },

    /// The store could not be opened in the requested way.
    #[error("invalid database format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },

    /// The password hasher failed to produce a digest.
    #[error("password hashing failed: {message}")]
    PasswordHash {
        /// Description of the failure.
        message: String,
    },
}

impl CoreError {
    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates a password hashing error.
    pub fn password_hash(message: impl Into<String>) -> Self {
        Self::PasswordHash {
            message: message.into(),
        }
    }

    /// Returns true for caller mistakes that leave the store untouched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CoreError::TakenEmail { .. }
                | CoreError::InvalidEmail { .. }
                | CoreError::IncorrectPassword
                | CoreError::InvalidUserId { .. }
                | CoreError::ChirpNotFound { .. }
                | CoreError::NotAuthor { .. }
                | CoreError::IdsExhausted { .. }
                | CoreError::UnknownToken
                | CoreError::AlreadyRevoked
                | CoreError::DuplicateToken
        )
    }

    /// Returns true for failures of the backing file.
    ///
    /// When one of these comes back from a mutation, the in-memory store
    /// already holds the change but the file does not.
    pub fn is_io(&self) -> bool {
        matches!(self, CoreError::Storage(_) | CoreError::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classification() {
        assert!(CoreError::IncorrectPassword.is_validation());
        assert!(CoreError::AlreadyRevoked.is_validation());
        assert!(CoreError::IdsExhausted { kind: "chirp" }.is_validation());
        assert!(!CoreError::invalid_format("bad").is_validation());

        let io = CoreError::Io(io::Error::new(io::ErrorKind::Other, "disk"));
        assert!(io.is_io());
        assert!(!io.is_validation());
    }

    #[test]
    fn error_display() {
        let err = CoreError::NotAuthor {
            chirp_id: 7,
            user_id: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains('3'));
    }
}
