//! Error types for the session authority.

use chirpy_core::CoreError;
use thiserror::Error;

/// Result type for session operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors that can occur while issuing or checking credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token is not a well-formed signed token.
    #[error("malformed token: {reason}")]
    Malformed {
        /// What was wrong with it.
        reason: String,
    },

    /// The signature does not match the content.
    #[error("invalid token signature")]
    InvalidSignature,

    /// The token was issued for the other token kind.
    #[error("wrong token issuer: expected {expected}, got {actual}")]
    WrongIssuer {
        /// Issuer required here.
        expected: &'static str,
        /// Issuer found in the token.
        actual: String,
    },

    /// The token is past its expiry.
    #[error("token expired")]
    Expired,

    /// The refresh token was revoked.
    #[error("token revoked")]
    Revoked,

    /// The refresh token is validly signed but the store has no record of it.
    #[error("token not registered")]
    Unregistered,

    /// The subject is not a user id.
    #[error("invalid token subject: {subject:?}")]
    InvalidSubject {
        /// The subject found in the token.
        subject: String,
    },

    /// No usable credential in the `Authorization` header.
    #[error("missing {scheme} credentials")]
    MissingCredentials {
        /// Scheme that was expected.
        scheme: &'static str,
    },

    /// The presented API key does not match.
    #[error("invalid API key")]
    InvalidApiKey,

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] CoreError),

    /// Claims could not be serialized or the signer could not be keyed.
    #[error("token encoding failed: {message}")]
    Encoding {
        /// Description of the failure.
        message: String,
    },
}

impl AuthError {
    /// Creates a malformed token error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// Creates an encoding error.
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Returns true if the caller failed to prove who they are.
    ///
    /// These are the errors an HTTP layer answers with 401. Store failures
    /// other than a bad login are not included.
    pub fn is_authentication_failure(&self) -> bool {
        match self {
            AuthError::Malformed { .. }
            | AuthError::InvalidSignature
            | AuthError::WrongIssuer { .. }
            | AuthError::Expired
            | AuthError::Revoked
            | AuthError::Unregistered
            | AuthError::InvalidSubject { .. }
            | AuthError::MissingCredentials { .. }
            | AuthError::InvalidApiKey => true,
            AuthError::Store(e) => matches!(
                e,
                CoreError::InvalidEmail { .. } | CoreError::IncorrectPassword
            ),
            AuthError::Encoding { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(AuthError::Expired.is_authentication_failure());
        assert!(AuthError::malformed("two segments").is_authentication_failure());
        assert!(AuthError::Store(CoreError::IncorrectPassword).is_authentication_failure());
        assert!(!AuthError::Store(CoreError::DuplicateToken).is_authentication_failure());
        assert!(!AuthError::encoding("boom").is_authentication_failure());
    }

    #[test]
    fn wrong_issuer_display() {
        let err = AuthError::WrongIssuer {
            expected: "chirpy-access",
            actual: "chirpy-refresh".into(),
        };
        assert_eq!(
            err.to_string(),
            "wrong token issuer: expected chirpy-access, got chirpy-refresh"
        );
    }
}
