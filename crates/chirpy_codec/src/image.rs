//! The whole-store image and its JSON encoding.

use crate::error::{CodecError, CodecResult};
use crate::fields::null_as_default;
use crate::records::{Chirp, RevocableToken, User};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Complete serialized state of the document store.
///
/// On disk this is a single JSON object:
///
/// ```text
/// { "chirps": {"<id>": {...}, ...},
///   "users":  {"<id>": {...}, ...},
///   "tokens": {"<token>": {...}, ...} }
/// ```
///
/// Chirp and user maps are keyed by the record id written as a decimal
/// string; the token map is keyed by the raw token string. Missing or
/// `null` collections load as empty, so images written before a collection
/// existed still open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreImage {
    /// Posts by id.
    #[serde(default, deserialize_with = "null_as_default")]
    pub chirps: BTreeMap<u64, Chirp>,
    /// Users by id.
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: BTreeMap<u64, User>,
    /// Refresh-token records by token string.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tokens: BTreeMap<String, RevocableToken>,
}

impl StoreImage {
    /// Creates an empty image.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks the structural rules every persisted image must satisfy.
    ///
    /// - chirp and user ids are non-zero and equal to their map key
    /// - no two users share an email
    /// - every token record is stored under its own token string
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidStructure`] describing the first
    /// violation found.
    pub fn validate(&self) -> CodecResult<()> {
        for (&key, chirp) in &self.chirps {
            if key == 0 {
                return Err(CodecError::invalid_structure("chirp id 0 is not allowed"));
            }
            if chirp.id != key {
                return Err(CodecError::invalid_structure(format!(
                    "chirp stored under key {key} has id {}",
                    chirp.id
                )));
            }
        }

        let mut emails = HashSet::with_capacity(self.users.len());
        for (&key, user) in &self.users {
            if key == 0 {
                return Err(CodecError::invalid_structure("user id 0 is not allowed"));
            }
            if user.id != key {
                return Err(CodecError::invalid_structure(format!(
                    "user stored under key {key} has id {}",
                    user.id
                )));
            }
            if !emails.insert(user.email.as_str()) {
                return Err(CodecError::invalid_structure(format!(
                    "email {:?} belongs to more than one user",
                    user.email
                )));
            }
        }

        for (key, token) in &self.tokens {
            if token.token != *key {
                return Err(CodecError::invalid_structure(
                    "token record stored under a different token string",
                ));
            }
        }

        Ok(())
    }
}

/// Encodes an image to its JSON byte form.
///
/// # Errors
///
/// Returns [`CodecError::EncodingFailed`] if serialization fails.
pub fn encode(image: &StoreImage) -> CodecResult<Vec<u8>> {
    serde_json::to_vec(image).map_err(|e| CodecError::encoding_failed(e.to_string()))
}

/// Decodes and validates an image.
///
/// # Errors
///
/// Returns [`CodecError::DecodingFailed`] for malformed JSON or fields of
/// the wrong shape, and [`CodecError::InvalidStructure`] if the parsed
/// image fails [`StoreImage::validate`].
pub fn decode(bytes: &[u8]) -> CodecResult<StoreImage> {
    let image: StoreImage =
        serde_json::from_slice(bytes).map_err(|e| CodecError::decoding_failed(e.to_string()))?;
    image.validate()?;
    Ok(image)
}
