//! Entity records as they appear in the store image.

use crate::fields::{digest, revocation_time};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chirp {
    /// Unique, strictly positive id.
    pub id: u64,
    /// Post text.
    pub body: String,
    /// Id of the user who wrote it.
    #[serde(default)]
    pub author_id: u64,
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique, strictly positive id.
    pub id: u64,
    /// Login email; unique across users, compared case-sensitively.
    pub email: String,
    /// Opaque password digest produced by the configured hasher.
    #[serde(rename = "hash", with = "digest")]
    pub password_digest: Vec<u8>,
    /// Premium ("Chirpy Red") membership.
    #[serde(rename = "is_chirpy_red", default)]
    pub premium: bool,
}

/// Store-side record of an issued refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocableToken {
    /// The signed token string; also the record's key.
    pub token: String,
    /// False once revoked.
    pub valid: bool,
    /// When the token was revoked.
    #[serde(rename = "revocationTime", with = "revocation_time", default)]
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RevocableToken {
    /// Creates a record for a freshly issued token.
    #[must_use]
    pub fn issued(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            valid: true,
            revoked_at: None,
        }
    }

    /// Returns true if the token has been revoked.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        !self.valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn chirp_field_names() {
        let chirp = Chirp {
            id: 3,
            body: "hi".into(),
            author_id: 9,
        };
        let json = serde_json::to_value(&chirp).unwrap();
        assert_eq!(json, serde_json::json!({"id": 3, "body": "hi", "author_id": 9}));
    }

    #[test]
    fn user_digest_is_base64() {
        let user = User {
            id: 1,
            email: "a@b.c".into(),
            password_digest: b"digest".to_vec(),
            premium: true,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["hash"], "ZGlnZXN0");
        assert_eq!(json["is_chirpy_red"], true);
    }

    #[test]
    fn user_null_digest_and_missing_flag() {
        let user: User =
            serde_json::from_str(r#"{"id":2,"email":"x@y.z","hash":null}"#).unwrap();
        assert!(user.password_digest.is_empty());
        assert!(!user.premium);
    }

    #[test]
    fn token_zero_time_means_not_revoked() {
        let token = RevocableToken::issued("abc");
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["revocationTime"], "0001-01-01T00:00:00Z");

        let back: RevocableToken = serde_json::from_value(json).unwrap();
        assert_eq!(back.revoked_at, None);
        assert!(!back.is_revoked());
    }

    #[test]
    fn token_revocation_time_roundtrip() {
        let at = Utc.with_ymd_and_hms(2024, 5, 17, 12, 30, 0).unwrap();
        let token = RevocableToken {
            token: "abc".into(),
            valid: false,
            revoked_at: Some(at),
        };
        let json = serde_json::to_string(&token).unwrap();
        assert!(json.contains("2024-05-17T12:30:00Z"));

        let back: RevocableToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }

    #[test]
    fn token_accepts_offset_timestamps() {
        let back: RevocableToken = serde_json::from_str(
            r#"{"token":"t","valid":false,"revocationTime":"2024-05-17T14:30:00.5+02:00"}"#,
        )
        .unwrap();
        let at = back.revoked_at.unwrap();
        assert_eq!(at.timestamp(), Utc.with_ymd_and_hms(2024, 5, 17, 12, 30, 0).unwrap().timestamp());
        assert_eq!(at.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn token_rejects_garbage_timestamp() {
        let result: Result<RevocableToken, _> = serde_json::from_str(
            r#"{"token":"t","valid":false,"revocationTime":"yesterday"}"#,
        );
        assert!(result.is_err());
    }
}
