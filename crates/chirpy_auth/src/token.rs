//! Signed tokens.
//!
//! Tokens are compact HS256 JWS strings:
//!
//! ```text
//! base64url(header) "." base64url(claims) "." base64url(hmac-sha256)
//! ```
//!
//! with header `{"alg":"HS256","typ":"JWT"}`. The two token kinds differ
//! only in their issuer claim; refresh tokens also carry a random `jti` so
//! no two are ever the same string.

use crate::error::{AuthError, AuthResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

/// Issuer claim of access tokens.
pub const ACCESS_ISSUER: &str = "chirpy-access";

/// Issuer claim of refresh tokens.
pub const REFRESH_ISSUER: &str = "chirpy-refresh";

/// The two token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Short-lived, never looked up in the store.
    Access,
    /// Long-lived, registered in the store so it can be revoked.
    Refresh,
}

impl TokenKind {
    /// Returns the issuer claim for this kind.
    #[must_use]
    pub const fn issuer(self) -> &'static str {
        match self {
            TokenKind::Access => ACCESS_ISSUER,
            TokenKind::Refresh => REFRESH_ISSUER,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Registered claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer, one of [`ACCESS_ISSUER`] or [`REFRESH_ISSUER`].
    pub iss: String,
    /// User id in decimal.
    pub sub: String,
    /// Issued-at, Unix seconds.
    pub iat: i64,
    /// Expiry, Unix seconds.
    pub exp: i64,
    /// Unique token id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    /// Builds claims for `user_id` issued at `now` and valid for `ttl`.
    pub fn new(kind: TokenKind, user_id: u64, now: i64, ttl: Duration) -> Self {
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Self {
            iss: kind.issuer().to_string(),
            sub: user_id.to_string(),
            iat: now,
            exp: now.saturating_add(ttl),
            jti: None,
        }
    }

    /// Sets the unique token id.
    #[must_use]
    pub fn with_id(mut self, jti: impl Into<String>) -> Self {
        self.jti = Some(jti.into());
        self
    }

    /// Checks issuer and expiry and returns the subject as a user id.
    ///
    /// A token is expired from the second `exp` is reached.
    ///
    /// # Errors
    ///
    /// Returns `WrongIssuer`, `Expired` or `InvalidSubject`.
    pub fn validate(&self, kind: TokenKind, now: i64) -> AuthResult<u64> {
        if self.iss != kind.issuer() {
            return Err(AuthError::WrongIssuer {
                expected: kind.issuer(),
                actual: self.iss.clone(),
            });
        }
        if now >= self.exp {
            return Err(AuthError::Expired);
        }
        self.user_id()
    }

    /// Parses the subject as a user id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSubject` unless the subject is a positive integer.
    pub fn user_id(&self) -> AuthResult<u64> {
        match self.sub.parse::<u64>() {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(AuthError::InvalidSubject {
                subject: self.sub.clone(),
            }),
        }
    }
}

fn mac(secret: &[u8]) -> AuthResult<HmacSha256> {
    HmacSha256::new_from_slice(secret).map_err(|e| AuthError::encoding(e.to_string()))
}

fn encode_segment<T: Serialize>(value: &T) -> AuthResult<String> {
    let json = serde_json::to_vec(value).map_err(|e| AuthError::encoding(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str, what: &str) -> AuthResult<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| AuthError::malformed(format!("{what}: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| AuthError::malformed(format!("{what}: {e}")))
}

/// Signs `claims` with `secret`.
///
/// # Errors
///
/// Returns `Encoding` if the claims cannot be serialized.
pub fn sign(claims: &Claims, secret: &[u8]) -> AuthResult<String> {
    let header = Header {
        alg: ALGORITHM.to_string(),
        typ: "JWT".to_string(),
    };
    let signing_input = format!("{}.{}", encode_segment(&header)?, encode_segment(claims)?);

    let mut mac = mac(secret)?;
    mac.update(signing_input.as_bytes());
    let signature = mac.finalize().into_bytes();

    Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
}

/// Checks the signature of `token` and returns its claims.
///
/// Issuer and expiry are not checked here; see [`Claims::validate`].
///
/// # Errors
///
/// Returns `Malformed` if the token does not have three well-formed
/// segments or names another algorithm, and `InvalidSignature` if the
/// signature does not match.
pub fn verify(token: &str, secret: &[u8]) -> AuthResult<Claims> {
    let mut segments = token.split('.');
    let (Some(header), Some(claims), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::malformed("expected three segments"));
    };

    let parsed: Header = decode_segment(header, "header")?;
    if parsed.alg != ALGORITHM {
        return Err(AuthError::malformed(format!(
            "unsupported algorithm {:?}",
            parsed.alg
        )));
    }

    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|e| AuthError::malformed(format!("signature: {e}")))?;
    let mut mac = mac(secret)?;
    mac.update(header.as_bytes());
    mac.update(b".");
    mac.update(claims.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| AuthError::InvalidSignature)?;

    decode_segment(claims, "claims")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";
    const NOW: i64 = 1_700_000_000;

    fn access_claims(user_id: u64) -> Claims {
        Claims::new(TokenKind::Access, user_id, NOW, Duration::from_secs(3600))
    }

    #[test]
    fn sign_then_verify() {
        let claims = access_claims(7);
        let token = sign(&claims, SECRET).unwrap();

        assert_eq!(token.split('.').count(), 3);
        assert_eq!(verify(&token, SECRET).unwrap(), claims);
        assert_eq!(claims.validate(TokenKind::Access, NOW).unwrap(), 7);
    }

    #[test]
    fn header_is_standard_hs256() {
        let token = sign(&access_claims(1), SECRET).unwrap();
        let header = token.split('.').next().unwrap();
        let json = URL_SAFE_NO_PAD.decode(header).unwrap();
        assert_eq!(json, br#"{"alg":"HS256","typ":"JWT"}"#);
    }

    #[test]
    fn claims_omit_missing_jti() {
        let token = sign(&access_claims(1), SECRET).unwrap();
        let claims = token.split('.').nth(1).unwrap();
        let json = String::from_utf8(URL_SAFE_NO_PAD.decode(claims).unwrap()).unwrap();
        assert!(!json.contains("jti"));
        assert!(json.contains(r#""iss":"chirpy-access""#));
        assert!(json.contains(r#""sub":"1""#));
    }

    #[test]
    fn wrong_secret_fails_signature() {
        let token = sign(&access_claims(1), SECRET).unwrap();
        assert!(matches!(
            verify(&token, b"other-secret"),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn tampered_claims_fail_signature() {
        let token = sign(&access_claims(1), SECRET).unwrap();
        let forged = sign(&access_claims(2), b"attacker").unwrap();

        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = forged.split('.').nth(1).unwrap();
        let spliced = parts.join(".");

        assert!(matches!(
            verify(&spliced, SECRET),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn malformed_tokens() {
        for token in ["", "abc", "a.b", "a.b.c.d", "!!.??.**"] {
            assert!(
                matches!(verify(token, SECRET), Err(AuthError::Malformed { .. })),
                "{token:?} should be malformed"
            );
        }
    }

    #[test]
    fn other_algorithm_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let claims = encode_segment(&access_claims(1)).unwrap();
        let token = format!("{header}.{claims}.");
        assert!(matches!(
            verify(&token, SECRET),
            Err(AuthError::Malformed { .. })
        ));
    }

    #[test]
    fn issuer_is_checked() {
        let claims = access_claims(3);
        assert!(matches!(
            claims.validate(TokenKind::Refresh, NOW),
            Err(AuthError::WrongIssuer {
                expected: REFRESH_ISSUER,
                ..
            })
        ));
    }

    #[test]
    fn expiry_boundary() {
        let claims = access_claims(3);
        assert!(claims.validate(TokenKind::Access, NOW + 3599).is_ok());
        assert!(matches!(
            claims.validate(TokenKind::Access, NOW + 3600),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn subject_must_be_positive_id() {
        for sub in ["0", "-1", "abc", ""] {
            let mut claims = access_claims(1);
            claims.sub = sub.to_string();
            assert!(matches!(
                claims.validate(TokenKind::Access, NOW),
                Err(AuthError::InvalidSubject { .. })
            ));
        }
    }

    #[test]
    fn jti_makes_tokens_distinct() {
        let base = Claims::new(TokenKind::Refresh, 1, NOW, Duration::from_secs(60));
        let a = sign(&base.clone().with_id("one"), SECRET).unwrap();
        let b = sign(&base.with_id("two"), SECRET).unwrap();
        assert_ne!(a, b);
        assert_eq!(verify(&a, SECRET).unwrap().jti.as_deref(), Some("one"));
    }
}
