//! `Authorization` header parsing.
//!
//! Both credential kinds travel as `"<Scheme> <credential>"`: `Bearer` for
//! tokens and `ApiKey` for webhook keys.

use crate::error::{AuthError, AuthResult};

/// Scheme of token credentials.
pub const BEARER: &str = "Bearer";

/// Scheme of API key credentials.
pub const API_KEY: &str = "ApiKey";

fn credential<'a>(header: Option<&'a str>, scheme: &'static str) -> AuthResult<&'a str> {
    let missing = || AuthError::MissingCredentials { scheme };
    let (found, value) = header.ok_or_else(missing)?.split_once(' ').ok_or_else(missing)?;
    let value = value.trim();
    if found != scheme || value.is_empty() {
        return Err(missing());
    }
    Ok(value)
}

/// Extracts the token from `Bearer <token>`.
///
/// # Errors
///
/// Returns `MissingCredentials` if the header is absent, uses another
/// scheme, or carries no token.
pub fn bearer_token(header: Option<&str>) -> AuthResult<&str> {
    credential(header, BEARER)
}

/// Extracts the key from `ApiKey <key>`.
///
/// # Errors
///
/// Returns `MissingCredentials` if the header is absent, uses another
/// scheme, or carries no key.
pub fn api_key(header: Option<&str>) -> AuthResult<&str> {
    credential(header, API_KEY)
}
