//! # Chirpy Auth
//!
//! The session authority: issues and validates the two Chirpy credential
//! kinds on top of the document store.
//!
//! - **Access tokens** last an hour and are validated from the token alone.
//! - **Refresh tokens** last 60 days and are registered in the store, so a
//!   logout can revoke them before they expire.
//!
//! Both are HS256-signed compact tokens keyed with the `JWT_SECRET`.
//!
//! ## Example
//!
//! ```rust
//! use chirpy_auth::{AuthConfig, SessionAuthority};
//! use chirpy_core::Database;
//! use std::sync::Arc;
//!
//! let store = Arc::new(Database::open_in_memory()?);
//! let auth = SessionAuthority::new(AuthConfig::new("jwt-secret"), store);
//!
//! let refresh = auth.issue_refresh_token(1)?;
//! assert_eq!(auth.authenticate_refresh_token(&refresh)?, 1);
//!
//! auth.logout(&refresh)?;
//! assert!(auth.authenticate_refresh_token(&refresh).is_err());
//! # Ok::<(), chirpy_auth::AuthError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod api_key;
mod authority;
mod config;
mod error;
mod header;
pub mod token;

pub use api_key::ApiKey;
pub use authority::{Session, SessionAuthority, WebhookOutcome, USER_UPGRADED};
pub use config::{AuthConfig, DEFAULT_ACCESS_TTL, DEFAULT_REFRESH_TTL};
pub use error::{AuthError, AuthResult};
pub use header::{api_key, bearer_token, API_KEY, BEARER};
pub use token::{Claims, TokenKind};
