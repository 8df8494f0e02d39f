//! Session authority configuration.

use std::fmt;
use std::time::Duration;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Default access token lifetime: one hour.
pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(60 * 60);

/// Default refresh token lifetime: 60 days.
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(1440 * 60 * 60);

/// Signing secret and token lifetimes.
///
/// The secret is wiped from memory when the config is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AuthConfig {
    secret: Vec<u8>,
    #[zeroize(skip)]
    access_ttl: Duration,
    #[zeroize(skip)]
    refresh_ttl: Duration,
}

impl AuthConfig {
    /// Creates a configuration with default lifetimes.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl: DEFAULT_ACCESS_TTL,
            refresh_ttl: DEFAULT_REFRESH_TTL,
        }
    }

    /// Sets the access token lifetime.
    #[must_use]
    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    /// Sets the refresh token lifetime.
    #[must_use]
    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    pub(crate) fn secret(&self) -> &[u8] {
        &self.secret
    }

    /// Returns the access token lifetime.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Returns the refresh token lifetime.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"[REDACTED]")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}
