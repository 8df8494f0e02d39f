//! Shared-secret API keys for webhook callers.

use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A configured API key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ApiKey {
    key: String,
}

impl ApiKey {
    /// Wraps a key.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Returns true if `presented` equals the key.
    ///
    /// The comparison takes the same time wherever the first difference is.
    /// An empty configured key matches nothing.
    #[must_use]
    pub fn matches(&self, presented: &str) -> bool {
        !self.key.is_empty() && bool::from(self.key.as_bytes().ct_eq(presented.as_bytes()))
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey([REDACTED])")
    }
}
