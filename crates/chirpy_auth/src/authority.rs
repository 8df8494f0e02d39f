//! The session authority.

use crate::api_key::ApiKey;
use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::token::{self, Claims, TokenKind};
use chirpy_core::{Database, User};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Webhook event that grants premium status.
pub const USER_UPGRADED: &str = "user.upgraded";

/// What a successful login hands back.
#[derive(Debug, Clone)]
pub struct Session {
    /// The authenticated user.
    pub user: User,
    /// Stateless token for authenticated requests.
    pub access_token: String,
    /// Registered token for obtaining new access tokens.
    pub refresh_token: String,
}

/// Outcome of a webhook call that passed the key check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The user is now premium.
    Upgraded,
    /// The event is not one we act on.
    Ignored,
}

/// Issues and checks session credentials.
///
/// Access tokens are checked by signature, issuer and expiry alone and
/// never touch the store. Refresh tokens must also be registered in the
/// store and not revoked.
///
/// ```text
/// LoggedOut --login--> Authenticated(access, refresh)
///   --refresh--> Authenticated(access', refresh)
///   --logout--> LoggedOut
/// ```
#[derive(Debug)]
pub struct SessionAuthority {
    config: AuthConfig,
    store: Arc<Database>,
    api_key: Option<ApiKey>,
}

impl SessionAuthority {
    /// Creates an authority signing with `config` and tracking refresh
    /// tokens in `store`.
    pub fn new(config: AuthConfig, store: Arc<Database>) -> Self {
        Self {
            config,
            store,
            api_key: None,
        }
    }

    /// Sets the key webhook callers must present.
    #[must_use]
    pub fn with_api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Returns the store this authority works against.
    pub fn store(&self) -> &Arc<Database> {
        &self.store
    }

    fn now() -> i64 {
        Utc::now().timestamp()
    }

    /// Issues a short-lived access token for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `Encoding` if the token cannot be built.
    pub fn issue_access_token(&self, user_id: u64) -> AuthResult<String> {
        let claims = Claims::new(TokenKind::Access, user_id, Self::now(), self.config.access_ttl());
        token::sign(&claims, self.config.secret())
    }

    /// Issues a long-lived refresh token for `user_id` and registers it.
    ///
    /// # Errors
    ///
    /// Returns `Encoding` if the token cannot be built, or a store error if
    /// registering it fails.
    pub fn issue_refresh_token(&self, user_id: u64) -> AuthResult<String> {
        let claims = Claims::new(
            TokenKind::Refresh,
            user_id,
            Self::now(),
            self.config.refresh_ttl(),
        )
        .with_id(Uuid::new_v4().to_string());
        let token = token::sign(&claims, self.config.secret())?;
        self.store.add_token(&token)?;
        debug!(user_id, "issued refresh token");
        Ok(token)
    }

    /// Checks an access token and returns its user id.
    ///
    /// # Errors
    ///
    /// Returns a token error if the token is malformed, badly signed, not
    /// an access token, expired, or has an unusable subject.
    pub fn authenticate_access_token(&self, presented: &str) -> AuthResult<u64> {
        let claims = token::verify(presented, self.config.secret())?;
        claims.validate(TokenKind::Access, Self::now())
    }

    /// Checks a refresh token against its signature and the store.
    ///
    /// # Errors
    ///
    /// As [`authenticate_access_token`](Self::authenticate_access_token)
    /// for the refresh kind, plus `Unregistered` if the store has no record
    /// of the token and `Revoked` if it was revoked.
    pub fn authenticate_refresh_token(&self, presented: &str) -> AuthResult<u64> {
        let claims = token::verify(presented, self.config.secret())?;
        let user_id = claims.validate(TokenKind::Refresh, Self::now())?;
        match self.store.token_status(presented) {
            None => Err(AuthError::Unregistered),
            Some(record) if record.is_revoked() => Err(AuthError::Revoked),
            Some(_) => Ok(user_id),
        }
    }

    /// Revokes a refresh token.
    ///
    /// # Errors
    ///
    /// Returns the store's `UnknownToken` or `AlreadyRevoked`, or an error
    /// if the persist fails.
    pub fn revoke_refresh_token(&self, presented: &str) -> AuthResult<()> {
        self.store.revoke_token(presented)?;
        Ok(())
    }

    /// Authenticates a user and opens a session.
    ///
    /// # Errors
    ///
    /// Returns the store's `InvalidEmail` or `IncorrectPassword`, or any
    /// error from issuing the tokens.
    pub fn login(&self, email: &str, password: &[u8]) -> AuthResult<Session> {
        let user = self.store.authenticate_user(email, password)?;
        let access_token = self.issue_access_token(user.id)?;
        let refresh_token = self.issue_refresh_token(user.id)?;
        debug!(user_id = user.id, "login");
        Ok(Session {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Trades a valid refresh token for a new access token.
    ///
    /// The refresh token itself stays as it is.
    ///
    /// # Errors
    ///
    /// As [`authenticate_refresh_token`](Self::authenticate_refresh_token).
    pub fn refresh(&self, refresh_token: &str) -> AuthResult<String> {
        let user_id = self.authenticate_refresh_token(refresh_token)?;
        self.issue_access_token(user_id)
    }

    /// Ends a session by revoking its refresh token.
    ///
    /// # Errors
    ///
    /// As [`revoke_refresh_token`](Self::revoke_refresh_token).
    pub fn logout(&self, refresh_token: &str) -> AuthResult<()> {
        self.revoke_refresh_token(refresh_token)
    }

    /// Handles a payment-provider webhook.
    ///
    /// The key is checked first; a `user.upgraded` event then sets the
    /// premium flag, and any other event is accepted without effect.
    ///
    /// # Errors
    ///
    /// Returns `InvalidApiKey` if no key is configured or `presented_key`
    /// does not match, and the store's `InvalidUserId` for an unknown user.
    pub fn upgrade_user(
        &self,
        presented_key: &str,
        event: &str,
        user_id: u64,
    ) -> AuthResult<WebhookOutcome> {
        let authorized = self
            .api_key
            .as_ref()
            .is_some_and(|key| key.matches(presented_key));
        if !authorized {
            return Err(AuthError::InvalidApiKey);
        }
        if event != USER_UPGRADED {
            debug!(event, "ignored webhook event");
            return Ok(WebhookOutcome::Ignored);
        }
        self.store.set_premium(user_id)?;
        debug!(user_id, "upgraded user");
        Ok(WebhookOutcome::Upgraded)
    }
}
