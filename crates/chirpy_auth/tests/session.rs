//! Session lifecycle against a real store.

use chirpy_auth::{
    api_key, bearer_token, ApiKey, AuthConfig, AuthError, SessionAuthority, WebhookOutcome,
    USER_UPGRADED,
};
use chirpy_core::{CoreError, Database};
use chirpy_testkit::{FastHasher, TestDatabase};
use std::path::Path;
use std::sync::Arc;

const SECRET: &str = "a-very-secret-jwt-key";
const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

fn memory_store() -> Arc<Database> {
    Arc::new(
        Database::open_in_memory()
            .unwrap()
            .with_hasher(Arc::new(FastHasher)),
    )
}

fn file_store(path: &Path) -> Arc<Database> {
    Arc::new(
        Database::open(path)
            .unwrap()
            .with_hasher(Arc::new(FastHasher)),
    )
}

fn authority(store: Arc<Database>) -> SessionAuthority {
    SessionAuthority::new(AuthConfig::new(SECRET), store).with_api_key(ApiKey::new(POLKA_KEY))
}

#[test]
fn login_refresh_logout() {
    let auth = authority(memory_store());
    let alice = auth
        .store()
        .add_user("alice@x.com", TestDatabase::digest("pw1"))
        .unwrap();
    assert_eq!(alice.id, 1);
    assert_eq!(alice.email, "alice@x.com");

    let session = auth.login("alice@x.com", b"pw1").unwrap();
    assert_eq!(session.user.id, 1);
    assert_eq!(auth.authenticate_access_token(&session.access_token).unwrap(), 1);
    assert_eq!(
        auth.authenticate_refresh_token(&session.refresh_token).unwrap(),
        1
    );

    let access = auth.refresh(&session.refresh_token).unwrap();
    assert_eq!(auth.authenticate_access_token(&access).unwrap(), 1);
    // Refreshing leaves the refresh token usable.
    assert!(auth.authenticate_refresh_token(&session.refresh_token).is_ok());

    auth.revoke_refresh_token(&session.refresh_token).unwrap();
    assert!(matches!(
        auth.authenticate_refresh_token(&session.refresh_token),
        Err(AuthError::Revoked)
    ));
    assert!(matches!(
        auth.refresh(&session.refresh_token),
        Err(AuthError::Revoked)
    ));

    // The access token is stateless and outlives the logout.
    assert_eq!(auth.authenticate_access_token(&access).unwrap(), 1);
}

#[test]
fn revocation_is_permanent() {
    let auth = authority(memory_store());
    let token = auth.issue_refresh_token(4).unwrap();

    auth.logout(&token).unwrap();
    for _ in 0..3 {
        assert!(matches!(
            auth.logout(&token),
            Err(AuthError::Store(CoreError::AlreadyRevoked))
        ));
        assert!(matches!(
            auth.authenticate_refresh_token(&token),
            Err(AuthError::Revoked)
        ));
    }
}

#[test]
fn revocation_survives_restart() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("database.json");

    let token = {
        let auth = authority(file_store(&path));
        let token = auth.issue_refresh_token(1).unwrap();
        auth.revoke_refresh_token(&token).unwrap();
        token
    };

    let auth = authority(file_store(&path));
    assert!(matches!(
        auth.authenticate_refresh_token(&token),
        Err(AuthError::Revoked)
    ));
}

#[test]
fn refresh_token_survives_restart() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("database.json");

    let token = authority(file_store(&path)).issue_refresh_token(2).unwrap();

    let auth = authority(file_store(&path));
    assert_eq!(auth.authenticate_refresh_token(&token).unwrap(), 2);
}

#[test]
fn bad_logins() {
    let auth = authority(memory_store());
    auth.store()
        .add_user("alice@x.com", TestDatabase::digest("pw1"))
        .unwrap();

    let wrong_password = auth.login("alice@x.com", b"nope").unwrap_err();
    assert!(matches!(
        wrong_password,
        AuthError::Store(CoreError::IncorrectPassword)
    ));
    assert!(wrong_password.is_authentication_failure());

    let wrong_email = auth.login("ALICE@x.com", b"pw1").unwrap_err();
    assert!(matches!(
        wrong_email,
        AuthError::Store(CoreError::InvalidEmail { .. })
    ));

    // Failed logins register no refresh tokens.
    assert_eq!(auth.store().counts().valid_tokens, 0);
}

#[test]
fn tokens_from_another_secret_are_rejected() {
    let store = memory_store();
    let ours = authority(Arc::clone(&store));
    let theirs = SessionAuthority::new(AuthConfig::new("other-secret"), Arc::clone(&store));

    let access = theirs.issue_access_token(1).unwrap();
    let refresh = theirs.issue_refresh_token(1).unwrap();

    assert!(matches!(
        ours.authenticate_access_token(&access),
        Err(AuthError::InvalidSignature)
    ));
    assert!(matches!(
        ours.authenticate_refresh_token(&refresh),
        Err(AuthError::InvalidSignature)
    ));
}

#[test]
fn garbage_tokens_are_authentication_failures() {
    let auth = authority(memory_store());
    for token in ["", "x", "a.b.c", "Bearer abc"] {
        let err = auth.authenticate_access_token(token).unwrap_err();
        assert!(err.is_authentication_failure(), "{token:?}: {err}");
        let err = auth.authenticate_refresh_token(token).unwrap_err();
        assert!(err.is_authentication_failure(), "{token:?}: {err}");
    }
}

#[test]
fn revoking_unknown_token() {
    let auth = authority(memory_store());
    assert!(matches!(
        auth.revoke_refresh_token("never-issued"),
        Err(AuthError::Store(CoreError::UnknownToken))
    ));
}

#[test]
fn webhook_upgrades_user() {
    let auth = authority(memory_store());
    let user = auth.store().add_user("bob@x.com", Vec::new()).unwrap();

    assert!(matches!(
        auth.upgrade_user("wrong", USER_UPGRADED, user.id),
        Err(AuthError::InvalidApiKey)
    ));
    assert!(!auth.store().get_user(user.id).unwrap().premium);

    assert_eq!(
        auth.upgrade_user(POLKA_KEY, "user.payment_failed", user.id)
            .unwrap(),
        WebhookOutcome::Ignored
    );
    assert!(!auth.store().get_user(user.id).unwrap().premium);

    assert_eq!(
        auth.upgrade_user(POLKA_KEY, USER_UPGRADED, user.id).unwrap(),
        WebhookOutcome::Upgraded
    );
    assert!(auth.store().get_user(user.id).unwrap().premium);

    assert!(matches!(
        auth.upgrade_user(POLKA_KEY, USER_UPGRADED, 404),
        Err(AuthError::Store(CoreError::InvalidUserId { id: 404 }))
    ));
}

#[test]
fn credentials_from_headers() {
    let auth = authority(memory_store());
    let token = auth.issue_access_token(5).unwrap();
    let header = format!("Bearer {token}");

    let presented = bearer_token(Some(&header)).unwrap();
    assert_eq!(auth.authenticate_access_token(presented).unwrap(), 5);

    let key = api_key(Some("ApiKey f271c81ff7084ee5b99a5091b42d486e")).unwrap();
    assert_eq!(key, POLKA_KEY);

    assert!(matches!(
        bearer_token(Some("Bearer")),
        Err(AuthError::MissingCredentials { .. })
    ));
}
