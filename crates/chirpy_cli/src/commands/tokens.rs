//! Token commands.

use chirpy_auth::{AuthConfig, SessionAuthority};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Logs in and prints a fresh access and refresh token.
pub fn issue(
    path: &Path,
    email: &str,
    password: &str,
    jwt_secret: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if jwt_secret.is_empty() {
        return Err("JWT_SECRET must not be empty".into());
    }
    info!("Issuing tokens for {} from {:?}", email, path);
    let db = Arc::new(super::open_existing(path)?);
    let auth = SessionAuthority::new(AuthConfig::new(jwt_secret), db);
    let session = auth.login(email, password.as_bytes())?;

    println!("user:          {}", session.user.id);
    println!("access_token:  {}", session.access_token);
    println!("refresh_token: {}", session.refresh_token);
    Ok(())
}

/// Revokes a refresh token.
pub fn revoke(path: &Path, token: &str) -> Result<(), Box<dyn std::error::Error>> {
    info!("Revoking refresh token in {:?}", path);
    let db = super::open_existing(path)?;
    db.revoke_token(token)?;
    println!("Token revoked");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chirpy_core::{CoreError, Database};
    use tempfile::tempdir;

    #[test]
    fn revoke_twice() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("db.json");
        {
            let db = Database::open(&path).unwrap();
            db.add_token("tok").unwrap();
        }

        revoke(&path, "tok").unwrap();
        let err = revoke(&path, "tok").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::AlreadyRevoked)
        ));
    }

    #[test]
    fn issue_requires_secret() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("db.json");
        drop(Database::open(&path).unwrap());
        assert!(issue(&path, "a@x.com", "pw", "").is_err());
    }
}
