//! Upgrade command implementation.

use chirpy_auth::{ApiKey, AuthConfig, SessionAuthority, WebhookOutcome};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Delivers a webhook event as the payment provider would.
pub fn run(
    path: &Path,
    user_id: u64,
    presented_key: &str,
    event: &str,
    polka_key: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Delivering {:?} for user {} to {:?}", event, user_id, path);
    let db = Arc::new(super::open_existing(path)?);
    // The webhook path never signs tokens, so no signing secret is needed.
    let auth = SessionAuthority::new(AuthConfig::new(Vec::new()), db)
        .with_api_key(ApiKey::new(polka_key));

    match auth.upgrade_user(presented_key, event, user_id)? {
        WebhookOutcome::Upgraded => println!("User {user_id} upgraded to Chirpy Red"),
        WebhookOutcome::Ignored => println!("Event {event:?} ignored"),
    }
    Ok(())
}
