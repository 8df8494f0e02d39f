//! Inspect command implementation.

use chirpy_core::Database;
use serde::Serialize;
use std::path::Path;

/// Store inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Store path.
    pub path: String,
    /// Store file size in bytes.
    pub file_size: u64,
    /// Number of chirps.
    pub chirps: usize,
    /// Number of distinct chirp authors.
    pub authors: usize,
    /// Number of users.
    pub users: usize,
    /// Users with premium status.
    pub premium_users: usize,
    /// Refresh tokens still valid.
    pub valid_tokens: usize,
    /// Refresh tokens revoked.
    pub revoked_tokens: usize,
    /// Highest chirp id in use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_chirp_id: Option<u64>,
    /// Highest user id in use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_user_id: Option<u64>,
}

/// Gathers inspection data from an open store.
pub fn inspect(db: &Database, path: &Path) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let counts = db.counts();
    let image = db.snapshot();
    let mut authors: Vec<u64> = image.chirps.values().map(|c| c.author_id).collect();
    authors.sort_unstable();
    authors.dedup();

    Ok(InspectResult {
        path: path.display().to_string(),
        file_size: std::fs::metadata(path)?.len(),
        chirps: counts.chirps,
        authors: authors.len(),
        users: counts.users,
        premium_users: counts.premium_users,
        valid_tokens: counts.valid_tokens,
        revoked_tokens: counts.revoked_tokens,
        max_chirp_id: image.chirps.keys().next_back().copied(),
        max_user_id: image.users.keys().next_back().copied(),
    })
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::open_existing(path)?;
    let result = inspect(&db, path)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("Chirpy Store: {}", result.path);
    println!("  File size:      {} bytes", result.file_size);
    println!();
    println!("Chirps:           {}", result.chirps);
    println!("  Authors:        {}", result.authors);
    if let Some(max) = result.max_chirp_id {
        println!("  Highest id:     {max}");
    }
    println!("Users:            {}", result.users);
    println!("  Chirpy Red:     {}", result.premium_users);
    if let Some(max) = result.max_user_id {
        println!("  Highest id:     {max}");
    }
    println!("Refresh tokens:   {}", result.valid_tokens + result.revoked_tokens);
    println!("  Valid:          {}", result.valid_tokens);
    println!("  Revoked:        {}", result.revoked_tokens);
}
