//! Create-user command implementation.

use std::path::Path;

/// Runs the create-user command.
pub fn run(path: &Path, email: &str, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::open_existing(path)?;
    let digest = db.hash_password(password.as_bytes())?;
    let user = db.add_user(email, digest)?;
    println!("Created user {} <{}>", user.id, user.email);
    Ok(())
}
