//! CLI command implementations.

pub mod init;
pub mod inspect;
pub mod tokens;
pub mod upgrade;
pub mod user;
pub mod verify;

use chirpy_core::{Config, Database};
use std::path::Path;

/// Opens an existing store; commands other than `init` never create one.
pub(crate) fn open_existing(path: &Path) -> Result<Database, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No store found at {}", path.display()).into());
    }
    Ok(Database::open_with_config(
        path,
        Config::default().create_if_missing(false),
    )?)
}
