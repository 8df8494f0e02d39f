//! Init command implementation.

use chirpy_core::Database;
use std::path::Path;
use tracing::info;

/// Runs the init command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Initializing store at {:?}", path);
    let existed = path.exists();
    let db = Database::open(path)?;
    if existed {
        println!("Store already exists at {}", db.location());
    } else {
        println!("Initialized empty store at {}", db.location());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_store_and_directories() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("database").join("database.json");

        run(&path).unwrap();
        assert!(path.exists());

        // Idempotent.
        run(&path).unwrap();
        assert_eq!(
            std::fs::read(&path).unwrap(),
            br#"{"chirps":{},"users":{},"tokens":{}}"#
        );
    }
}
