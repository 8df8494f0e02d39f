//! Verify command implementation.

use chirpy_core::IntegrityReport;
use std::path::Path;

/// Runs the verify command.
///
/// Opening already rejects unreadable files and images that break the
/// schema; the integrity check then re-validates the loaded store.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying store at {}", path.display());
    println!();

    let db = super::open_existing(path)?;
    let counts = db.counts();
    println!(
        "Loaded {} chirps, {} users, {} tokens",
        counts.chirps,
        counts.users,
        counts.valid_tokens + counts.revoked_tokens
    );

    let report = db.check_integrity();
    print_report(&report);

    if report.is_ok() {
        Ok(())
    } else {
        Err(format!("{} integrity issue(s) found", report.issues.len()).into())
    }
}

fn print_report(report: &IntegrityReport) {
    if report.is_ok() {
        println!("✓ Store is consistent");
        return;
    }
    for issue in &report.issues {
        println!("  ✗ {issue}");
    }
}
