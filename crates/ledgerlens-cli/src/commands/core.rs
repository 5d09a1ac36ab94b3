//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database
//! - `resolve_window` - Parse --from/--to into dates
//! - `require_dataset` - Look up one of the user's datasets

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use ledgerlens_core::{db::Database, models::Dataset};

use crate::cli::DateWindow;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Create a dataset: ledgerlens datasets create \"Q1 books\"");
    println!("  2. Import records:   ledgerlens import --dataset 1 --file q1.csv");
    println!("  3. Start web API:    ledgerlens serve");

    Ok(())
}

/// Parse the optional --from/--to pair
pub fn resolve_window(window: &DateWindow) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
    let from = window
        .from
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("Invalid --from date format (use YYYY-MM-DD)")?;
    let to = window
        .to
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("Invalid --to date format (use YYYY-MM-DD)")?;

    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            anyhow::bail!("--from ({}) is after --to ({})", from, to);
        }
    }

    Ok((from, to))
}

/// Fetch a dataset owned by `user`, failing with a readable message otherwise
pub fn require_dataset(db: &Database, user: &str, dataset_id: i64) -> Result<Dataset> {
    db.get_dataset(dataset_id, user)?.with_context(|| {
        format!(
            "Dataset {} not found. List yours with: ledgerlens datasets",
            dataset_id
        )
    })
}
