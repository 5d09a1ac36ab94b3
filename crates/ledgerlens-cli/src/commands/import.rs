//! Import command implementation

use std::path::Path;

use anyhow::{Context, Result};
use ledgerlens_core::{
    db::Database,
    import::{parse_file, ImportFormat},
    models::{BulkInsertReport, DatasetUpdate},
};

use super::require_dataset;

/// Number of per-row errors echoed after an import
const SHOWN_ERRORS: usize = 5;

pub fn cmd_import(
    db: &Database,
    user: &str,
    dataset_id: i64,
    file: &Path,
) -> Result<BulkInsertReport> {
    let dataset = require_dataset(db, user, dataset_id)?;

    println!("📥 Importing {} into '{}'...", file.display(), dataset.name);

    let format = ImportFormat::from_file_name(file).with_context(|| {
        format!(
            "Unsupported file type: {} (expected .csv, .xlsx or .xls)",
            file.display()
        )
    })?;
    let bytes =
        std::fs::read(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
    let records = parse_file(format, &bytes, dataset.id)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    println!("   Found {} records", records.len());

    let report = db.insert_records_bulk(dataset.id, &records)?;

    if dataset.file_path.is_none() {
        db.update_dataset(
            dataset.id,
            user,
            &DatasetUpdate {
                file_path: Some(file.display().to_string()),
                ..Default::default()
            },
        )?;
    }

    db.log_audit(
        user,
        "import",
        Some("dataset"),
        Some(dataset.id),
        Some(&format!(
            "file={} inserted={} duplicates={} failed={}",
            file.display(),
            report.successful_records,
            report.duplicate_records,
            report.failed_records
        )),
    )?;

    println!("✅ Import complete!");
    println!("   Imported: {}", report.successful_records);
    println!("   Skipped (duplicates): {}", report.duplicate_records);
    if report.failed_records > 0 {
        println!("   ⚠️  Failed: {}", report.failed_records);
        for error in report.errors.iter().take(SHOWN_ERRORS) {
            println!("      row {}: {}", error.index + 1, error.error);
        }
    }

    Ok(report)
}
