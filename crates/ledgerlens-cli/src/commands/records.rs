//! Record listing command

use anyhow::Result;
use ledgerlens_core::db::{Database, RecordQuery};
use ledgerlens_core::models::RecordType;

use super::{money, require_dataset, resolve_window, truncate};
use crate::cli::DateWindow;

pub fn cmd_records(
    db: &Database,
    user: &str,
    dataset_id: i64,
    record_type: Option<&str>,
    category: Option<String>,
    window: &DateWindow,
    limit: i64,
) -> Result<usize> {
    let dataset = require_dataset(db, user, dataset_id)?;
    let (from, to) = resolve_window(window)?;
    let record_type = record_type
        .map(|t| t.parse::<RecordType>())
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;

    let query = RecordQuery::new(dataset.id)
        .record_type(record_type)
        .window(from, to)
        .category(category);
    let total = db.count_matching_records(&query)?;
    let records = db.fetch_records(&query.limit(Some(limit)))?;

    if records.is_empty() {
        println!("No records match. Import some with:");
        println!("  ledgerlens import --dataset {} --file data.csv", dataset.id);
        return Ok(0);
    }

    println!();
    println!("📝 Records in '{}' ({} of {})", dataset.name, records.len(), total);
    println!("   ─────────────────────────────────────────────────────────────");

    for record in &records {
        let amount = match record.record_type {
            RecordType::Expense => format!("\x1b[31m-{}\x1b[0m", money(record.amount)), // Red
            RecordType::Revenue => format!("\x1b[32m+{}\x1b[0m", money(record.amount)), // Green
            _ => money(record.amount),
        };

        println!(
            "   {} │ {:<9} │ {:<16} │ {:>14} │ {}",
            record.day(),
            record.record_type.as_str(),
            truncate(record.category_label(), 16),
            amount,
            truncate(record.description.as_deref().unwrap_or_default(), 30)
        );
    }

    Ok(records.len())
}
