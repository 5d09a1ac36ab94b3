//! Dataset command implementations

use anyhow::Result;
use ledgerlens_core::db::Database;
use ledgerlens_core::models::NewDataset;

use super::truncate;

pub fn cmd_datasets_list(db: &Database, user: &str, skip: i64, limit: i64) -> Result<()> {
    let datasets = db.list_datasets(user, skip, limit)?;

    if datasets.is_empty() {
        println!("No datasets found. Create one with:");
        println!("  ledgerlens datasets create \"Q1 books\"");
        return Ok(());
    }

    println!();
    println!("📚 Datasets");
    println!("   ─────────────────────────────────────────────────────────────");

    for dataset in datasets {
        let records = db.count_records(dataset.id)?;
        println!(
            "   {:>4} │ {:<30} │ {:>6} records │ {}",
            dataset.id,
            truncate(&dataset.name, 30),
            records,
            dataset.created_at.format("%Y-%m-%d")
        );
    }

    Ok(())
}

pub fn cmd_datasets_create(
    db: &Database,
    user: &str,
    name: &str,
    description: Option<String>,
) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Dataset name cannot be empty");
    }

    let dataset = db.create_dataset(
        user,
        &NewDataset {
            name: name.to_string(),
            description,
            file_path: None,
        },
    )?;
    db.log_audit(user, "create", Some("dataset"), Some(dataset.id), Some(name))?;

    println!("✅ Created dataset {} ({})", dataset.id, dataset.name);
    println!("   Import records: ledgerlens import --dataset {} --file data.csv", dataset.id);

    Ok(dataset.id)
}

pub fn cmd_datasets_delete(db: &Database, user: &str, id: i64) -> Result<()> {
    if !db.delete_dataset(id, user)? {
        anyhow::bail!("Dataset {} not found", id);
    }
    db.log_audit(user, "delete", Some("dataset"), Some(id), None)?;

    println!("🗑️  Deleted dataset {} with its records and analyses", id);
    Ok(())
}
