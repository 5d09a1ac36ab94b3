//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{
        AnalysisKind, AnalysisMetrics, AnalysisResult, NarrativeStatus, NewAnalysis,
    };
    use chrono::NaiveDate;

    const OWNER: &str = "alice@example.com";
    const OTHER: &str = "mallory@example.com";

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn new_dataset(name: &str) -> NewDataset {
        NewDataset {
            name: name.to_string(),
            description: Some(format!("{} description", name)),
            file_path: None,
        }
    }

    fn new_record(day: &str, record_type: RecordType, amount: f64, category: &str) -> NewRecord {
        NewRecord {
            date: date(day).and_hms_opt(0, 0, 0).unwrap(),
            category: if category.is_empty() {
                None
            } else {
                Some(category.to_string())
            },
            amount,
            description: None,
            record_type,
            import_hash: None,
        }
    }

    /// Dataset holding 2024-01-01 rev 1000 / exp 400 and 2024-01-02 rev 500
    fn seeded() -> (Database, i64) {
        let db = Database::in_memory().unwrap();
        let dataset = db.create_dataset(OWNER, &new_dataset("Books")).unwrap();
        let records = [
            new_record("2024-01-01", RecordType::Revenue, 1000.0, "Sales"),
            new_record("2024-01-01", RecordType::Expense, 400.0, "Rent"),
            new_record("2024-01-02", RecordType::Revenue, 500.0, "Sales"),
        ];
        for record in &records {
            db.insert_record(dataset.id, record).unwrap();
        }
        (db, dataset.id)
    }

    fn custom_result(prompt: &str) -> AnalysisResult {
        AnalysisResult {
            kind: AnalysisKind::Custom,
            summary: DataSummary::empty(),
            metrics: AnalysisMetrics::Custom {
                custom_prompt: prompt.to_string(),
            },
            insights: None,
            narrative_status: NarrativeStatus::Unavailable,
            narrative_error: Some("No narrative backend configured".to_string()),
            model: None,
            context_records: 0,
        }
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert!(db.list_datasets(OWNER, 0, 100).unwrap().is_empty());
    }

    #[test]
    fn test_schema_exists() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        let columns: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('financial_records') WHERE name IN ('id', 'dataset_id', 'date', 'category', 'amount', 'description', 'record_type', 'import_hash')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(columns, 8, "financial_records should have 8 expected columns");

        let foreign_keys: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(foreign_keys, 1);
    }

    #[test]
    fn test_file_database_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.db");
        let path = path.to_str().unwrap();

        let id = {
            let db = Database::new_unencrypted(path).unwrap();
            db.create_dataset(OWNER, &new_dataset("Persisted")).unwrap().id
        };

        let db = Database::new_unencrypted(path).unwrap();
        assert_eq!(db.path(), path);
        let dataset = db.get_dataset(id, OWNER).unwrap().unwrap();
        assert_eq!(dataset.name, "Persisted");
    }

    #[test]
    fn test_dataset_crud() {
        let db = Database::in_memory().unwrap();

        let created = db.create_dataset(OWNER, &new_dataset("Q1")).unwrap();
        assert!(created.id > 0);
        assert_eq!(created.owner, OWNER);
        assert_eq!(created.description.as_deref(), Some("Q1 description"));

        let fetched = db.get_dataset(created.id, OWNER).unwrap().unwrap();
        assert_eq!(fetched.name, "Q1");

        let updated = db
            .update_dataset(
                created.id,
                OWNER,
                &DatasetUpdate {
                    name: Some("Q1 2024".to_string()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Q1 2024");
        // Absent fields are untouched
        assert_eq!(updated.description.as_deref(), Some("Q1 description"));

        assert!(db.delete_dataset(created.id, OWNER).unwrap());
        assert!(db.get_dataset(created.id, OWNER).unwrap().is_none());
        assert!(!db.delete_dataset(created.id, OWNER).unwrap());
    }

    #[test]
    fn test_list_datasets_newest_first_with_paging() {
        let db = Database::in_memory().unwrap();
        for name in ["first", "second", "third"] {
            db.create_dataset(OWNER, &new_dataset(name)).unwrap();
        }
        db.create_dataset(OTHER, &new_dataset("not mine")).unwrap();

        let all = db.list_datasets(OWNER, 0, 100).unwrap();
        let names: Vec<_> = all.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["third", "second", "first"]);

        let page = db.list_datasets(OWNER, 1, 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "second");
    }

    #[test]
    fn test_dataset_ownership_enforced() {
        let db = Database::in_memory().unwrap();
        let dataset = db.create_dataset(OWNER, &new_dataset("Private")).unwrap();

        assert!(db.get_dataset(dataset.id, OTHER).unwrap().is_none());
        assert!(db
            .update_dataset(dataset.id, OTHER, &DatasetUpdate::default())
            .unwrap()
            .is_none());
        assert!(!db.delete_dataset(dataset.id, OTHER).unwrap());

        // Still intact for the owner
        assert!(db.get_dataset(dataset.id, OWNER).unwrap().is_some());
    }

    #[test]
    fn test_insert_record_stores_magnitude() {
        let db = Database::in_memory().unwrap();
        let dataset = db.create_dataset(OWNER, &new_dataset("Signs")).unwrap();

        db.insert_record(
            dataset.id,
            &new_record("2024-02-01", RecordType::Expense, -42.5, "Fuel"),
        )
        .unwrap();

        let records = db.fetch_records(&RecordQuery::new(dataset.id)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, 42.5);
        assert_eq!(records[0].record_type, RecordType::Expense);
        assert_eq!(records[0].category.as_deref(), Some("Fuel"));
    }

    #[test]
    fn test_insert_record_rejects_non_finite() {
        let db = Database::in_memory().unwrap();
        let dataset = db.create_dataset(OWNER, &new_dataset("Bad")).unwrap();

        let err = db
            .insert_record(
                dataset.id,
                &new_record("2024-02-01", RecordType::Revenue, f64::NAN, "Sales"),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
        assert_eq!(db.count_records(dataset.id).unwrap(), 0);
    }

    #[test]
    fn test_duplicate_import_hash_skipped() {
        let db = Database::in_memory().unwrap();
        let dataset = db.create_dataset(OWNER, &new_dataset("Dedup")).unwrap();

        let mut record = new_record("2024-02-01", RecordType::Revenue, 10.0, "Sales");
        record.import_hash = Some("abc123".to_string());

        assert!(db.insert_record(dataset.id, &record).unwrap().is_some());
        assert!(db.insert_record(dataset.id, &record).unwrap().is_none());
        assert_eq!(db.count_records(dataset.id).unwrap(), 1);

        // Manual entries carry no hash and are never deduplicated
        let manual = new_record("2024-02-01", RecordType::Revenue, 10.0, "Sales");
        assert!(db.insert_record(dataset.id, &manual).unwrap().is_some());
        assert!(db.insert_record(dataset.id, &manual).unwrap().is_some());
        assert_eq!(db.count_records(dataset.id).unwrap(), 3);
    }

    #[test]
    fn test_bulk_insert_report() {
        let db = Database::in_memory().unwrap();
        let dataset = db.create_dataset(OWNER, &new_dataset("Bulk")).unwrap();

        let mut hashed = new_record("2024-02-01", RecordType::Revenue, 10.0, "Sales");
        hashed.import_hash = Some("same".to_string());

        let batch = vec![
            hashed.clone(),
            hashed,
            new_record("2024-02-02", RecordType::Expense, f64::INFINITY, "Rent"),
            new_record("2024-02-03", RecordType::Asset, 900.0, "Equipment"),
        ];

        let report = db.insert_records_bulk(dataset.id, &batch).unwrap();
        assert_eq!(report.total_records, 4);
        assert_eq!(report.successful_records, 2);
        assert_eq!(report.duplicate_records, 1);
        assert_eq!(report.failed_records, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].index, 2);
        assert_eq!(db.count_records(dataset.id).unwrap(), 2);
    }

    #[test]
    fn test_insert_into_missing_dataset_fails() {
        let db = Database::in_memory().unwrap();
        let result = db.insert_record(
            999,
            &new_record("2024-02-01", RecordType::Revenue, 10.0, "Sales"),
        );
        assert!(matches!(result, Err(Error::Database(_))));
    }

    #[test]
    fn test_fetch_records_newest_first() {
        let (db, dataset_id) = seeded();
        let records = db.fetch_records(&RecordQuery::new(dataset_id)).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].day(), date("2024-01-02"));
        // Same day: later insert first
        assert_eq!(records[1].record_type, RecordType::Expense);
        assert_eq!(records[2].amount, 1000.0);
    }

    #[test]
    fn test_fetch_records_rejects_corrupt_date() {
        let (db, dataset_id) = seeded();
        db.conn()
            .unwrap()
            .execute(
                "UPDATE financial_records SET date = 'someday' WHERE amount = 500.0",
                [],
            )
            .unwrap();

        let result = db.fetch_records(&RecordQuery::new(dataset_id));
        assert!(matches!(
            result,
            Err(Error::Database(rusqlite::Error::FromSqlConversionFailure(2, _, _)))
        ));
    }

    #[test]
    fn test_fetch_records_filters() {
        let (db, dataset_id) = seeded();

        let revenue = db
            .fetch_records(&RecordQuery::new(dataset_id).record_type(Some(RecordType::Revenue)))
            .unwrap();
        assert_eq!(revenue.len(), 2);

        let rent = db
            .fetch_records(&RecordQuery::new(dataset_id).category(Some("Rent".to_string())))
            .unwrap();
        assert_eq!(rent.len(), 1);

        // Case sensitive
        let lower = db
            .fetch_records(&RecordQuery::new(dataset_id).category(Some("rent".to_string())))
            .unwrap();
        assert!(lower.is_empty());

        let day_two = db
            .fetch_records(
                &RecordQuery::new(dataset_id).window(Some(date("2024-01-02")), None),
            )
            .unwrap();
        assert_eq!(day_two.len(), 1);

        let inclusive = db
            .fetch_records(&RecordQuery::new(dataset_id).window(
                Some(date("2024-01-01")),
                Some(date("2024-01-01")),
            ))
            .unwrap();
        assert_eq!(inclusive.len(), 2);
    }

    #[test]
    fn test_window_compares_calendar_day() {
        let db = Database::in_memory().unwrap();
        let dataset = db.create_dataset(OWNER, &new_dataset("Times")).unwrap();

        let mut late = new_record("2024-03-31", RecordType::Revenue, 5.0, "Sales");
        late.date = date("2024-03-31").and_hms_opt(23, 59, 0).unwrap();
        db.insert_record(dataset.id, &late).unwrap();

        let query = RecordQuery::new(dataset.id).window(None, Some(date("2024-03-31")));
        assert_eq!(db.count_matching_records(&query).unwrap(), 1);
        assert_eq!(db.fetch_records(&query).unwrap()[0].date, late.date);
    }

    #[test]
    fn test_fetch_records_pagination() {
        let (db, dataset_id) = seeded();

        let page = db
            .fetch_records(&RecordQuery::new(dataset_id).limit(Some(2)))
            .unwrap();
        assert_eq!(page.len(), 2);

        let rest = db
            .fetch_records(&RecordQuery::new(dataset_id).limit(Some(2)).offset(2))
            .unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].amount, 1000.0);

        let skipped = db
            .fetch_records(&RecordQuery::new(dataset_id).offset(1))
            .unwrap();
        assert_eq!(skipped.len(), 2);

        // Count ignores pagination
        let query = RecordQuery::new(dataset_id).limit(Some(1));
        assert_eq!(db.count_matching_records(&query).unwrap(), 3);
    }

    #[test]
    fn test_records_isolated_per_dataset() {
        let (db, dataset_id) = seeded();
        let other = db.create_dataset(OWNER, &new_dataset("Other")).unwrap();
        db.insert_record(
            other.id,
            &new_record("2024-01-01", RecordType::Revenue, 1.0, "Sales"),
        )
        .unwrap();

        assert_eq!(db.count_records(dataset_id).unwrap(), 3);
        assert_eq!(db.count_records(other.id).unwrap(), 1);
    }

    #[test]
    fn test_data_summary_report() {
        let (db, dataset_id) = seeded();
        let summary = db.data_summary(dataset_id, None, None).unwrap();

        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.revenue_transactions, 2);
        assert_eq!(summary.expense_transactions, 1);
        assert_eq!(summary.total_revenue, 1500.0);
        assert_eq!(summary.total_expenses, 400.0);
        assert_eq!(summary.net_profit, 1100.0);
        assert!((summary.profit_margin - 73.333_333).abs() < 1e-4);
        assert_eq!(
            summary.date_range_start.map(|d| d.date()),
            Some(date("2024-01-01"))
        );
        assert_eq!(
            summary.date_range_end.map(|d| d.date()),
            Some(date("2024-01-02"))
        );
    }

    #[test]
    fn test_data_summary_empty_dataset() {
        let db = Database::in_memory().unwrap();
        let dataset = db.create_dataset(OWNER, &new_dataset("Empty")).unwrap();
        let summary = db.data_summary(dataset.id, None, None).unwrap();
        assert_eq!(summary, DataSummary::empty());
    }

    #[test]
    fn test_revenue_and_expense_reports() {
        let (db, dataset_id) = seeded();

        let revenue = db.revenue_analysis(dataset_id, None, None).unwrap();
        assert_eq!(revenue.revenue_by_category.len(), 1);
        assert_eq!(revenue.revenue_by_category[0].category, "Sales");
        assert_eq!(revenue.revenue_by_category[0].total, 1500.0);
        assert_eq!(revenue.revenue_by_category[0].count, 2);
        assert_eq!(revenue.revenue_trends.len(), 2);
        assert_eq!(revenue.revenue_trends[0].date, date("2024-01-01"));

        let expenses = db
            .expense_analysis(dataset_id, Some(date("2024-01-02")), None)
            .unwrap();
        assert!(expenses.expenses_by_category.is_empty());
        assert!(expenses.expense_trends.is_empty());
        assert_eq!(expenses.date_from, Some(date("2024-01-02")));
    }

    #[test]
    fn test_profit_report_worked_example() {
        let (db, dataset_id) = seeded();
        let profit = db.profit_analysis(dataset_id, None, None).unwrap();

        assert_eq!(profit.profit_trends.len(), 2);
        let first = &profit.profit_trends[0];
        assert_eq!(first.date, date("2024-01-01"));
        assert_eq!(
            (first.revenue, first.expense, first.profit, first.margin),
            (1000.0, 400.0, 600.0, 60.0)
        );
        let second = &profit.profit_trends[1];
        assert_eq!(
            (second.revenue, second.expense, second.profit, second.margin),
            (500.0, 0.0, 500.0, 100.0)
        );

        let summary = db.data_summary(dataset_id, None, None).unwrap();
        assert_eq!(profit.summary.total_revenue, summary.total_revenue);
        assert_eq!(profit.summary.total_expenses, summary.total_expenses);
        assert_eq!(profit.summary.net_profit, summary.net_profit);
    }

    #[test]
    fn test_analysis_history() {
        let (db, dataset_id) = seeded();

        let first = db
            .save_analysis(&NewAnalysis {
                dataset_id,
                owner: OWNER.to_string(),
                kind: AnalysisKind::Custom,
                result: custom_result("Top category?"),
                prompt: Some("Top category?".to_string()),
            })
            .unwrap();
        let second = db
            .save_analysis(&NewAnalysis {
                dataset_id,
                owner: OWNER.to_string(),
                kind: AnalysisKind::Custom,
                result: custom_result("Cash runway?"),
                prompt: Some("Cash runway?".to_string()),
            })
            .unwrap();

        let stored = db.get_analysis(first, OWNER).unwrap().unwrap();
        assert_eq!(stored.kind, AnalysisKind::Custom);
        assert_eq!(stored.status, "completed");
        assert_eq!(stored.narrative_status, NarrativeStatus::Unavailable);
        assert_eq!(stored.result, custom_result("Top category?"));
        assert_eq!(stored.prompt.as_deref(), Some("Top category?"));

        assert!(db.get_analysis(first, OTHER).unwrap().is_none());

        let history = db
            .list_analyses(OWNER, None, None, DEFAULT_HISTORY_LIMIT)
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second);

        assert_eq!(
            db.list_analyses(OWNER, Some(dataset_id), Some(AnalysisKind::Custom), 1)
                .unwrap()
                .len(),
            1
        );
        assert!(db
            .list_analyses(OWNER, None, Some(AnalysisKind::Trend), 50)
            .unwrap()
            .is_empty());
        assert!(db.list_analyses(OTHER, None, None, 50).unwrap().is_empty());
    }

    #[test]
    fn test_delete_dataset_cascades() {
        let (db, dataset_id) = seeded();
        db.save_analysis(&NewAnalysis {
            dataset_id,
            owner: OWNER.to_string(),
            kind: AnalysisKind::Custom,
            result: custom_result("anything"),
            prompt: None,
        })
        .unwrap();

        assert!(db.delete_dataset(dataset_id, OWNER).unwrap());

        assert_eq!(db.count_records(dataset_id).unwrap(), 0);
        assert!(db.list_analyses(OWNER, None, None, 50).unwrap().is_empty());
    }

    #[test]
    fn test_audit_log() {
        let db = Database::in_memory().unwrap();

        db.log_audit(OWNER, "create", Some("dataset"), Some(1), None)
            .unwrap();
        let id = db
            .log_audit(OWNER, "analyze", Some("dataset"), Some(1), Some("kind=trend"))
            .unwrap();
        assert!(id > 0);

        db.log_audit("other@example.com", "create", Some("dataset"), Some(2), None)
            .unwrap();

        let entries = db.list_audit_log(OWNER, 10).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.user_email == OWNER));
        assert_eq!(entries[0].action, "analyze");
        assert_eq!(entries[0].details.as_deref(), Some("kind=trend"));
        assert_eq!(entries[1].entity_type.as_deref(), Some("dataset"));

        assert_eq!(db.list_audit_log(OWNER, 1).unwrap().len(), 1);
        assert_eq!(db.list_audit_log("other@example.com", 10).unwrap().len(), 1);
    }
}
