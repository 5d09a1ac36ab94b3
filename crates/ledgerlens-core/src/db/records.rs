//! Financial record operations

use rusqlite::{params, OptionalExtension};
use tracing::{debug, warn};

use super::record_filter::RecordQuery;
use super::{parse_record_date, Database, RECORD_DATE_FORMAT};
use crate::error::{Error, Result};
use crate::models::{BulkInsertError, BulkInsertReport, FinancialRecord, NewRecord};

const RECORD_COLUMNS: &str =
    "r.id, r.dataset_id, r.date, r.category, r.amount, r.description, r.record_type";

impl Database {
    /// Insert a record (skips duplicates based on import_hash)
    ///
    /// Returns the new id, or None when a record with the same import hash
    /// already exists.
    pub fn insert_record(&self, dataset_id: i64, record: &NewRecord) -> Result<Option<i64>> {
        if !record.amount.is_finite() {
            return Err(Error::InvalidData(format!(
                "Amount must be a finite number, got {}",
                record.amount
            )));
        }

        let conn = self.conn()?;

        if let Some(hash) = record.import_hash.as_deref() {
            let existing: Option<i64> = conn
                .query_row(
                    "SELECT id FROM financial_records WHERE import_hash = ?",
                    params![hash],
                    |row| row.get(0),
                )
                .optional()?;

            if existing.is_some() {
                return Ok(None);
            }
        }

        conn.execute(
            r#"
            INSERT INTO financial_records (dataset_id, date, category, amount, description, record_type, import_hash)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                dataset_id,
                record.date.format(RECORD_DATE_FORMAT).to_string(),
                record.category,
                record.amount.abs(),
                record.description,
                record.record_type.as_str(),
                record.import_hash,
            ],
        )?;

        Ok(Some(conn.last_insert_rowid()))
    }

    /// Insert many records, collecting per-row failures instead of aborting
    pub fn insert_records_bulk(
        &self,
        dataset_id: i64,
        records: &[NewRecord],
    ) -> Result<BulkInsertReport> {
        let mut report = BulkInsertReport {
            total_records: records.len(),
            ..Default::default()
        };

        for (index, record) in records.iter().enumerate() {
            match self.insert_record(dataset_id, record) {
                Ok(Some(_)) => report.successful_records += 1,
                Ok(None) => report.duplicate_records += 1,
                Err(e @ (Error::Pool(_) | Error::Encryption(_))) => return Err(e),
                Err(e) => {
                    warn!(dataset_id, index, error = %e, "Failed to insert record");
                    report.failed_records += 1;
                    report.errors.push(BulkInsertError {
                        index,
                        error: e.to_string(),
                    });
                }
            }
        }

        debug!(
            dataset_id,
            inserted = report.successful_records,
            duplicates = report.duplicate_records,
            failed = report.failed_records,
            "Bulk insert complete"
        );

        Ok(report)
    }

    /// Fetch records matching a query, newest first
    pub fn fetch_records(&self, query: &RecordQuery) -> Result<Vec<FinancialRecord>> {
        let conn = self.conn()?;
        let filter = query.build();

        let mut sql = format!(
            "SELECT {} FROM financial_records r {} {}",
            RECORD_COLUMNS, filter.where_clause, filter.order_clause
        );

        let mut params = filter.into_params();
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ? OFFSET ?");
            params.push(Box::new(limit));
            params.push(Box::new(query.offset));
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            params.push(Box::new(query.offset));
        }

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let records = stmt
            .query_map(params_refs.as_slice(), Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Count records matching a query (limit and offset are ignored)
    pub fn count_matching_records(&self, query: &RecordQuery) -> Result<i64> {
        let conn = self.conn()?;
        let filter = query.build();
        let count: i64 = conn.query_row(
            &filter.build_count_query(),
            filter.params_refs().as_slice(),
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Count all records in a dataset
    pub fn count_records(&self, dataset_id: i64) -> Result<i64> {
        self.count_matching_records(&RecordQuery::new(dataset_id))
    }

    /// Column order: id, dataset_id, date, category, amount, description, record_type
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<FinancialRecord> {
        let date_str: String = row.get(2)?;
        let type_str: String = row.get(6)?;
        let record_type = type_str.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(
                6,
                rusqlite::types::Type::Text,
                e.into(),
            )
        })?;

        let date = parse_record_date(&date_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, e.into())
        })?;

        Ok(FinancialRecord {
            id: row.get(0)?,
            dataset_id: row.get(1)?,
            date,
            category: row.get(3)?,
            amount: row.get(4)?,
            description: row.get(5)?,
            record_type,
        })
    }
}
