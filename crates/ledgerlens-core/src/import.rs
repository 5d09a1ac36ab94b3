//! CSV and spreadsheet import of financial records
//!
//! Files are header-driven: columns are located by (case-insensitive) name,
//! so column order does not matter and unknown columns are ignored. Excel
//! workbooks are read from their first sheet with the same column rules.
//!
//! Required: `date`, `amount`. Optional: `category`, `description`, and a
//! type column named `type` or `record_type`. Without a type column the
//! amount's sign decides (negative is an expense); amounts are always stored
//! as magnitudes.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, DataType, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{NewRecord, RecordType};

/// File extensions accepted for import
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls"];

/// Import file format, detected from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    Csv,
    Workbook,
}

impl ImportFormat {
    pub fn from_file_name(name: impl AsRef<Path>) -> Option<Self> {
        let ext = name.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" => Some(Self::Workbook),
            _ => None,
        }
    }
}

/// Parse file contents in the given format
pub fn parse_file(format: ImportFormat, bytes: &[u8], dataset_id: i64) -> Result<Vec<NewRecord>> {
    match format {
        ImportFormat::Csv => parse_records(bytes, dataset_id),
        ImportFormat::Workbook => parse_workbook(bytes, dataset_id),
    }
}

/// Column positions resolved from the header row
struct Columns {
    date: usize,
    amount: usize,
    category: Option<usize>,
    description: Option<usize>,
    record_type: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &[String]) -> Result<Self> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
        };

        Ok(Self {
            date: find(&["date", "transaction date"])
                .ok_or_else(|| Error::Import("Missing required column: date".into()))?,
            amount: find(&["amount"])
                .ok_or_else(|| Error::Import("Missing required column: amount".into()))?,
            category: find(&["category"]),
            description: find(&["description", "memo"]),
            record_type: find(&["type", "record_type"]),
        })
    }
}

/// Turns data rows into records, shared by the CSV and workbook readers
struct RowParser {
    columns: Columns,
    dataset_id: i64,
    // Identical rows in one file are distinct records; number them
    seen: HashMap<String, usize>,
    records: Vec<NewRecord>,
}

impl RowParser {
    fn new(headers: &[String], dataset_id: i64) -> Result<Self> {
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(Error::Import("File is empty".into()));
        }

        Ok(Self {
            columns: Columns::from_headers(headers)?,
            dataset_id,
            seen: HashMap::new(),
            records: Vec::new(),
        })
    }

    /// `line` is the 1-based row number in the source file
    fn push(&mut self, line: usize, row: &[String]) -> Result<()> {
        if row.iter().all(|field| field.trim().is_empty()) {
            return Ok(());
        }

        let cell = |idx: usize| row.get(idx).map(|s| s.trim()).unwrap_or_default();
        let field = |idx: Option<usize>| {
            idx.map(cell)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let date = parse_date(cell(self.columns.date))
            .map_err(|e| Error::Import(format!("Row {}: {}", line, e)))?;
        let signed = parse_amount(cell(self.columns.amount))
            .map_err(|e| Error::Import(format!("Row {}: {}", line, e)))?;

        let record_type = match field(self.columns.record_type) {
            Some(t) => t
                .parse::<RecordType>()
                .map_err(|e| Error::Import(format!("Row {}: {}", line, e)))?,
            None if signed < 0.0 => RecordType::Expense,
            None => RecordType::Revenue,
        };

        let category = field(self.columns.category);
        let description = field(self.columns.description);
        let amount = signed.abs();

        let base = hash_input(
            self.dataset_id,
            &date,
            &category,
            &description,
            amount,
            record_type,
        );
        let occurrence = self.seen.entry(base.clone()).or_insert(0);
        *occurrence += 1;
        let import_hash = generate_hash(&base, *occurrence);

        self.records.push(NewRecord {
            date,
            category,
            amount,
            description,
            record_type,
            import_hash: Some(import_hash),
        });
        Ok(())
    }

    fn finish(self, format: ImportFormat) -> Result<Vec<NewRecord>> {
        if self.records.is_empty() {
            return Err(Error::Import("File is empty".into()));
        }

        debug!(
            dataset_id = self.dataset_id,
            count = self.records.len(),
            ?format,
            "Parsed import records"
        );
        Ok(self.records)
    }
}

/// Parse a CSV export into records ready for `Database::insert_records_bulk`
///
/// Fails on an empty file, a missing required column, or the first row whose
/// date, amount or type cannot be parsed (the error names the row).
pub fn parse_records<R: Read>(reader: R, dataset_id: i64) -> Result<Vec<NewRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut parser = RowParser::new(&headers, dataset_id)?;

    for (i, result) in rdr.records().enumerate() {
        let row: Vec<String> = result?.iter().map(str::to_string).collect();
        // Header is line 1
        parser.push(i + 2, &row)?;
    }

    parser.finish(ImportFormat::Csv)
}

/// Parse the first sheet of an Excel workbook (.xlsx or .xls)
///
/// The first non-empty row is the header; rows follow the CSV rules.
pub fn parse_workbook(bytes: &[u8], dataset_id: i64) -> Result<Vec<NewRecord>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| Error::Import(format!("Unable to read workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::Import("Workbook has no sheets".into()))?
        .map_err(|e| Error::Import(format!("Unable to read first sheet: {}", e)))?;

    parse_sheet(&range, dataset_id)
}

fn parse_sheet(range: &Range<Data>, dataset_id: i64) -> Result<Vec<NewRecord>> {
    // Ranges start at the first used cell, not necessarily row 1
    let first_line = range.start().map_or(1, |(row, _)| row as usize + 1);

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>());
    let headers = rows
        .next()
        .ok_or_else(|| Error::Import("File is empty".into()))?;
    let mut parser = RowParser::new(&headers, dataset_id)?;

    for (i, row) in rows.enumerate() {
        parser.push(first_line + i + 1, &row)?;
    }

    parser.finish(ImportFormat::Workbook)
}

/// Render a cell the way it would appear in a CSV export
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

fn hash_input(
    dataset_id: i64,
    date: &NaiveDateTime,
    category: &Option<String>,
    description: &Option<String>,
    amount: f64,
    record_type: RecordType,
) -> String {
    format!(
        "{}|{}|{}|{}|{:.2}|{}",
        dataset_id,
        date,
        category.as_deref().unwrap_or_default(),
        description.as_deref().unwrap_or_default(),
        amount,
        record_type
    )
}

/// SHA-256 over the row identity plus its occurrence number within the file
fn generate_hash(base: &str, occurrence: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(base.as_bytes());
    hasher.update(occurrence.to_be_bytes());
    hex::encode(hasher.finalize())
}

/// Parse a date or datetime string in the supported formats
pub fn parse_date(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }

    let date_formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
    ];
    for fmt in date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date.and_time(chrono::NaiveTime::MIN));
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string, handling currency symbols, commas and parentheses
pub fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::Import(format!("Unable to parse amount: {}", s)))
}
