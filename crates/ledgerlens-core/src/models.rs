//! Domain models for LedgerLens

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category label used when a record has no category
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// A named collection of financial records belonging to one owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Identity of the owner (email or API key label)
    pub owner: String,
    /// Source file the dataset was created from, if any
    pub file_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A dataset to be created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDataset {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Partial update for a dataset (absent fields are left unchanged)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Classification of a financial record
///
/// Only `Revenue` and `Expense` take part in the revenue/expense/profit
/// pipeline; the balance-sheet types are stored and counted but never summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Revenue,
    Expense,
    Asset,
    Liability,
    Equity,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Expense => "expense",
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
        }
    }
}

impl std::str::FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "revenue" | "income" | "sales" => Ok(Self::Revenue),
            "expense" | "expenses" | "cost" => Ok(Self::Expense),
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            _ => Err(format!("Unknown record type: {}", s)),
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One financial transaction
///
/// `amount` is a positive magnitude; whether it adds to revenue or expenses
/// is decided by `record_type`, never by sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub id: i64,
    pub dataset_id: i64,
    pub date: NaiveDateTime,
    pub category: Option<String>,
    pub amount: f64,
    pub description: Option<String>,
    pub record_type: RecordType,
}

impl FinancialRecord {
    /// Calendar day of the record (the grouping precision for trends)
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }

    /// Category label with missing or blank categories mapped to "Unknown"
    pub fn category_label(&self) -> &str {
        self.category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(UNKNOWN_CATEGORY)
    }
}

/// A financial record to be inserted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
    pub date: NaiveDateTime,
    #[serde(default)]
    pub category: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    pub record_type: RecordType,
    /// Deduplication hash for imported rows (manual entries leave this empty)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_hash: Option<String>,
}

/// Outcome of a bulk record insert
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkInsertReport {
    pub total_records: usize,
    pub successful_records: usize,
    pub failed_records: usize,
    /// Rows skipped because the same import hash already exists
    pub duplicate_records: usize,
    pub errors: Vec<BulkInsertError>,
}

/// A row that failed to insert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkInsertError {
    /// Position of the row in the submitted batch
    pub index: usize,
    pub error: String,
}

/// Aggregate statistics for one (dataset, date window) scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSummary {
    pub total_records: usize,
    pub revenue_transactions: usize,
    pub expense_transactions: usize,
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub net_profit: f64,
    pub profit_margin: f64,
    pub date_range_start: Option<NaiveDateTime>,
    pub date_range_end: Option<NaiveDateTime>,
}

impl DataSummary {
    /// Summary of an empty record set
    pub fn empty() -> Self {
        Self {
            total_records: 0,
            revenue_transactions: 0,
            expense_transactions: 0,
            total_revenue: 0.0,
            total_expenses: 0.0,
            net_profit: 0.0,
            profit_margin: 0.0,
            date_range_start: None,
            date_range_end: None,
        }
    }
}

/// Total and count for one category within a record type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub record_type: RecordType,
    pub total: f64,
    pub count: usize,
}

/// Amount for one calendar day in a single-type trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub amount: f64,
}

/// One day of the merged revenue/expense timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitTrendPoint {
    pub date: NaiveDate,
    pub revenue: f64,
    pub expense: f64,
    pub profit: f64,
    pub margin: f64,
}

/// Totals computed from a pair of revenue/expense trends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitTotals {
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub net_profit: f64,
    pub profit_margin: f64,
}

/// Merged profit timeline plus its totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitTrend {
    pub points: Vec<ProfitTrendPoint>,
    pub totals: ProfitTotals,
}

/// Revenue report: category breakdown and daily trend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueAnalysis {
    pub revenue_by_category: Vec<CategoryTotal>,
    pub revenue_trends: Vec<TrendPoint>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// Expense report: category breakdown and daily trend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseAnalysis {
    pub expenses_by_category: Vec<CategoryTotal>,
    pub expense_trends: Vec<TrendPoint>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// Profit report: merged daily timeline and totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitAnalysis {
    pub profit_trends: Vec<ProfitTrendPoint>,
    pub summary: ProfitTotals,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}
