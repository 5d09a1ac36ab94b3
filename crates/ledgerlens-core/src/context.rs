//! Analysis context assembler
//!
//! Packages a dataset summary and a bounded sample of recent records into
//! the structure the prompt renderer consumes. The record sample is capped
//! so prompt size stays bounded no matter how large the dataset is.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{DataSummary, FinancialRecord, RecordType};

/// Maximum number of records carried into any analysis context
pub const MAX_CONTEXT_RECORDS: usize = 20;

/// A record flattened for prompt rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextRecord {
    pub date: NaiveDateTime,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Category label ("Unknown" when missing)
    pub category: String,
    pub amount: f64,
    /// Description ("" when missing)
    pub description: String,
}

impl From<&FinancialRecord> for ContextRecord {
    fn from(record: &FinancialRecord) -> Self {
        Self {
            date: record.date,
            record_type: record.record_type,
            category: record.category_label().to_string(),
            amount: record.amount,
            description: record.description.clone().unwrap_or_default(),
        }
    }
}

/// Assembled context for narrative analysis prompts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisContext {
    pub summary: DataSummary,
    /// Most recent records, at most `MAX_CONTEXT_RECORDS`, in input order
    pub recent_records: Vec<ContextRecord>,
    /// Categories the caller asked the analysis to focus on
    pub focus_categories: Vec<String>,
}

impl AnalysisContext {
    /// Distinct category labels among the sampled records
    pub fn distinct_categories(&self) -> usize {
        let mut seen: Vec<&str> = self
            .recent_records
            .iter()
            .map(|r| r.category.as_str())
            .collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }
}

/// Build the context from a summary and records already ordered newest first
pub fn build_analysis_context(
    summary: DataSummary,
    records: &[FinancialRecord],
    focus_categories: Option<Vec<String>>,
) -> AnalysisContext {
    AnalysisContext {
        summary,
        recent_records: records
            .iter()
            .take(MAX_CONTEXT_RECORDS)
            .map(ContextRecord::from)
            .collect(),
        focus_categories: focus_categories.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn records(n: usize) -> Vec<FinancialRecord> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..n)
            .map(|i| FinancialRecord {
                id: i as i64 + 1,
                dataset_id: 1,
                date: start + Duration::days(i as i64),
                category: if i % 3 == 0 { None } else { Some(format!("cat{}", i % 3)) },
                amount: 10.0,
                description: None,
                record_type: RecordType::Revenue,
            })
            .collect()
    }

    #[test]
    fn test_context_cap() {
        for (input, expected) in [(0, 0), (1, 1), (20, 20), (500, 20)] {
            let ctx = build_analysis_context(DataSummary::empty(), &records(input), None);
            assert_eq!(ctx.recent_records.len(), expected, "input of {}", input);
        }
    }

    #[test]
    fn test_context_preserves_order_and_defaults() {
        let input = records(25);
        let ctx = build_analysis_context(DataSummary::empty(), &input, None);

        assert_eq!(ctx.recent_records[0].date, input[0].date);
        assert_eq!(ctx.recent_records[19].date, input[19].date);
        assert_eq!(ctx.recent_records[0].category, "Unknown");
        assert_eq!(ctx.recent_records[1].category, "cat1");
        assert_eq!(ctx.recent_records[0].description, "");
        assert!(ctx.focus_categories.is_empty());
    }

    #[test]
    fn test_context_focus_verbatim() {
        let focus = vec!["Rent".to_string(), "payroll ".to_string()];
        let ctx = build_analysis_context(DataSummary::empty(), &[], Some(focus.clone()));
        assert_eq!(ctx.focus_categories, focus);
    }

    #[test]
    fn test_distinct_categories() {
        let ctx = build_analysis_context(DataSummary::empty(), &records(6), None);
        assert_eq!(ctx.distinct_categories(), 3);
    }

    #[test]
    fn test_context_record_serializes_type_key() {
        let ctx = build_analysis_context(DataSummary::empty(), &records(1), None);
        let json = serde_json::to_value(&ctx.recent_records[0]).unwrap();
        assert_eq!(json["type"], "revenue");
        assert_eq!(json["category"], "Unknown");
    }
}
