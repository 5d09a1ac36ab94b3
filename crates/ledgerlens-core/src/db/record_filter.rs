//! Record query builder for constructing dynamic SQL filters
//!
//! `RecordQuery` is the single filter shape used by every record read:
//! listing, counting, and the report pipeline all go through it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::RecordType;

/// Conjunctive filter over one dataset's records
///
/// Dates are compared on the calendar day and both bounds are inclusive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordQuery {
    pub dataset_id: i64,
    #[serde(default)]
    pub record_type: Option<RecordType>,
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: i64,
}

/// SQL components produced from a `RecordQuery`
pub struct FilterResult {
    /// WHERE clause including "WHERE" keyword
    pub where_clause: String,
    /// ORDER BY clause including "ORDER BY" keyword
    pub order_clause: &'static str,
    /// Parameters for the query (boxed for rusqlite compatibility)
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl RecordQuery {
    /// Create a query over every record of a dataset
    pub fn new(dataset_id: i64) -> Self {
        Self {
            dataset_id,
            ..Default::default()
        }
    }

    pub fn record_type(mut self, record_type: Option<RecordType>) -> Self {
        self.record_type = record_type;
        self
    }

    /// Set the inclusive date window (either bound may be open)
    pub fn window(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Build the filter components (pagination is left to the caller)
    pub fn build(&self) -> FilterResult {
        let mut conditions = vec!["r.dataset_id = ?".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(self.dataset_id)];

        if let Some(record_type) = self.record_type {
            conditions.push("r.record_type = ?".to_string());
            params.push(Box::new(record_type.as_str()));
        }

        if let Some(from) = self.date_from {
            conditions.push("date(r.date) >= ?".to_string());
            params.push(Box::new(from.to_string()));
        }

        if let Some(to) = self.date_to {
            conditions.push("date(r.date) <= ?".to_string());
            params.push(Box::new(to.to_string()));
        }

        if let Some(category) = self.category.as_deref() {
            if !category.trim().is_empty() {
                conditions.push("r.category = ?".to_string());
                params.push(Box::new(category.to_string()));
            }
        }

        FilterResult {
            where_clause: format!("WHERE {}", conditions.join(" AND ")),
            order_clause: "ORDER BY r.date DESC, r.id DESC",
            params,
        }
    }
}

impl FilterResult {
    /// Build a COUNT query
    pub fn build_count_query(&self) -> String {
        format!(
            "SELECT COUNT(*) FROM financial_records r {}",
            self.where_clause
        )
    }

    /// Get parameter references for query execution
    pub fn params_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }

    /// Take the parameter vector to append pagination params
    pub fn into_params(self) -> Vec<Box<dyn rusqlite::ToSql>> {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_query_filters_dataset_only() {
        let filter = RecordQuery::new(7).build();
        assert_eq!(filter.where_clause, "WHERE r.dataset_id = ?");
        assert_eq!(filter.params.len(), 1);
        assert_eq!(filter.order_clause, "ORDER BY r.date DESC, r.id DESC");
    }

    #[test]
    fn test_all_filters_are_conjunctive() {
        let filter = RecordQuery::new(1)
            .record_type(Some(RecordType::Expense))
            .window(
                NaiveDate::from_ymd_opt(2024, 1, 1),
                NaiveDate::from_ymd_opt(2024, 1, 31),
            )
            .category(Some("Rent".to_string()))
            .build();

        assert_eq!(
            filter.where_clause,
            "WHERE r.dataset_id = ? AND r.record_type = ? AND date(r.date) >= ? \
             AND date(r.date) <= ? AND r.category = ?"
        );
        assert_eq!(filter.params.len(), 5);
    }

    #[test]
    fn test_blank_category_ignored() {
        let filter = RecordQuery::new(1).category(Some("  ".to_string())).build();
        assert_eq!(filter.params.len(), 1);
    }

    #[test]
    fn test_open_ended_window() {
        let filter = RecordQuery::new(1)
            .window(None, NaiveDate::from_ymd_opt(2024, 6, 30))
            .build();
        assert!(filter.where_clause.ends_with("date(r.date) <= ?"));
        assert_eq!(filter.params.len(), 2);
    }

    #[test]
    fn test_count_query() {
        let filter = RecordQuery::new(3).build();
        assert_eq!(
            filter.build_count_query(),
            "SELECT COUNT(*) FROM financial_records r WHERE r.dataset_id = ?"
        );
    }
}
