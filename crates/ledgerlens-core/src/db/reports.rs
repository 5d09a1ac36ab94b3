//! Summary and trend reports over a dataset
//!
//! Each report fetches the scoped records once and hands them to the pure
//! functions in `analytics`, so SQL never re-implements aggregation.

use chrono::NaiveDate;

use super::record_filter::RecordQuery;
use super::Database;
use crate::analytics;
use crate::error::Result;
use crate::models::{
    DataSummary, ExpenseAnalysis, ProfitAnalysis, RecordType, RevenueAnalysis,
};

impl Database {
    /// Summary statistics for a dataset within an optional inclusive window
    pub fn data_summary(
        &self,
        dataset_id: i64,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<DataSummary> {
        let records =
            self.fetch_records(&RecordQuery::new(dataset_id).window(date_from, date_to))?;
        Ok(analytics::summarize(&records, date_from, date_to))
    }

    /// Revenue by category plus the daily revenue trend
    pub fn revenue_analysis(
        &self,
        dataset_id: i64,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<RevenueAnalysis> {
        let records = self.fetch_records(
            &RecordQuery::new(dataset_id)
                .record_type(Some(RecordType::Revenue))
                .window(date_from, date_to),
        )?;

        Ok(RevenueAnalysis {
            revenue_by_category: analytics::breakdown_by_category(&records, RecordType::Revenue),
            revenue_trends: analytics::build_trend(&records, RecordType::Revenue),
            date_from,
            date_to,
        })
    }

    /// Expenses by category plus the daily expense trend
    pub fn expense_analysis(
        &self,
        dataset_id: i64,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<ExpenseAnalysis> {
        let records = self.fetch_records(
            &RecordQuery::new(dataset_id)
                .record_type(Some(RecordType::Expense))
                .window(date_from, date_to),
        )?;

        Ok(ExpenseAnalysis {
            expenses_by_category: analytics::breakdown_by_category(&records, RecordType::Expense),
            expense_trends: analytics::build_trend(&records, RecordType::Expense),
            date_from,
            date_to,
        })
    }

    /// Merged daily revenue/expense/profit timeline with totals
    pub fn profit_analysis(
        &self,
        dataset_id: i64,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<ProfitAnalysis> {
        let records =
            self.fetch_records(&RecordQuery::new(dataset_id).window(date_from, date_to))?;

        let revenue = analytics::build_trend(&records, RecordType::Revenue);
        let expense = analytics::build_trend(&records, RecordType::Expense);
        let merged = analytics::merge_profit_trend(&revenue, &expense);

        Ok(ProfitAnalysis {
            profit_trends: merged.points,
            summary: merged.totals,
            date_from,
            date_to,
        })
    }
}
