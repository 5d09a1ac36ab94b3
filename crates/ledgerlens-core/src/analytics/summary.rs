//! Summary aggregation over a record set

use chrono::NaiveDate;

use crate::models::{DataSummary, FinancialRecord, RecordType};

use super::margin_percent;

/// Whether a record's calendar day falls inside an inclusive window
pub(crate) fn in_window(
    record: &FinancialRecord,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
) -> bool {
    let day = record.day();
    date_from.map_or(true, |from| day >= from) && date_to.map_or(true, |to| day <= to)
}

/// Summarize records within an optional inclusive date window
///
/// Revenue and expense totals are summed by type tag. The date span covers
/// every record in scope regardless of type. An empty scope yields zeros and
/// no date span.
pub fn summarize(
    records: &[FinancialRecord],
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
) -> DataSummary {
    let mut summary = DataSummary::empty();

    for record in records
        .iter()
        .filter(|r| in_window(r, date_from, date_to))
    {
        summary.total_records += 1;

        match record.record_type {
            RecordType::Revenue => {
                summary.total_revenue += record.amount;
                summary.revenue_transactions += 1;
            }
            RecordType::Expense => {
                summary.total_expenses += record.amount;
                summary.expense_transactions += 1;
            }
            _ => {}
        }

        summary.date_range_start = Some(match summary.date_range_start {
            Some(start) if start <= record.date => start,
            _ => record.date,
        });
        summary.date_range_end = Some(match summary.date_range_end {
            Some(end) if end >= record.date => end,
            _ => record.date,
        });
    }

    summary.net_profit = summary.total_revenue - summary.total_expenses;
    summary.profit_margin = margin_percent(summary.net_profit, summary.total_revenue);

    summary
}
