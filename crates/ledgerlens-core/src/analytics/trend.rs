//! Daily trend series for one record type

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{FinancialRecord, RecordType, TrendPoint};

/// Sum matching records per calendar day
///
/// The result is sparse (days without a matching record are absent) and
/// strictly increasing by date. Input order does not matter.
pub fn build_trend(records: &[FinancialRecord], record_type: RecordType) -> Vec<TrendPoint> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for record in records.iter().filter(|r| r.record_type == record_type) {
        *by_day.entry(record.day()).or_insert(0.0) += record.amount;
    }

    by_day
        .into_iter()
        .map(|(date, amount)| TrendPoint { date, amount })
        .collect()
}
