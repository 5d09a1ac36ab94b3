//! Per-category totals within a single record type

use std::collections::HashMap;

use crate::models::{CategoryTotal, FinancialRecord, RecordType};

/// Group records of one type by category label
///
/// Entries appear in the order their category is first seen. Missing or blank
/// categories are grouped under "Unknown"; labels are otherwise compared
/// exactly, so "Rent" and "rent" are distinct groups.
pub fn breakdown_by_category(
    records: &[FinancialRecord],
    record_type: RecordType,
) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records.iter().filter(|r| r.record_type == record_type) {
        let label = record.category_label();
        match index.get(label) {
            Some(&i) => {
                totals[i].total += record.amount;
                totals[i].count += 1;
            }
            None => {
                index.insert(label, totals.len());
                totals.push(CategoryTotal {
                    category: label.to_string(),
                    record_type,
                    total: record.amount,
                    count: 1,
                });
            }
        }
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(category: Option<&str>, record_type: RecordType, amount: f64) -> FinancialRecord {
        FinancialRecord {
            id: 0,
            dataset_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            category: category.map(String::from),
            amount,
            description: None,
            record_type,
        }
    }

    #[test]
    fn test_breakdown_groups_and_counts() {
        let records = vec![
            rec(Some("Sales"), RecordType::Revenue, 100.0),
            rec(Some("Rent"), RecordType::Expense, 900.0),
            rec(Some("Consulting"), RecordType::Revenue, 250.0),
            rec(Some("Sales"), RecordType::Revenue, 50.0),
        ];

        let revenue = breakdown_by_category(&records, RecordType::Revenue);
        assert_eq!(revenue.len(), 2);
        assert_eq!(revenue[0].category, "Sales");
        assert_eq!(revenue[0].total, 150.0);
        assert_eq!(revenue[0].count, 2);
        assert_eq!(revenue[1].category, "Consulting");
        assert_eq!(revenue[1].record_type, RecordType::Revenue);

        let expenses = breakdown_by_category(&records, RecordType::Expense);
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].total, 900.0);
    }

    #[test]
    fn test_breakdown_missing_category_is_unknown() {
        let records = vec![
            rec(None, RecordType::Expense, 10.0),
            rec(Some(""), RecordType::Expense, 5.0),
            rec(Some("Travel"), RecordType::Expense, 20.0),
        ];

        let expenses = breakdown_by_category(&records, RecordType::Expense);
        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[0].category, "Unknown");
        assert_eq!(expenses[0].total, 15.0);
        assert_eq!(expenses[0].count, 2);
    }

    #[test]
    fn test_breakdown_is_case_sensitive() {
        let records = vec![
            rec(Some("Rent"), RecordType::Expense, 1.0),
            rec(Some("rent"), RecordType::Expense, 1.0),
        ];
        assert_eq!(breakdown_by_category(&records, RecordType::Expense).len(), 2);
    }

    #[test]
    fn test_breakdown_totals_match_type_sum() {
        let records = vec![
            rec(Some("A"), RecordType::Revenue, 12.5),
            rec(Some("B"), RecordType::Revenue, 7.5),
            rec(None, RecordType::Revenue, 80.0),
            rec(Some("A"), RecordType::Asset, 1000.0),
        ];
        let total: f64 = breakdown_by_category(&records, RecordType::Revenue)
            .iter()
            .map(|c| c.total)
            .sum();
        assert_eq!(total, 100.0);
    }

    #[test]
    fn test_breakdown_empty() {
        assert!(breakdown_by_category(&[], RecordType::Revenue).is_empty());
    }
}
