//! Revenue/expense trend alignment

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::models::{ProfitTotals, ProfitTrend, ProfitTrendPoint, TrendPoint};

use super::margin_percent;

fn by_date(trend: &[TrendPoint]) -> BTreeMap<NaiveDate, f64> {
    let mut map = BTreeMap::new();
    for point in trend {
        *map.entry(point.date).or_insert(0.0) += point.amount;
    }
    map
}

/// Merge a revenue trend and an expense trend into a daily profit timeline
///
/// The timeline covers the union of dates present in either trend, in
/// ascending order, with an absent side counted as 0. Totals are the sums of
/// the two input sequences.
pub fn merge_profit_trend(
    revenue_trend: &[TrendPoint],
    expense_trend: &[TrendPoint],
) -> ProfitTrend {
    let revenue = by_date(revenue_trend);
    let expense = by_date(expense_trend);

    let dates: BTreeSet<NaiveDate> = revenue.keys().chain(expense.keys()).copied().collect();

    let points = dates
        .into_iter()
        .map(|date| {
            let revenue = revenue.get(&date).copied().unwrap_or(0.0);
            let expense = expense.get(&date).copied().unwrap_or(0.0);
            let profit = revenue - expense;
            ProfitTrendPoint {
                date,
                revenue,
                expense,
                profit,
                margin: margin_percent(profit, revenue),
            }
        })
        .collect();

    let total_revenue: f64 = revenue_trend.iter().map(|p| p.amount).sum();
    let total_expenses: f64 = expense_trend.iter().map(|p| p.amount).sum();
    let net_profit = total_revenue - total_expenses;

    ProfitTrend {
        points,
        totals: ProfitTotals {
            total_revenue,
            total_expenses,
            net_profit,
            profit_margin: margin_percent(net_profit, total_revenue),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{build_trend, summarize};
    use crate::models::{FinancialRecord, RecordType};

    fn day(date: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()
    }

    fn point(date: &str, amount: f64) -> TrendPoint {
        TrendPoint {
            date: day(date),
            amount,
        }
    }

    fn rec(date: &str, record_type: RecordType, amount: f64) -> FinancialRecord {
        FinancialRecord {
            id: 0,
            dataset_id: 1,
            date: day(date).and_hms_opt(0, 0, 0).unwrap(),
            category: None,
            amount,
            description: None,
            record_type,
        }
    }

    #[test]
    fn test_merge_worked_example() {
        let records = vec![
            rec("2024-01-01", RecordType::Revenue, 1000.0),
            rec("2024-01-01", RecordType::Expense, 400.0),
            rec("2024-01-02", RecordType::Revenue, 500.0),
        ];
        let merged = merge_profit_trend(
            &build_trend(&records, RecordType::Revenue),
            &build_trend(&records, RecordType::Expense),
        );

        assert_eq!(
            merged.points,
            vec![
                ProfitTrendPoint {
                    date: day("2024-01-01"),
                    revenue: 1000.0,
                    expense: 400.0,
                    profit: 600.0,
                    margin: 60.0,
                },
                ProfitTrendPoint {
                    date: day("2024-01-02"),
                    revenue: 500.0,
                    expense: 0.0,
                    profit: 500.0,
                    margin: 100.0,
                },
            ]
        );
        assert_eq!(merged.totals.total_revenue, 1500.0);
        assert_eq!(merged.totals.total_expenses, 400.0);
        assert_eq!(merged.totals.net_profit, 1100.0);
    }

    #[test]
    fn test_merge_expense_only_date() {
        let merged = merge_profit_trend(
            &[point("2024-01-01", 100.0)],
            &[point("2024-01-03", 40.0)],
        );

        assert_eq!(merged.points.len(), 2);
        let expense_day = &merged.points[1];
        assert_eq!(expense_day.date, day("2024-01-03"));
        assert_eq!(expense_day.revenue, 0.0);
        assert_eq!(expense_day.profit, -40.0);
        assert_eq!(expense_day.margin, 0.0);
    }

    #[test]
    fn test_merge_length_is_union_of_dates() {
        let revenue = vec![
            point("2024-01-01", 1.0),
            point("2024-01-02", 1.0),
            point("2024-01-04", 1.0),
        ];
        let expense = vec![point("2024-01-02", 1.0), point("2024-01-05", 1.0)];

        let merged = merge_profit_trend(&revenue, &expense);
        assert_eq!(merged.points.len(), 4);
        assert!(merged.points.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_merge_empty() {
        let merged = merge_profit_trend(&[], &[]);
        assert!(merged.points.is_empty());
        assert_eq!(merged.totals.total_revenue, 0.0);
        assert_eq!(merged.totals.profit_margin, 0.0);
    }

    #[test]
    fn test_merge_totals_agree_with_summary() {
        let records = vec![
            rec("2024-06-01", RecordType::Revenue, 1234.56),
            rec("2024-06-01", RecordType::Revenue, 0.44),
            rec("2024-06-02", RecordType::Expense, 99.99),
            rec("2024-06-03", RecordType::Expense, 0.01),
            rec("2024-06-03", RecordType::Equity, 50_000.0),
            rec("2024-06-04", RecordType::Revenue, 10.1),
        ];

        let summary = summarize(&records, None, None);
        let merged = merge_profit_trend(
            &build_trend(&records, RecordType::Revenue),
            &build_trend(&records, RecordType::Expense),
        );

        let eps = 1e-9;
        assert!((summary.total_revenue - merged.totals.total_revenue).abs() < eps);
        assert!((summary.total_expenses - merged.totals.total_expenses).abs() < eps);
        assert!((summary.net_profit - merged.totals.net_profit).abs() < eps);
        assert!((summary.profit_margin - merged.totals.profit_margin).abs() < eps);
    }
}
