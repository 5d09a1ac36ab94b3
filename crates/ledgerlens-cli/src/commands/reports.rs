//! Report command implementations

use anyhow::Result;
use chrono::NaiveDate;
use ledgerlens_core::db::Database;
use ledgerlens_core::models::{CategoryTotal, DataSummary, TrendPoint};

use super::{money, require_dataset, resolve_window, truncate};
use crate::cli::DateWindow;

fn window_label(from: Option<NaiveDate>, to: Option<NaiveDate>) -> String {
    match (from, to) {
        (None, None) => "all dates".to_string(),
        (Some(from), None) => format!("from {}", from),
        (None, Some(to)) => format!("through {}", to),
        (Some(from), Some(to)) => format!("{} to {}", from, to),
    }
}

fn print_categories(categories: &[CategoryTotal]) {
    let grand_total: f64 = categories.iter().map(|c| c.total).sum();
    for category in categories {
        let share = if grand_total > 0.0 {
            category.total / grand_total * 100.0
        } else {
            0.0
        };
        println!(
            "   {:<24} {:>14} {:>5.1}%  ({} records)",
            truncate(&category.category, 24),
            money(category.total),
            share,
            category.count
        );
    }
}

fn print_trend(points: &[TrendPoint]) {
    for point in points {
        println!("   {}  {:>14}", point.date, money(point.amount));
    }
}

pub fn print_summary(summary: &DataSummary) {
    println!("   Records:          {}", summary.total_records);
    println!(
        "   Revenue:          {} ({} records)",
        money(summary.total_revenue),
        summary.revenue_transactions
    );
    println!(
        "   Expenses:         {} ({} records)",
        money(summary.total_expenses),
        summary.expense_transactions
    );
    println!("   Net profit:       {}", money(summary.net_profit));
    println!("   Profit margin:    {:.2}%", summary.profit_margin);
    match (summary.date_range_start, summary.date_range_end) {
        (Some(start), Some(end)) => {
            println!("   Date range:       {} to {}", start.date(), end.date())
        }
        _ => println!("   Date range:       (no records)"),
    }
}

pub fn cmd_summary(db: &Database, user: &str, dataset_id: i64, window: &DateWindow) -> Result<()> {
    let dataset = require_dataset(db, user, dataset_id)?;
    let (from, to) = resolve_window(window)?;
    let summary = db.data_summary(dataset.id, from, to)?;

    println!();
    println!("📊 Summary: {} ({})", dataset.name, window_label(from, to));
    println!("   ─────────────────────────────");
    print_summary(&summary);

    Ok(())
}

pub fn cmd_revenue(db: &Database, user: &str, dataset_id: i64, window: &DateWindow) -> Result<()> {
    let dataset = require_dataset(db, user, dataset_id)?;
    let (from, to) = resolve_window(window)?;
    let report = db.revenue_analysis(dataset.id, from, to)?;

    println!();
    println!("💰 Revenue: {} ({})", dataset.name, window_label(from, to));

    if report.revenue_by_category.is_empty() {
        println!("   No revenue records in this window.");
        return Ok(());
    }

    println!("   ─────────────────────────────");
    println!("   By category:");
    print_categories(&report.revenue_by_category);
    println!();
    println!("   Daily trend:");
    print_trend(&report.revenue_trends);

    Ok(())
}

pub fn cmd_expenses(
    db: &Database,
    user: &str,
    dataset_id: i64,
    window: &DateWindow,
) -> Result<()> {
    let dataset = require_dataset(db, user, dataset_id)?;
    let (from, to) = resolve_window(window)?;
    let report = db.expense_analysis(dataset.id, from, to)?;

    println!();
    println!("💸 Expenses: {} ({})", dataset.name, window_label(from, to));

    if report.expenses_by_category.is_empty() {
        println!("   No expense records in this window.");
        return Ok(());
    }

    println!("   ─────────────────────────────");
    println!("   By category:");
    print_categories(&report.expenses_by_category);
    println!();
    println!("   Daily trend:");
    print_trend(&report.expense_trends);

    Ok(())
}

pub fn cmd_profit(db: &Database, user: &str, dataset_id: i64, window: &DateWindow) -> Result<()> {
    let dataset = require_dataset(db, user, dataset_id)?;
    let (from, to) = resolve_window(window)?;
    let report = db.profit_analysis(dataset.id, from, to)?;

    println!();
    println!("📈 Profit: {} ({})", dataset.name, window_label(from, to));
    println!("   ─────────────────────────────────────────────────────────────");

    if report.profit_trends.is_empty() {
        println!("   No revenue or expense records in this window.");
        return Ok(());
    }

    println!(
        "   {:<10}  {:>14}  {:>14}  {:>14}  {:>8}",
        "Date", "Revenue", "Expenses", "Profit", "Margin"
    );
    for point in &report.profit_trends {
        let profit = if point.profit < 0.0 {
            format!("\x1b[31m{:>14}\x1b[0m", money(point.profit))
        } else {
            format!("{:>14}", money(point.profit))
        };
        println!(
            "   {}  {:>14}  {:>14}  {}  {:>7.1}%",
            point.date,
            money(point.revenue),
            money(point.expense),
            profit,
            point.margin
        );
    }

    let totals = &report.summary;
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:<10}  {:>14}  {:>14}  {:>14}  {:>7.1}%",
        "Total",
        money(totals.total_revenue),
        money(totals.total_expenses),
        money(totals.net_profit),
        totals.profit_margin
    );

    Ok(())
}
