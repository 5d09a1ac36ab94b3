//! Kind-specific metrics over a prepared context

use crate::analytics;
use crate::context::AnalysisContext;
use crate::models::{FinancialRecord, RecordType};

use super::types::{AnalysisKind, AnalysisMetrics, Direction, Grade, Outlook, RiskLevel};

/// Placeholder projections for the forecast kind (no statistical model)
pub const FORECAST_GROWTH_ESTIMATE: &str = "5-15%";
pub const FORECAST_EXPENSE_TREND: &str = "stable";

/// Compute the metrics for one analysis kind
///
/// `records` is the full scoped record set (used for trends and category
/// breakdowns); qualitative indicators come from the context summary.
pub fn compute_metrics(
    kind: AnalysisKind,
    context: &AnalysisContext,
    records: &[FinancialRecord],
    custom_prompt: Option<&str>,
) -> AnalysisMetrics {
    let summary = &context.summary;
    let margin = summary.profit_margin;

    match kind {
        AnalysisKind::Trend => {
            let revenue = analytics::build_trend(records, RecordType::Revenue);
            let expense = analytics::build_trend(records, RecordType::Expense);
            AnalysisMetrics::Trend {
                revenue_trend: if summary.total_revenue > 0.0 {
                    Direction::Positive
                } else {
                    Direction::Negative
                },
                profit_margin: margin,
                transaction_volume: summary.total_records,
                profit_trend: analytics::merge_profit_trend(&revenue, &expense).points,
            }
        }
        AnalysisKind::Health => AnalysisMetrics::Health {
            health_score: analytics::health_score(summary),
            profitability: if margin > 10.0 { Grade::Good } else { Grade::Poor },
            revenue_diversity: context.distinct_categories(),
            expense_control: if margin > 15.0 {
                Grade::Good
            } else {
                Grade::NeedsAttention
            },
        },
        AnalysisKind::Comparative => AnalysisMetrics::Comparative {
            revenue_expense_ratio: summary.total_revenue / summary.total_expenses.max(1.0),
            profit_margin_category: if margin > 20.0 {
                Grade::Excellent
            } else if margin > 10.0 {
                Grade::Good
            } else {
                Grade::NeedsImprovement
            },
            revenue_by_category: analytics::breakdown_by_category(records, RecordType::Revenue),
            expenses_by_category: analytics::breakdown_by_category(records, RecordType::Expense),
        },
        AnalysisKind::Risk => AnalysisMetrics::Risk {
            risk_score: analytics::risk_score(summary),
            profitability_risk: if margin < 5.0 {
                RiskLevel::High
            } else {
                RiskLevel::Low
            },
            // Needs multi-period history to estimate
            revenue_volatility: RiskLevel::Medium,
            expense_control: if margin > 15.0 { Grade::Good } else { Grade::Poor },
        },
        AnalysisKind::Forecast => AnalysisMetrics::Forecast {
            revenue_growth_estimate: FORECAST_GROWTH_ESTIMATE.to_string(),
            expense_trend: FORECAST_EXPENSE_TREND.to_string(),
            profit_outlook: if margin > 10.0 {
                Outlook::Positive
            } else {
                Outlook::Cautious
            },
        },
        AnalysisKind::Custom => AnalysisMetrics::Custom {
            custom_prompt: custom_prompt.unwrap_or_default().to_string(),
        },
    }
}
