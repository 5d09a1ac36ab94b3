//! Prompt rendering for narrative analysis
//!
//! One template per `AnalysisKind`. Every template opens with a fixed
//! instruction line, lists summary figures, optionally embeds a JSON sample of
//! recent records, and ends with numbered asks.

use serde::Serialize;

use crate::analysis::AnalysisKind;
use crate::context::{AnalysisContext, ContextRecord};
use crate::error::{Error, Result};

/// Records embedded in the trend and forecast prompts
pub const TREND_SAMPLE: usize = 10;
/// Records embedded in the risk prompt
pub const RISK_SAMPLE: usize = 5;
/// Records embedded in the custom prompt
pub const CUSTOM_SAMPLE: usize = 15;

/// Format an amount as `$1,234.56` (negatives as `$-1,234.56`)
pub fn format_money(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("${}{}.{:02}", sign, grouped, frac)
}

/// Format a percentage with two decimals
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

fn sample_json(records: &[ContextRecord], n: usize) -> String {
    let sample = &records[..records.len().min(n)];
    serde_json::to_string_pretty(sample).unwrap_or_else(|_| "[]".to_string())
}

fn numbered(asks: &[&str]) -> String {
    asks.iter()
        .enumerate()
        .map(|(i, ask)| format!("{}. {}", i + 1, ask))
        .collect::<Vec<_>>()
        .join("\n")
}

fn date_range_line(ctx: &AnalysisContext) -> String {
    let fmt = |d: Option<chrono::NaiveDateTime>| {
        d.map(|d| d.format("%Y-%m-%dT%H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string())
    };
    format!(
        "- Date Range: {} to {}",
        fmt(ctx.summary.date_range_start),
        fmt(ctx.summary.date_range_end)
    )
}

fn trailer(ctx: &AnalysisContext, extra: Option<&str>) -> String {
    let mut lines = Vec::new();
    if !ctx.focus_categories.is_empty() {
        lines.push(format!(
            "Focus on these categories: {}",
            ctx.focus_categories.join(", ")
        ));
    }
    if let Some(extra) = extra {
        lines.push(format!("Additional context: {}", extra));
    }
    lines.join("\n")
}

/// A ready-made question clients can offer as a starting point
///
/// Run it as `analysis_type` with `query` as the custom prompt.
#[derive(Debug, Clone, Serialize)]
pub struct PresetInsight {
    pub title: &'static str,
    pub description: &'static str,
    pub query: &'static str,
    pub analysis_type: AnalysisKind,
}

pub fn preset_insights() -> Vec<PresetInsight> {
    vec![
        PresetInsight {
            title: "Revenue Analysis",
            description: "Analyze revenue trends and patterns",
            query: "What are the revenue trends over the last 12 months?",
            analysis_type: AnalysisKind::Trend,
        },
        PresetInsight {
            title: "Expense Breakdown",
            description: "Break down expenses by category",
            query: "Show me the expense breakdown by category",
            analysis_type: AnalysisKind::Custom,
        },
        PresetInsight {
            title: "Profit Margins",
            description: "Calculate and analyze profit margins",
            query: "What are the profit margins for each product line?",
            analysis_type: AnalysisKind::Comparative,
        },
    ]
}

/// Render the user prompt for one analysis kind
///
/// For every kind except `Custom` the custom prompt is optional extra
/// context; `Custom` requires it.
pub fn render_prompt(
    kind: AnalysisKind,
    ctx: &AnalysisContext,
    custom_prompt: Option<&str>,
) -> Result<String> {
    let s = &ctx.summary;
    let revenue = format_money(s.total_revenue);
    let expenses = format_money(s.total_expenses);
    let profit = format_money(s.net_profit);
    let margin = format_percent(s.profit_margin);

    let body = match kind {
        AnalysisKind::Trend => format!(
            "Analyze the financial trends in the following data:\n\n\
             Summary:\n\
             - Total Revenue: {revenue}\n\
             - Total Expenses: {expenses}\n\
             - Net Profit: {profit}\n\
             - Profit Margin: {margin}\n\
             {range}\n\n\
             Recent Transactions (sample):\n{sample}\n\n\
             Please provide:\n{asks}",
            range = date_range_line(ctx),
            sample = sample_json(&ctx.recent_records, TREND_SAMPLE),
            asks = numbered(&[
                "Key trends identified in revenue and expenses",
                "Seasonal patterns or cyclical behavior",
                "Growth rates and trajectory analysis",
                "Recommendations for trend optimization",
                "Potential concerns or red flags",
            ]),
        ),
        AnalysisKind::Health => format!(
            "Assess the financial health of this business based on the following data:\n\n\
             Financial Summary:\n\
             - Total Revenue: {revenue}\n\
             - Total Expenses: {expenses}\n\
             - Net Profit: {profit}\n\
             - Profit Margin: {margin}\n\
             - Revenue Transactions: {rev_tx}\n\
             - Expense Transactions: {exp_tx}\n\n\
             Please provide:\n{asks}",
            rev_tx = s.revenue_transactions,
            exp_tx = s.expense_transactions,
            asks = numbered(&[
                "Overall financial health score (1-10)",
                "Strengths and weaknesses analysis",
                "Liquidity and profitability assessment",
                "Comparison to industry benchmarks (if applicable)",
                "Specific recommendations for improvement",
                "Risk factors to monitor",
            ]),
        ),
        AnalysisKind::Comparative => format!(
            "Perform a comparative analysis of this financial data:\n\n\
             Current Performance:\n\
             - Revenue: {revenue}\n\
             - Expenses: {expenses}\n\
             - Profit: {profit}\n\
             - Margin: {margin}\n\n\
             Please provide:\n{asks}",
            asks = numbered(&[
                "Period-over-period comparison insights",
                "Revenue vs expense ratio analysis",
                "Performance benchmarking suggestions",
                "Category-wise performance comparison",
                "Efficiency metrics and recommendations",
            ]),
        ),
        AnalysisKind::Risk => format!(
            "Assess the financial risks based on this data:\n\n\
             Financial Position:\n\
             - Revenue: {revenue}\n\
             - Expenses: {expenses}\n\
             - Profit Margin: {margin}\n\
             - Transaction Volume: {volume}\n\n\
             Recent Transaction Patterns:\n{sample}\n\n\
             Please identify:\n{asks}",
            volume = s.total_records,
            sample = sample_json(&ctx.recent_records, RISK_SAMPLE),
            asks = numbered(&[
                "Financial risk factors and their severity",
                "Cash flow risks and volatility",
                "Revenue concentration risks",
                "Expense management risks",
                "Mitigation strategies for each risk",
                "Early warning indicators to monitor",
            ]),
        ),
        AnalysisKind::Forecast => format!(
            "Provide financial forecasting insights based on this data:\n\n\
             Current Performance:\n\
             - Revenue: {revenue}\n\
             - Expenses: {expenses}\n\
             - Profit: {profit}\n\
             - Margin: {margin}\n\n\
             Transaction Trends:\n{sample}\n\n\
             Please provide:\n{asks}",
            sample = sample_json(&ctx.recent_records, TREND_SAMPLE),
            asks = numbered(&[
                "Revenue growth projections for next 3-6 months",
                "Expense trend forecasts",
                "Profit margin predictions",
                "Seasonal adjustments and considerations",
                "Growth opportunities and constraints",
                "Scenario planning (best/worst/most likely cases)",
            ]),
        ),
        AnalysisKind::Custom => {
            let request = custom_prompt.ok_or_else(|| {
                Error::InvalidData("Custom analysis requires a prompt".to_string())
            })?;
            let focus = trailer(ctx, None);
            return Ok(format!(
                "Analyze the following financial data based on the user's specific request:\n\n\
                 Financial Summary:\n\
                 - Revenue: {revenue}\n\
                 - Expenses: {expenses}\n\
                 - Profit: {profit}\n\
                 - Margin: {margin}\n\n\
                 Recent Transactions:\n{sample}\n\n\
                 User Request: {request}\n\n\
                 Please provide a comprehensive analysis addressing the user's specific question or request.{focus}",
                sample = sample_json(&ctx.recent_records, CUSTOM_SAMPLE),
                focus = if focus.is_empty() {
                    String::new()
                } else {
                    format!("\n\n{}", focus)
                },
            ));
        }
    };

    let trailer = trailer(ctx, custom_prompt);
    if trailer.is_empty() {
        Ok(body)
    } else {
        Ok(format!("{}\n\n{}", body, trailer))
    }
}
