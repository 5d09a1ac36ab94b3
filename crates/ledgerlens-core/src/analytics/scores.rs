//! Heuristic health and risk scores
//!
//! Both scores start at 5.0, apply additive rules over a `DataSummary`, and
//! clamp to `[MIN_SCORE, MAX_SCORE]`. They are coarse framing hints for the
//! narrative prompt, not ratings.

use crate::models::DataSummary;

pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 10.0;

const BASE_SCORE: f64 = 5.0;

/// Financial health score (higher is healthier)
pub fn health_score(summary: &DataSummary) -> f64 {
    let mut score = BASE_SCORE;

    let margin = summary.profit_margin;
    if margin > 20.0 {
        score += 2.0;
    } else if margin > 10.0 {
        score += 1.0;
    } else if margin < 0.0 {
        score -= 3.0;
    }

    let revenue = summary.total_revenue;
    if revenue > 1_000_000.0 {
        score += 1.0;
    } else if revenue < 10_000.0 {
        score -= 1.0;
    }

    if summary.total_records > 100 {
        score += 0.5;
    }

    score.clamp(MIN_SCORE, MAX_SCORE)
}

/// Risk score (higher is riskier)
///
/// The low-revenue rule fires for zero revenue as well, so an empty dataset
/// scores as risky.
pub fn risk_score(summary: &DataSummary) -> f64 {
    let mut score = BASE_SCORE;

    let margin = summary.profit_margin;
    if margin < 0.0 {
        score += 3.0;
    } else if margin < 5.0 {
        score += 2.0;
    } else if margin > 20.0 {
        score -= 2.0;
    }

    if summary.total_revenue < 50_000.0 {
        score += 1.0;
    }

    score.clamp(MIN_SCORE, MAX_SCORE)
}
