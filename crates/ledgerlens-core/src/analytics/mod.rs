//! Aggregation and scoring engine
//!
//! Pure functions that turn a set of financial records into summary
//! statistics, category breakdowns, daily trends, a merged profit timeline,
//! and the two heuristic scores used to frame narrative analysis.
//!
//! - `summary` - totals, counts, margin and date span
//! - `category` - per-category totals within one record type
//! - `trend` - per-day totals for one record type
//! - `merge` - revenue/expense trend alignment into a profit timeline
//! - `scores` - health and risk scores over a summary
//!
//! Nothing here performs I/O; records come from `Database::fetch_records`.

mod category;
mod merge;
mod scores;
mod summary;
mod trend;

pub use category::breakdown_by_category;
pub use merge::merge_profit_trend;
pub use scores::{health_score, risk_score, MAX_SCORE, MIN_SCORE};
pub use summary::summarize;
pub use trend::build_trend;

/// Profit as a percentage of revenue, defined as 0 when there is no revenue
pub fn margin_percent(profit: f64, revenue: f64) -> f64 {
    if revenue > 0.0 {
        profit / revenue * 100.0
    } else {
        0.0
    }
}
