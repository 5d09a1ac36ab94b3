//! Narrative analysis
//!
//! Combines the aggregation engine with a narrative backend: compute the
//! summary and kind-specific metrics, build a bounded context, ask the model
//! for commentary, and persist the whole result.
//!
//! The narrative is best-effort. When no backend is configured or the call
//! fails, the numeric result is still returned and stored with
//! `NarrativeStatus::Unavailable`.

mod engine;
mod metrics;
mod types;

pub use engine::{AnalysisEngine, RECENT_RECORDS_FETCHED};
pub use metrics::{compute_metrics, FORECAST_EXPENSE_TREND, FORECAST_GROWTH_ESTIMATE};
pub use types::*;
