//! Report handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::datasets::owned_dataset;
use crate::{get_user_email, AppError, AppState};
use ledgerlens_core::models::{DataSummary, ExpenseAnalysis, ProfitAnalysis, RevenueAnalysis};

/// Inclusive date window for reports (YYYY-MM-DD)
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Parse optional `from`/`to` query values into an inclusive window
pub(crate) fn parse_window(
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), AppError> {
    let from_date = from
        .filter(|s| !s.is_empty())
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .map_err(|_| AppError::bad_request("Invalid from date format (use YYYY-MM-DD)"))?;

    let to_date = to
        .filter(|s| !s.is_empty())
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .map_err(|_| AppError::bad_request("Invalid to date format (use YYYY-MM-DD)"))?;

    if let (Some(from), Some(to)) = (from_date, to_date) {
        if from > to {
            return Err(AppError::bad_request("from date must not be after to date"));
        }
    }

    Ok((from_date, to_date))
}

fn audit_report(
    state: &AppState,
    user_email: &str,
    report: &str,
    dataset_id: i64,
    window: (Option<NaiveDate>, Option<NaiveDate>),
) -> Result<(), AppError> {
    state.db.log_audit(
        user_email,
        "report",
        Some(report),
        Some(dataset_id),
        Some(&format!("from={:?}, to={:?}", window.0, window.1)),
    )?;
    Ok(())
}

/// GET /api/datasets/:id/summary - Aggregate figures for a dataset
pub async fn report_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<ReportQuery>,
    headers: HeaderMap,
) -> Result<Json<DataSummary>, AppError> {
    let user_email = get_user_email(&headers);
    let dataset = owned_dataset(&state, id, &user_email)?;
    let (from, to) = parse_window(params.from.as_deref(), params.to.as_deref())?;

    let summary = state.db.data_summary(dataset.id, from, to)?;

    audit_report(&state, &user_email, "summary", dataset.id, (from, to))?;

    Ok(Json(summary))
}

/// GET /api/datasets/:id/revenue - Revenue by category and daily trend
pub async fn report_revenue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<ReportQuery>,
    headers: HeaderMap,
) -> Result<Json<RevenueAnalysis>, AppError> {
    let user_email = get_user_email(&headers);
    let dataset = owned_dataset(&state, id, &user_email)?;
    let (from, to) = parse_window(params.from.as_deref(), params.to.as_deref())?;

    let report = state.db.revenue_analysis(dataset.id, from, to)?;

    audit_report(&state, &user_email, "revenue", dataset.id, (from, to))?;

    Ok(Json(report))
}

/// GET /api/datasets/:id/expenses - Expenses by category and daily trend
pub async fn report_expenses(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<ReportQuery>,
    headers: HeaderMap,
) -> Result<Json<ExpenseAnalysis>, AppError> {
    let user_email = get_user_email(&headers);
    let dataset = owned_dataset(&state, id, &user_email)?;
    let (from, to) = parse_window(params.from.as_deref(), params.to.as_deref())?;

    let report = state.db.expense_analysis(dataset.id, from, to)?;

    audit_report(&state, &user_email, "expenses", dataset.id, (from, to))?;

    Ok(Json(report))
}

/// GET /api/datasets/:id/profit - Merged daily profit timeline with totals
pub async fn report_profit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<ReportQuery>,
    headers: HeaderMap,
) -> Result<Json<ProfitAnalysis>, AppError> {
    let user_email = get_user_email(&headers);
    let dataset = owned_dataset(&state, id, &user_email)?;
    let (from, to) = parse_window(params.from.as_deref(), params.to.as_deref())?;

    let report = state.db.profit_analysis(dataset.id, from, to)?;

    audit_report(&state, &user_email, "profit", dataset.id, (from, to))?;

    Ok(Json(report))
}
