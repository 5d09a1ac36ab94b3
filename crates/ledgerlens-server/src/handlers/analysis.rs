//! Analysis handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use super::reports::parse_window;
use crate::{get_user_email, AppError, AppState, MAX_PAGE_LIMIT};
use ledgerlens_core::analysis::{AnalysisKind, AnalysisOutcome, AnalysisRequest, StoredAnalysis};
use ledgerlens_core::db::DEFAULT_HISTORY_LIMIT;
use ledgerlens_core::prompts::{preset_insights, PresetInsight};

/// Request body for running an analysis
#[derive(Debug, Deserialize)]
pub struct AnalyzeBody {
    /// trend, health, comparative, risk, forecast or custom
    pub analysis_type: String,
    pub custom_prompt: Option<String>,
    pub focus_categories: Option<Vec<String>>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// Query parameters for analysis history
#[derive(Debug, Deserialize)]
pub struct ListAnalysesQuery {
    pub dataset_id: Option<i64>,
    pub kind: Option<String>,
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 {
    DEFAULT_HISTORY_LIMIT
}

/// POST /api/datasets/:id/analyze - Run and store an analysis
///
/// The numeric part always completes; when the narrative backend is missing
/// or fails the result carries `narrative_status: "unavailable"`.
pub async fn run_analysis(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<AnalyzeBody>,
) -> Result<Json<AnalysisOutcome>, AppError> {
    let user_email = get_user_email(&headers);

    let kind: AnalysisKind = body.analysis_type.parse()?;
    let (from, to) = parse_window(body.date_from.as_deref(), body.date_to.as_deref())?;
    let focus = body
        .focus_categories
        .map(|f| {
            f.into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|f| !f.is_empty());

    let request = AnalysisRequest::new(id, &user_email, kind)
        .with_prompt(body.custom_prompt)
        .with_focus(focus)
        .with_window(from, to);

    let outcome = state.engine.run(&request).await?;

    state.db.log_audit(
        &user_email,
        "analyze",
        Some("dataset"),
        Some(id),
        Some(&format!(
            "kind={}, analysis_id={}, narrative={}",
            kind,
            outcome.analysis_id,
            outcome.result.narrative_status.as_str()
        )),
    )?;

    Ok(Json(outcome))
}

/// GET /api/analyses - Analysis history, newest first
pub async fn list_analyses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListAnalysesQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<StoredAnalysis>>, AppError> {
    let user_email = get_user_email(&headers);
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);
    let kind = params
        .kind
        .as_deref()
        .filter(|k| !k.is_empty())
        .map(str::parse::<AnalysisKind>)
        .transpose()?;

    let analyses = state
        .db
        .list_analyses(&user_email, params.dataset_id, kind, limit)?;

    state.db.log_audit(
        &user_email,
        "list",
        Some("analysis"),
        params.dataset_id,
        Some(&format!(
            "kind={:?}, limit={}, returned={}",
            kind,
            limit,
            analyses.len()
        )),
    )?;

    Ok(Json(analyses))
}

/// GET /api/analyses/:id - A single stored analysis
pub async fn get_analysis(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<StoredAnalysis>, AppError> {
    let user_email = get_user_email(&headers);

    let analysis = state
        .db
        .get_analysis(id, &user_email)?
        .ok_or_else(|| AppError::not_found(&format!("Analysis {} not found", id)))?;

    state
        .db
        .log_audit(&user_email, "view", Some("analysis"), Some(id), None)?;

    Ok(Json(analysis))
}

/// GET /api/insights - Preset questions to start an analysis from
pub async fn list_preset_insights() -> Json<Vec<PresetInsight>> {
    Json(preset_insights())
}
