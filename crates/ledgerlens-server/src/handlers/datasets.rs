//! Dataset handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

use crate::{get_user_email, AppError, AppState, SuccessResponse, MAX_PAGE_LIMIT};
use ledgerlens_core::models::{Dataset, DatasetUpdate, NewDataset};

/// Query parameters for listing datasets
#[derive(Debug, Deserialize)]
pub struct ListDatasetsQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_dataset_limit")]
    pub limit: i64,
}

fn default_dataset_limit() -> i64 {
    100
}

/// Load a dataset owned by the requester or fail with 404
pub(crate) fn owned_dataset(state: &AppState, id: i64, user: &str) -> Result<Dataset, AppError> {
    state
        .db
        .get_dataset(id, user)?
        .ok_or_else(|| AppError::not_found(&format!("Dataset {} not found", id)))
}

/// GET /api/datasets - List the requester's datasets, newest first
pub async fn list_datasets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListDatasetsQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<Dataset>>, AppError> {
    let user_email = get_user_email(&headers);
    let skip = params.skip.max(0);
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);

    let datasets = state.db.list_datasets(&user_email, skip, limit)?;

    state.db.log_audit(
        &user_email,
        "list",
        Some("dataset"),
        None,
        Some(&format!("skip={}, limit={}, count={}", skip, limit, datasets.len())),
    )?;

    Ok(Json(datasets))
}

/// POST /api/datasets - Create a dataset
pub async fn create_dataset(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<NewDataset>,
) -> Result<(StatusCode, Json<Dataset>), AppError> {
    let user_email = get_user_email(&headers);

    if body.name.trim().is_empty() {
        return Err(AppError::bad_request("Dataset name is required"));
    }

    let dataset = state.db.create_dataset(&user_email, &body)?;

    state.db.log_audit(
        &user_email,
        "create",
        Some("dataset"),
        Some(dataset.id),
        Some(&format!("name={}", dataset.name)),
    )?;

    Ok((StatusCode::CREATED, Json(dataset)))
}

/// GET /api/datasets/:id - Get a single dataset
pub async fn get_dataset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Dataset>, AppError> {
    let user_email = get_user_email(&headers);
    let dataset = owned_dataset(&state, id, &user_email)?;

    state
        .db
        .log_audit(&user_email, "view", Some("dataset"), Some(id), None)?;

    Ok(Json(dataset))
}

/// PUT /api/datasets/:id - Update name, description or source path
pub async fn update_dataset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<DatasetUpdate>,
) -> Result<Json<Dataset>, AppError> {
    let user_email = get_user_email(&headers);

    if body.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::bad_request("Dataset name cannot be empty"));
    }

    let dataset = state
        .db
        .update_dataset(id, &user_email, &body)?
        .ok_or_else(|| AppError::not_found(&format!("Dataset {} not found", id)))?;

    state.db.log_audit(
        &user_email,
        "update",
        Some("dataset"),
        Some(id),
        Some(&format!("name={}", dataset.name)),
    )?;

    Ok(Json(dataset))
}

/// DELETE /api/datasets/:id - Delete a dataset with its records and analyses
pub async fn delete_dataset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_email = get_user_email(&headers);

    if !state.db.delete_dataset(id, &user_email)? {
        return Err(AppError::not_found(&format!("Dataset {} not found", id)));
    }

    state
        .db
        .log_audit(&user_email, "delete", Some("dataset"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}
