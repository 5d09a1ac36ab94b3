//! Financial record handlers: listing, JSON batch insert and file upload

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::datasets::owned_dataset;
use super::reports::parse_window;
use crate::{get_user_email, AppError, AppState, MAX_PAGE_LIMIT, MAX_UPLOAD_SIZE};
use ledgerlens_core::db::RecordQuery;
use ledgerlens_core::import::{parse_file, ImportFormat, SUPPORTED_EXTENSIONS};
use ledgerlens_core::models::{
    BulkInsertReport, DatasetUpdate, FinancialRecord, NewRecord, RecordType,
};

/// Query parameters for listing records
#[derive(Debug, Deserialize)]
pub struct ListRecordsQuery {
    #[serde(default = "default_record_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    /// revenue, expense, asset, liability or equity
    pub record_type: Option<String>,
    pub category: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

fn default_record_limit() -> i64 {
    100
}

/// Paginated record listing
#[derive(Serialize)]
pub struct RecordsResponse {
    pub records: Vec<FinancialRecord>,
    /// Number of records matching the filters, ignoring pagination
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Result of a file upload
#[derive(Serialize)]
pub struct UploadResponse {
    pub dataset_id: i64,
    pub file_name: Option<String>,
    #[serde(flatten)]
    pub report: BulkInsertReport,
}

/// Accepted upload formats and limits
#[derive(Serialize)]
pub struct UploadStatusResponse {
    pub status: String,
    /// File extensions, without the dot
    pub supported_formats: Vec<String>,
    /// Maximum upload size in bytes
    pub max_file_size: usize,
}

/// GET /api/upload-status - What the upload endpoint accepts
pub async fn upload_status() -> Json<UploadStatusResponse> {
    Json(UploadStatusResponse {
        status: "ready".to_string(),
        supported_formats: SUPPORTED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        max_file_size: MAX_UPLOAD_SIZE,
    })
}

/// GET /api/datasets/:id/records - List records, newest first
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<ListRecordsQuery>,
    headers: HeaderMap,
) -> Result<Json<RecordsResponse>, AppError> {
    let user_email = get_user_email(&headers);
    let dataset = owned_dataset(&state, id, &user_email)?;

    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);
    let offset = params.offset.max(0);
    let (from, to) = parse_window(params.from.as_deref(), params.to.as_deref())?;
    let record_type = params
        .record_type
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(str::parse::<RecordType>)
        .transpose()
        .map_err(|e| AppError::bad_request(&e))?;
    let category = params.category.filter(|c| !c.trim().is_empty());

    let query = RecordQuery::new(dataset.id)
        .record_type(record_type)
        .window(from, to)
        .category(category);
    let total = state.db.count_matching_records(&query)?;
    let records = state
        .db
        .fetch_records(&query.limit(Some(limit)).offset(offset))?;

    state.db.log_audit(
        &user_email,
        "list",
        Some("record"),
        Some(dataset.id),
        Some(&format!(
            "limit={}, offset={}, type={:?}, from={:?}, to={:?}, returned={}",
            limit,
            offset,
            record_type,
            from,
            to,
            records.len()
        )),
    )?;

    Ok(Json(RecordsResponse {
        records,
        total,
        limit,
        offset,
    }))
}

/// POST /api/datasets/:id/records - Insert a batch of records
///
/// Rows are inserted independently; failures are reported per index and do
/// not roll back the rest of the batch.
pub async fn create_records(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(records): Json<Vec<NewRecord>>,
) -> Result<Json<BulkInsertReport>, AppError> {
    let user_email = get_user_email(&headers);
    let dataset = owned_dataset(&state, id, &user_email)?;

    if records.is_empty() {
        return Err(AppError::bad_request("No records provided"));
    }
    if records.len() as i64 > MAX_PAGE_LIMIT * 10 {
        return Err(AppError::bad_request(&format!(
            "Too many records in one request (maximum {})",
            MAX_PAGE_LIMIT * 10
        )));
    }

    let report = state.db.insert_records_bulk(dataset.id, &records)?;

    state.db.log_audit(
        &user_email,
        "create",
        Some("record"),
        Some(dataset.id),
        Some(&format!(
            "total={}, inserted={}, duplicates={}, failed={}",
            report.total_records,
            report.successful_records,
            report.duplicate_records,
            report.failed_records
        )),
    )?;

    Ok(Json(report))
}

/// POST /api/datasets/:id/upload - Import records from a CSV or Excel file
///
/// Expects multipart form with:
/// - file: .csv, .xlsx or .xls file (required, max 10MB). A file sent
///   without a name is read as CSV.
pub async fn upload_records(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let user_email = get_user_email(&headers);
    let dataset = owned_dataset(&state, id, &user_email)?;

    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut format = ImportFormat::Csv;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        file_name = field.file_name().map(str::to_string);
        if let Some(name) = &file_name {
            format = ImportFormat::from_file_name(name).ok_or_else(|| {
                AppError::bad_request(
                    "Unsupported file type. Only .csv, .xlsx and .xls files can be imported",
                )
            })?;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::bad_request("Failed to read file data"))?;

        if bytes.len() > MAX_UPLOAD_SIZE {
            return Err(AppError::payload_too_large(&format!(
                "File too large. Maximum size is {} MB",
                MAX_UPLOAD_SIZE / 1024 / 1024
            )));
        }

        file_data = Some(bytes.to_vec());
    }

    let file_data = file_data.ok_or_else(|| AppError::bad_request("Missing file field"))?;
    if file_data.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::bad_request("Uploaded file is empty"));
    }

    let records = parse_file(format, &file_data, dataset.id)?;
    let report = state.db.insert_records_bulk(dataset.id, &records)?;

    if dataset.file_path.is_none() {
        if let Some(name) = &file_name {
            state.db.update_dataset(
                dataset.id,
                &user_email,
                &DatasetUpdate {
                    file_path: Some(name.clone()),
                    ..Default::default()
                },
            )?;
        }
    }

    info!(
        dataset_id = dataset.id,
        inserted = report.successful_records,
        duplicates = report.duplicate_records,
        failed = report.failed_records,
        ?format,
        "Upload imported"
    );

    state.db.log_audit(
        &user_email,
        "import",
        Some("dataset"),
        Some(dataset.id),
        Some(&format!(
            "file={:?}, bytes={}, inserted={}, duplicates={}, failed={}",
            file_name,
            file_data.len(),
            report.successful_records,
            report.duplicate_records,
            report.failed_records
        )),
    )?;

    Ok(Json(UploadResponse {
        dataset_id: dataset.id,
        file_name,
        report,
    }))
}
