use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::inputs::dtos::{InputFileResponseDto, UploadInputForm};
use crate::features::inputs::models::UploadStatus;
use crate::features::inputs::services::{IngestionService, NewUpload};
use crate::features::upload_proxy::handlers::read_submission;
use crate::features::upload_proxy::ProxyError;
use crate::shared::types::ApiResponse;

/// List the inputs of an opportunity, newest first
#[utoipa::path(
    get,
    path = "/api/opportunities/{id}/inputs",
    params(("id" = i64, Path, description = "Opportunity id")),
    responses(
        (status = 200, description = "Inputs of the opportunity", body = ApiResponse<Vec<InputFileResponseDto>>),
        (status = 404, description = "Opportunity not found")
    ),
    tag = "inputs"
)]
pub async fn list_inputs(
    State(service): State<Arc<IngestionService>>,
    Path(opportunity_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<InputFileResponseDto>>>> {
    let inputs = service.list(opportunity_id).await?;
    let dtos: Vec<InputFileResponseDto> = inputs.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::list(dtos)))
}

/// Upload a PDF input for an opportunity
///
/// The file is relayed to the workflow webhook before the response is sent.
/// A relay failure still returns the recorded row, with status `failed`.
#[utoipa::path(
    post,
    path = "/api/opportunities/{id}/inputs",
    params(("id" = i64, Path, description = "Opportunity id")),
    request_body(
        content = UploadInputForm,
        content_type = "multipart/form-data",
        description = "PDF file plus uploader id",
    ),
    responses(
        (status = 201, description = "Input recorded; check upload_status", body = ApiResponse<InputFileResponseDto>),
        (status = 400, description = "Missing file, wrong type, too large or bad uploader id"),
        (status = 404, description = "Opportunity not found"),
        (status = 502, description = "Upload webhook not configured")
    ),
    tag = "inputs"
)]
pub async fn create_input(
    State(service): State<Arc<IngestionService>>,
    Path(opportunity_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<InputFileResponseDto>>)> {
    let upload = read_upload(&mut multipart).await?;
    let input = service.ingest(opportunity_id, upload).await?;
    let message = outcome_message(&input.upload_status, input.error_message.as_deref());

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(input.into()), Some(message), None)),
    ))
}

/// Retry a failed input with a fresh copy of the file
#[utoipa::path(
    post,
    path = "/api/inputs/{id}/retry",
    params(("id" = i64, Path, description = "Input id")),
    request_body(
        content = UploadInputForm,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 200, description = "Retry finished; check upload_status", body = ApiResponse<InputFileResponseDto>),
        (status = 400, description = "Missing file, wrong type, too large or bad uploader id"),
        (status = 404, description = "Input not found"),
        (status = 409, description = "Input is not in failed state")
    ),
    tag = "inputs"
)]
pub async fn retry_input(
    State(service): State<Arc<IngestionService>>,
    Path(input_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<InputFileResponseDto>>> {
    let upload = read_upload(&mut multipart).await?;
    let input = service.retry(input_id, upload).await?;
    let message = outcome_message(&input.upload_status, input.error_message.as_deref());

    Ok(Json(ApiResponse::success(
        Some(input.into()),
        Some(message),
        None,
    )))
}

/// Delete an input row
#[utoipa::path(
    delete,
    path = "/api/inputs/{id}",
    params(("id" = i64, Path, description = "Input id")),
    responses(
        (status = 200, description = "Input deleted"),
        (status = 404, description = "Input not found")
    ),
    tag = "inputs"
)]
pub async fn delete_input(
    State(service): State<Arc<IngestionService>>,
    Path(input_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(input_id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Input deleted successfully".to_string()),
        None,
    )))
}

async fn read_upload(multipart: &mut Multipart) -> Result<NewUpload> {
    let submission = read_submission(multipart)
        .await
        .map_err(|e| AppError::BadRequest(e.describe()))?;

    let uploaded_by = Uuid::parse_str(submission.uploaded_by.trim())
        .map_err(|_| AppError::Validation("uploaded_by must be a profile id".to_string()))?;

    let file = submission
        .file
        .ok_or_else(|| AppError::BadRequest(ProxyError::MissingFile.describe()))?;

    Ok(NewUpload {
        file,
        file_name: submission.file_name,
        uploaded_by,
    })
}

fn outcome_message(status: &UploadStatus, error: Option<&str>) -> String {
    match (status, error) {
        (UploadStatus::Completed, _) => "File uploaded successfully".to_string(),
        (_, Some(error)) => format!("Upload failed: {}", error),
        _ => format!("Upload {}", status),
    }
}
