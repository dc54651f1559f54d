use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::inputs::models::{InputFile, UploadStatus};

/// Input file as returned by the tracker API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InputFileResponseDto {
    pub id: i64,
    pub opportunity_id: i64,
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub upload_status: UploadStatus,
    /// Storage identifier; `pending` until the upload completes
    pub gdrive_file_name: String,
    pub gdrive_web_url: String,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<InputFile> for InputFileResponseDto {
    fn from(input: InputFile) -> Self {
        Self {
            id: input.id,
            opportunity_id: input.opportunity_id,
            file_name: input.file_name,
            file_size: input.file_size,
            mime_type: input.mime_type,
            upload_status: input.upload_status,
            gdrive_file_name: input.gdrive_file_name,
            gdrive_web_url: input.gdrive_web_url,
            uploaded_by: input.uploaded_by,
            uploaded_at: input.uploaded_at,
            error_message: input.error_message,
        }
    }
}

/// Multipart form for ingest and retry (Swagger UI documentation only)
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadInputForm {
    #[schema(format = Binary, content_media_type = "application/pdf")]
    pub file: String,
    /// Display name; defaults to the uploaded file's name
    pub file_name: Option<String>,
    /// Profile id of the uploader
    pub uploaded_by: Uuid,
}
