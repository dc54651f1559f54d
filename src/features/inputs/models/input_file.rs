use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Identifier value written before the workflow has stored the file
pub const PLACEHOLDER_IDENTIFIER: &str = "pending";

/// Upload lifecycle of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown upload status '{0}'")]
pub struct UnknownUploadStatus(pub String);

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Processing => "processing",
            UploadStatus::Completed => "completed",
            UploadStatus::Failed => "failed",
        }
    }

    /// processing → completed | failed, failed → processing (retry)
    pub fn can_transition_to(self, next: UploadStatus) -> bool {
        matches!(
            (self, next),
            (UploadStatus::Processing, UploadStatus::Completed)
                | (UploadStatus::Processing, UploadStatus::Failed)
                | (UploadStatus::Failed, UploadStatus::Processing)
        )
    }
}

impl std::fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for UploadStatus {
    type Error = UnknownUploadStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "processing" => Ok(UploadStatus::Processing),
            "completed" => Ok(UploadStatus::Completed),
            "failed" => Ok(UploadStatus::Failed),
            _ => Err(UnknownUploadStatus(value)),
        }
    }
}

/// True when a storage identifier or URL still holds the creation placeholder
pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == PLACEHOLDER_IDENTIFIER
}

/// Database model for inputs
#[derive(Debug, Clone, FromRow)]
pub struct InputFile {
    pub id: i64,
    pub opportunity_id: i64,
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
    #[sqlx(try_from = "String")]
    pub upload_status: UploadStatus,
    pub gdrive_file_name: String,
    pub gdrive_web_url: String,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
    pub error_message: Option<String>,
}

/// Values for a freshly created `processing` row
#[derive(Debug, Clone)]
pub struct CreateInputFile {
    pub opportunity_id: i64,
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub uploaded_by: Uuid,
}

/// File metadata replaced when a failed input is retried
#[derive(Debug, Clone)]
pub struct RetryInputFile {
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
}
