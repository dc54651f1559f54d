use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::artifacts::models::ArtifactDoc;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct GenerateArtifactDto {
    /// Profile id of the requesting user
    pub generated_by: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArtifactResponseDto {
    pub id: i64,
    pub opportunity_id: i64,
    pub file_name: String,
    pub gdrive_file_name: String,
    pub gdrive_web_url: String,
    pub generated_by: Uuid,
    pub generated_at: DateTime<Utc>,
}

impl From<ArtifactDoc> for ArtifactResponseDto {
    fn from(artifact: ArtifactDoc) -> Self {
        Self {
            id: artifact.id,
            opportunity_id: artifact.opportunity_id,
            file_name: artifact.file_name,
            gdrive_file_name: artifact.gdrive_file_name,
            gdrive_web_url: artifact.gdrive_web_url,
            generated_by: artifact.generated_by,
            generated_at: artifact.generated_at,
        }
    }
}
