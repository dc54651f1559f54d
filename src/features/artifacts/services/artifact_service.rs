use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::artifacts::models::{ArtifactDoc, NewArtifact};

const ARTIFACT_COLUMNS: &str =
    "id, opportunity_id, file_name, gdrive_file_name, gdrive_web_url, generated_by, generated_at";

pub struct ArtifactService {
    pool: PgPool,
}

impl ArtifactService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Artifacts of an opportunity, newest first
    pub async fn list_for_opportunity(&self, opportunity_id: i64) -> Result<Vec<ArtifactDoc>> {
        let sql = format!(
            "SELECT {} FROM artifacts WHERE opportunity_id = $1 ORDER BY generated_at DESC, id DESC",
            ARTIFACT_COLUMNS
        );
        let artifacts = sqlx::query_as::<_, ArtifactDoc>(&sql)
            .bind(opportunity_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to fetch artifacts for opportunity {}: {:?}",
                    opportunity_id,
                    e
                );
                AppError::Database(e)
            })?;

        Ok(artifacts)
    }

    pub async fn list(&self, opportunity_id: i64) -> Result<Vec<ArtifactDoc>> {
        self.opportunity_name(opportunity_id).await?;
        self.list_for_opportunity(opportunity_id).await
    }

    /// Records a placeholder document for the opportunity
    pub async fn generate(&self, opportunity_id: i64, generated_by: Uuid) -> Result<ArtifactDoc> {
        let name = self.opportunity_name(opportunity_id).await?;
        let artifact = NewArtifact::placeholder(opportunity_id, &name, generated_by, Utc::now());

        let sql = format!(
            r#"
            INSERT INTO artifacts (opportunity_id, file_name, gdrive_file_name, gdrive_web_url, generated_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ARTIFACT_COLUMNS
        );
        let created = sqlx::query_as::<_, ArtifactDoc>(&sql)
            .bind(artifact.opportunity_id)
            .bind(&artifact.file_name)
            .bind(&artifact.gdrive_file_name)
            .bind(&artifact.gdrive_web_url)
            .bind(artifact.generated_by)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create artifact: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!(
            "Generated artifact {} for opportunity {}",
            created.id,
            opportunity_id
        );
        Ok(created)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM artifacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Artifact {} not found", id)));
        }
        Ok(())
    }

    async fn opportunity_name(&self, opportunity_id: i64) -> Result<String> {
        sqlx::query_scalar::<_, String>(
            "SELECT name FROM opportunities WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(opportunity_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Opportunity {} not found", opportunity_id)))
    }
}
