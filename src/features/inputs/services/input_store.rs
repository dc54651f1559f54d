use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::inputs::models::{CreateInputFile, InputFile, RetryInputFile, UploadStatus};

const INPUT_COLUMNS: &str = "id, opportunity_id, file_name, file_size, mime_type, upload_status, \
     gdrive_file_name, gdrive_web_url, uploaded_by, uploaded_at, error_message";

/// Persistence for input rows.
///
/// Status updates only apply from the states `UploadStatus::can_transition_to`
/// allows; anything else is reported as a conflict.
#[async_trait]
pub trait InputStore: Send + Sync + 'static {
    /// True when the opportunity exists and is not soft-deleted
    async fn opportunity_exists(&self, opportunity_id: i64) -> Result<bool>;

    /// Newest first
    async fn list_for_opportunity(&self, opportunity_id: i64) -> Result<Vec<InputFile>>;

    async fn get(&self, id: i64) -> Result<Option<InputFile>>;

    /// Inserts a `processing` row with placeholder identifiers
    async fn create_processing(&self, input: CreateInputFile) -> Result<InputFile>;

    /// failed → processing, replacing the file metadata and clearing the error
    async fn mark_processing(&self, id: i64, retry: RetryInputFile) -> Result<InputFile>;

    /// processing → completed
    async fn mark_completed(
        &self,
        id: i64,
        gdrive_file_name: &str,
        gdrive_web_url: &str,
    ) -> Result<InputFile>;

    /// processing → failed
    async fn mark_failed(&self, id: i64, error_message: &str) -> Result<InputFile>;

    /// Returns false when no row was deleted
    async fn delete(&self, id: i64) -> Result<bool>;
}

pub(crate) fn transition_conflict(id: i64, next: UploadStatus) -> AppError {
    AppError::Conflict(format!(
        "Input {} cannot move to '{}' from its current status",
        id, next
    ))
}

/// Postgres-backed input store
pub struct PgInputStore {
    pool: PgPool,
}

impl PgInputStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn update_returning(
        &self,
        id: i64,
        next: UploadStatus,
        query: sqlx::query::QueryAs<'_, sqlx::Postgres, InputFile, sqlx::postgres::PgArguments>,
    ) -> Result<InputFile> {
        let updated = query.fetch_optional(&self.pool).await.map_err(|e| {
            tracing::error!("Failed to move input {} to {}: {:?}", id, next, e);
            AppError::Database(e)
        })?;

        match updated {
            Some(input) => Ok(input),
            None if self.get(id).await?.is_some() => Err(transition_conflict(id, next)),
            None => Err(AppError::NotFound(format!("Input {} not found", id))),
        }
    }
}

#[async_trait]
impl InputStore for PgInputStore {
    async fn opportunity_exists(&self, opportunity_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM opportunities WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(opportunity_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list_for_opportunity(&self, opportunity_id: i64) -> Result<Vec<InputFile>> {
        let sql = format!(
            "SELECT {} FROM inputs WHERE opportunity_id = $1 ORDER BY uploaded_at DESC, id DESC",
            INPUT_COLUMNS
        );
        let inputs = sqlx::query_as::<_, InputFile>(&sql)
            .bind(opportunity_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list inputs: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(inputs)
    }

    async fn get(&self, id: i64) -> Result<Option<InputFile>> {
        let sql = format!("SELECT {} FROM inputs WHERE id = $1", INPUT_COLUMNS);
        let input = sqlx::query_as::<_, InputFile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(input)
    }

    async fn create_processing(&self, input: CreateInputFile) -> Result<InputFile> {
        let sql = format!(
            r#"
            INSERT INTO inputs (opportunity_id, file_name, file_size, mime_type, upload_status, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            INPUT_COLUMNS
        );
        let created = sqlx::query_as::<_, InputFile>(&sql)
            .bind(input.opportunity_id)
            .bind(&input.file_name)
            .bind(input.file_size)
            .bind(&input.mime_type)
            .bind(UploadStatus::Processing.as_str())
            .bind(input.uploaded_by)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create input: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(created)
    }

    async fn mark_processing(&self, id: i64, retry: RetryInputFile) -> Result<InputFile> {
        let sql = format!(
            r#"
            UPDATE inputs
            SET file_name = $2, file_size = $3, mime_type = $4,
                upload_status = 'processing', error_message = NULL
            WHERE id = $1 AND upload_status = 'failed'
            RETURNING {}
            "#,
            INPUT_COLUMNS
        );
        let query = sqlx::query_as::<_, InputFile>(&sql)
            .bind(id)
            .bind(retry.file_name)
            .bind(retry.file_size)
            .bind(retry.mime_type);

        self.update_returning(id, UploadStatus::Processing, query)
            .await
    }

    async fn mark_completed(
        &self,
        id: i64,
        gdrive_file_name: &str,
        gdrive_web_url: &str,
    ) -> Result<InputFile> {
        let sql = format!(
            r#"
            UPDATE inputs
            SET gdrive_file_name = $2, gdrive_web_url = $3,
                upload_status = 'completed', error_message = NULL
            WHERE id = $1 AND upload_status = 'processing'
            RETURNING {}
            "#,
            INPUT_COLUMNS
        );
        let query = sqlx::query_as::<_, InputFile>(&sql)
            .bind(id)
            .bind(gdrive_file_name.to_string())
            .bind(gdrive_web_url.to_string());

        self.update_returning(id, UploadStatus::Completed, query)
            .await
    }

    async fn mark_failed(&self, id: i64, error_message: &str) -> Result<InputFile> {
        let sql = format!(
            r#"
            UPDATE inputs
            SET upload_status = 'failed', error_message = $2
            WHERE id = $1 AND upload_status = 'processing'
            RETURNING {}
            "#,
            INPUT_COLUMNS
        );
        let query = sqlx::query_as::<_, InputFile>(&sql)
            .bind(id)
            .bind(error_message.to_string());

        self.update_returning(id, UploadStatus::Failed, query).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM inputs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
