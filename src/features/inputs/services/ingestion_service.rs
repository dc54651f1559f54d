use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::inputs::models::{
    is_placeholder, CreateInputFile, InputFile, RetryInputFile, UploadStatus,
};
use crate::features::inputs::services::InputStore;
use crate::features::upload_proxy::dtos::{FilePart, UploadSubmission};
use crate::features::upload_proxy::{ProxyError, UploadProxyService};

/// Fallback display name when neither the form nor the file part names the upload
const DEFAULT_FILE_NAME: &str = "document.pdf";

/// A file handed to ingestion, already read from the request
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub file: FilePart,
    /// Display name override; empty means "use the file's own name"
    pub file_name: Option<String>,
    pub uploaded_by: Uuid,
}

impl NewUpload {
    fn display_name(&self) -> String {
        self.file_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .or(self.file.file_name.as_deref())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string()
    }
}

/// Records input rows around a relay through the upload proxy
pub struct IngestionService {
    store: Arc<dyn InputStore>,
    proxy: Arc<UploadProxyService>,
}

impl IngestionService {
    pub fn new(store: Arc<dyn InputStore>, proxy: Arc<UploadProxyService>) -> Self {
        Self { store, proxy }
    }

    pub async fn list(&self, opportunity_id: i64) -> Result<Vec<InputFile>> {
        self.ensure_opportunity(opportunity_id).await?;
        self.store.list_for_opportunity(opportunity_id).await
    }

    /// Creates a `processing` row, relays the file and records the outcome.
    /// The returned row is either `completed` or `failed`.
    pub async fn ingest(&self, opportunity_id: i64, upload: NewUpload) -> Result<InputFile> {
        self.precheck(&upload)?;
        self.ensure_opportunity(opportunity_id).await?;

        let file_name = upload.display_name();
        let input = self
            .store
            .create_processing(CreateInputFile {
                opportunity_id,
                file_name: file_name.clone(),
                file_size: upload.file.size as i64,
                mime_type: upload.file.content_type.clone(),
                uploaded_by: upload.uploaded_by,
            })
            .await?;

        info!(
            "Created input {} for opportunity {} ({})",
            input.id, opportunity_id, file_name
        );

        self.relay_and_record(input, upload, file_name).await
    }

    /// Re-runs a failed upload with a fresh copy of the file
    pub async fn retry(&self, input_id: i64, upload: NewUpload) -> Result<InputFile> {
        self.precheck(&upload)?;

        let current = self
            .store
            .get(input_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Input {} not found", input_id)))?;

        if !current
            .upload_status
            .can_transition_to(UploadStatus::Processing)
        {
            return Err(AppError::Conflict(format!(
                "Only failed uploads can be retried; input {} is {}",
                input_id, current.upload_status
            )));
        }

        let file_name = upload.display_name();
        let input = self
            .store
            .mark_processing(
                input_id,
                RetryInputFile {
                    file_name: file_name.clone(),
                    file_size: upload.file.size as i64,
                    mime_type: upload.file.content_type.clone(),
                },
            )
            .await?;

        info!("Retrying input {} ({})", input_id, file_name);

        self.relay_and_record(input, upload, file_name).await
    }

    pub async fn delete(&self, input_id: i64) -> Result<()> {
        if !self.store.delete(input_id).await? {
            return Err(AppError::NotFound(format!("Input {} not found", input_id)));
        }
        info!("Deleted input {}", input_id);
        Ok(())
    }

    /// Nothing is written for requests the proxy would reject outright
    fn precheck(&self, upload: &NewUpload) -> Result<()> {
        if !self.proxy.is_configured() {
            return Err(AppError::ExternalServiceError(
                ProxyError::NotConfigured.describe(),
            ));
        }
        upload
            .file
            .check()
            .map_err(|e| AppError::Validation(e.describe()))
    }

    async fn ensure_opportunity(&self, opportunity_id: i64) -> Result<()> {
        if self.store.opportunity_exists(opportunity_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "Opportunity {} not found",
                opportunity_id
            )))
        }
    }

    /// The relay runs on its own task so the row is settled even when the
    /// request that started it goes away.
    async fn relay_and_record(
        &self,
        input: InputFile,
        upload: NewUpload,
        file_name: String,
    ) -> Result<InputFile> {
        let input_id = input.id;
        let task = tokio::spawn(settle(
            Arc::clone(&self.store),
            Arc::clone(&self.proxy),
            input,
            upload,
            file_name,
        ));

        task.await.map_err(|e| {
            AppError::Internal(format!("Relay task for input {} failed: {}", input_id, e))
        })?
    }
}

/// Relays one upload and moves its row out of `processing`
async fn settle(
    store: Arc<dyn InputStore>,
    proxy: Arc<UploadProxyService>,
    input: InputFile,
    upload: NewUpload,
    file_name: String,
) -> Result<InputFile> {
    let submission = UploadSubmission {
        file: Some(upload.file),
        input_id: input.id.to_string(),
        opportunity_id: input.opportunity_id.to_string(),
        file_name: Some(file_name),
        uploaded_by: upload.uploaded_by.to_string(),
    };

    let failure = match proxy.relay(submission).await {
        Ok(relayed)
            if !is_placeholder(&relayed.result.gdrive_file_name)
                && !is_placeholder(&relayed.result.gdrive_web_url) =>
        {
            match store
                .mark_completed(
                    input.id,
                    &relayed.result.gdrive_file_name,
                    &relayed.result.gdrive_web_url,
                )
                .await
            {
                Ok(completed) => return Ok(completed),
                Err(e) => {
                    warn!("Input {} relayed but not marked completed: {}", input.id, e);
                    format!("Upload succeeded but its result was not recorded: {}", e)
                }
            }
        }
        Ok(_) => {
            warn!("Input {} got placeholder storage identifiers", input.id);
            "Webhook returned placeholder storage identifiers".to_string()
        }
        Err(e) => {
            warn!(
                "Input {} relay failed ({:?}, retryable: {})",
                input.id,
                e.kind(),
                e.is_retryable()
            );
            e.describe()
        }
    };

    store.mark_failed(input.id, &failure).await
}
