use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::core::error::{AppError, Result};
use crate::features::inputs::models::{
    CreateInputFile, InputFile, RetryInputFile, UploadStatus, PLACEHOLDER_IDENTIFIER,
};
use crate::features::inputs::services::input_store::{transition_conflict, InputStore};

/// In-memory input store for tests
#[derive(Clone, Default)]
pub struct FakeInputStore {
    opportunities: Arc<RwLock<HashSet<i64>>>,
    inputs: Arc<RwLock<HashMap<i64, InputFile>>>,
    completions_fail: Arc<AtomicBool>,
}

impl FakeInputStore {
    pub fn with_opportunity(opportunity_id: i64) -> Self {
        let store = Self::default();
        store.opportunities.write().unwrap().insert(opportunity_id);
        store
    }

    pub fn snapshot(&self, id: i64) -> Option<InputFile> {
        self.inputs.read().unwrap().get(&id).cloned()
    }

    /// Makes every `mark_completed` fail the way a dropped connection would
    pub fn fail_completions(&self) {
        self.completions_fail.store(true, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.inputs.read().unwrap().len()
    }

    fn transition(
        &self,
        id: i64,
        next: UploadStatus,
        apply: impl FnOnce(&mut InputFile),
    ) -> Result<InputFile> {
        let mut inputs = self.inputs.write().unwrap();
        let input = inputs
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Input {} not found", id)))?;

        if !input.upload_status.can_transition_to(next) {
            return Err(transition_conflict(id, next));
        }

        apply(input);
        input.upload_status = next;
        Ok(input.clone())
    }
}

#[async_trait]
impl InputStore for FakeInputStore {
    async fn opportunity_exists(&self, opportunity_id: i64) -> Result<bool> {
        Ok(self.opportunities.read().unwrap().contains(&opportunity_id))
    }

    async fn list_for_opportunity(&self, opportunity_id: i64) -> Result<Vec<InputFile>> {
        let inputs = self.inputs.read().unwrap();
        let mut matching: Vec<InputFile> = inputs
            .values()
            .filter(|input| input.opportunity_id == opportunity_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
        Ok(matching)
    }

    async fn get(&self, id: i64) -> Result<Option<InputFile>> {
        Ok(self.snapshot(id))
    }

    async fn create_processing(&self, input: CreateInputFile) -> Result<InputFile> {
        let mut inputs = self.inputs.write().unwrap();
        let id = inputs.keys().max().copied().unwrap_or(0) + 1;
        let created = InputFile {
            id,
            opportunity_id: input.opportunity_id,
            file_name: input.file_name,
            file_size: input.file_size,
            mime_type: input.mime_type,
            upload_status: UploadStatus::Processing,
            gdrive_file_name: PLACEHOLDER_IDENTIFIER.to_string(),
            gdrive_web_url: PLACEHOLDER_IDENTIFIER.to_string(),
            uploaded_by: input.uploaded_by,
            uploaded_at: Utc::now(),
            error_message: None,
        };
        inputs.insert(id, created.clone());
        Ok(created)
    }

    async fn mark_processing(&self, id: i64, retry: RetryInputFile) -> Result<InputFile> {
        self.transition(id, UploadStatus::Processing, |input| {
            input.file_name = retry.file_name;
            input.file_size = retry.file_size;
            input.mime_type = retry.mime_type;
            input.error_message = None;
        })
    }

    async fn mark_completed(
        &self,
        id: i64,
        gdrive_file_name: &str,
        gdrive_web_url: &str,
    ) -> Result<InputFile> {
        if self.completions_fail.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        self.transition(id, UploadStatus::Completed, |input| {
            input.gdrive_file_name = gdrive_file_name.to_string();
            input.gdrive_web_url = gdrive_web_url.to_string();
            input.error_message = None;
        })
    }

    async fn mark_failed(&self, id: i64, error_message: &str) -> Result<InputFile> {
        self.transition(id, UploadStatus::Failed, |input| {
            input.error_message = Some(error_message.to_string());
        })
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.inputs.write().unwrap().remove(&id).is_some())
    }
}
