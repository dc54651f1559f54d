use std::time::Duration;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::upload_proxy::error::ProxyError;

/// The only MIME type the workflow accepts
pub const ACCEPTED_MIME_TYPE: &str = "application/pdf";

/// Maximum file size in bytes (10MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Transport cap for the whole multipart body. Larger bodies are cut off
/// while reading and reported as too large.
pub const MAX_UPLOAD_BODY_SIZE: usize = 4 * MAX_FILE_SIZE;

/// Hard deadline for one outbound webhook exchange
pub const WEBHOOK_DEADLINE: Duration = Duration::from_secs(25);

/// Fields a successful webhook answer must carry as non-empty strings
pub const REQUIRED_RESULT_FIELDS: [&str; 2] = ["gdrive_file_name", "gdrive_web_url"];

/// Upstream error bodies are echoed back truncated to this many characters
pub const UPSTREAM_DETAIL_MAX_CHARS: usize = 200;

/// Multipart form for the upload proxy (Swagger UI documentation only).
/// The handler reads the body with axum's `Multipart` extractor.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct ProxyUploadForm {
    /// The PDF to relay
    #[schema(format = Binary, content_media_type = "application/pdf")]
    pub file: String,
    /// Input record the upload belongs to
    #[schema(example = "42")]
    pub input_id: Option<String>,
    /// Parent opportunity id
    #[schema(example = "7")]
    pub opportunity_id: Option<String>,
    /// Display name; defaults to the uploaded file's name
    #[schema(example = "proposal.pdf")]
    pub file_name: Option<String>,
    /// Id of the uploading user
    pub uploaded_by: Option<String>,
}

/// Fields the workflow returns on success. Extra fields are passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RelayResultDto {
    #[schema(example = "f1")]
    pub gdrive_file_name: String,
    #[schema(example = "https://drive.google.com/file/d/f1/view")]
    pub gdrive_web_url: String,
}

/// Shape of every proxy failure body. Only `error` is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProxyErrorDto {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<Vec<String>>,
}

impl ProxyErrorDto {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: None,
            received_type: None,
            max_size: None,
            received_size: None,
            status: None,
            received: None,
        }
    }
}

/// The `file` part of a submission
#[derive(Debug, Clone, Default)]
pub struct FilePart {
    /// Filename from the part's Content-Disposition
    pub file_name: Option<String>,
    /// Declared content type; empty when the part carried none
    pub content_type: String,
    /// Total bytes received for the part, including any not kept in `data`
    pub size: usize,
    /// Part contents. Empty when the part was rejected while streaming.
    pub data: Vec<u8>,
}

impl FilePart {
    pub fn new(file_name: Option<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name,
            content_type: content_type.into(),
            size: data.len(),
            data,
        }
    }

    /// Type check first, then size
    pub fn check(&self) -> Result<(), ProxyError> {
        if self.content_type != ACCEPTED_MIME_TYPE {
            return Err(ProxyError::UnsupportedType {
                received_type: self.content_type.clone(),
            });
        }

        if self.size > MAX_FILE_SIZE {
            return Err(ProxyError::FileTooLarge {
                max_size: MAX_FILE_SIZE,
                received_size: self.size,
            });
        }

        Ok(())
    }
}

/// One inbound upload: the file plus the metadata the workflow keys it by
#[derive(Debug, Clone, Default)]
pub struct UploadSubmission {
    pub file: Option<FilePart>,
    pub input_id: String,
    pub opportunity_id: String,
    pub file_name: Option<String>,
    pub uploaded_by: String,
}

impl UploadSubmission {
    /// Explicit `file_name` field, else the file part's own name, else empty
    pub fn resolved_file_name(&self) -> String {
        self.file_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.file.as_ref().and_then(|f| f.file_name.as_deref()))
            .unwrap_or_default()
            .to_string()
    }

    /// Runs the request preconditions in order: file present, type, size
    pub fn validate(&self) -> Result<&FilePart, ProxyError> {
        let file = self.file.as_ref().ok_or(ProxyError::MissingFile)?;
        file.check()?;
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(size: usize) -> FilePart {
        FilePart::new(Some("deck.pdf".to_string()), ACCEPTED_MIME_TYPE, vec![0u8; size])
    }

    #[test]
    fn test_validate_requires_file() {
        let submission = UploadSubmission::default();
        assert!(matches!(
            submission.validate(),
            Err(ProxyError::MissingFile)
        ));
    }

    #[test]
    fn test_check_rejects_other_types_exactly() {
        for content_type in ["image/png", "application/pdf; charset=binary", "APPLICATION/PDF", ""]
        {
            let file = FilePart::new(None, content_type, vec![1, 2, 3]);
            match file.check() {
                Err(ProxyError::UnsupportedType { received_type }) => {
                    assert_eq!(received_type, content_type)
                }
                other => panic!("expected type rejection for {content_type:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_check_size_boundary() {
        assert!(pdf(MAX_FILE_SIZE).check().is_ok());
        match pdf(MAX_FILE_SIZE + 1).check() {
            Err(ProxyError::FileTooLarge {
                max_size,
                received_size,
            }) => {
                assert_eq!(max_size, MAX_FILE_SIZE);
                assert_eq!(received_size, MAX_FILE_SIZE + 1);
            }
            other => panic!("expected size rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_oversized_non_pdf_reports_type_first() {
        let file = FilePart::new(None, "image/jpeg", vec![0u8; MAX_FILE_SIZE + 10]);
        assert!(matches!(
            file.check(),
            Err(ProxyError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_resolved_file_name_fallbacks() {
        let mut submission = UploadSubmission {
            file: Some(pdf(1)),
            ..Default::default()
        };
        assert_eq!(submission.resolved_file_name(), "deck.pdf");

        submission.file_name = Some(String::new());
        assert_eq!(submission.resolved_file_name(), "deck.pdf");

        submission.file_name = Some("Proposal v2".to_string());
        assert_eq!(submission.resolved_file_name(), "Proposal v2");

        submission.file = None;
        submission.file_name = None;
        assert_eq!(submission.resolved_file_name(), "");
    }
}
