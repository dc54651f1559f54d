use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::features::upload_proxy::dtos::{ProxyErrorDto, REQUIRED_RESULT_FIELDS};
use crate::features::upload_proxy::response::json_response;

/// Every way an upload relay can end short of success
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Upload webhook URL not configured")]
    NotConfigured,

    #[error("invalid multipart payload")]
    InvalidPayload(String),

    #[error("file is required")]
    MissingFile,

    #[error("only PDF files are allowed")]
    UnsupportedType { received_type: String },

    #[error("file too large")]
    FileTooLarge {
        max_size: usize,
        received_size: usize,
    },

    #[error("Request to webhook timed out")]
    UpstreamTimeout,

    #[error("Failed to connect to webhook")]
    UpstreamUnreachable(String),

    #[error("webhook returned error")]
    UpstreamStatus { status: u16, detail: String },

    #[error("Invalid JSON response from webhook")]
    MalformedResponse,

    #[error("webhook response missing required fields")]
    MissingFields { received: Vec<String> },
}

/// Coarse classification callers use to decide on a retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyErrorKind {
    Configuration,
    Validation,
    UpstreamTimeout,
    UpstreamUnreachable,
    UpstreamError,
    ContractViolation,
}

impl ProxyError {
    pub fn kind(&self) -> ProxyErrorKind {
        match self {
            ProxyError::NotConfigured => ProxyErrorKind::Configuration,
            ProxyError::InvalidPayload(_)
            | ProxyError::MissingFile
            | ProxyError::UnsupportedType { .. }
            | ProxyError::FileTooLarge { .. } => ProxyErrorKind::Validation,
            ProxyError::UpstreamTimeout => ProxyErrorKind::UpstreamTimeout,
            ProxyError::UpstreamUnreachable(_) => ProxyErrorKind::UpstreamUnreachable,
            ProxyError::UpstreamStatus { .. } => ProxyErrorKind::UpstreamError,
            ProxyError::MalformedResponse | ProxyError::MissingFields { .. } => {
                ProxyErrorKind::ContractViolation
            }
        }
    }

    /// Whether re-submitting the same file could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ProxyError::UpstreamTimeout | ProxyError::UpstreamUnreachable(_) => true,
            ProxyError::UpstreamStatus { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            _ => false,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::InvalidPayload(_)
            | ProxyError::MissingFile
            | ProxyError::UnsupportedType { .. } => StatusCode::BAD_REQUEST,
            ProxyError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::UpstreamUnreachable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::UpstreamStatus { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ProxyError::MalformedResponse | ProxyError::MissingFields { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn to_dto(&self) -> ProxyErrorDto {
        let mut dto = ProxyErrorDto::new(self.to_string());
        match self {
            ProxyError::NotConfigured | ProxyError::MissingFile => {}
            ProxyError::InvalidPayload(detail) | ProxyError::UpstreamUnreachable(detail) => {
                dto.detail = Some(detail.clone());
            }
            ProxyError::UnsupportedType { received_type } => {
                dto.received_type = Some(received_type.clone());
            }
            ProxyError::FileTooLarge {
                max_size,
                received_size,
            } => {
                dto.max_size = Some(*max_size);
                dto.received_size = Some(*received_size);
            }
            ProxyError::UpstreamTimeout => {
                dto.detail = Some("The upload took too long to complete".to_string());
            }
            ProxyError::UpstreamStatus { status, detail } => {
                dto.status = Some(*status);
                dto.detail = Some(detail.clone());
            }
            ProxyError::MalformedResponse => {
                dto.detail = Some("webhook did not return valid JSON".to_string());
            }
            ProxyError::MissingFields { received } => {
                dto.detail = Some(format!(
                    "Expected {} and {}",
                    REQUIRED_RESULT_FIELDS[0], REQUIRED_RESULT_FIELDS[1]
                ));
                dto.received = Some(received.clone());
            }
        }
        dto
    }

    /// One-line message suitable for persisting next to a failed input
    pub fn describe(&self) -> String {
        let dto = self.to_dto();
        if let Some(status) = dto.status {
            return format!(
                "{} ({}): {}",
                dto.error,
                status,
                dto.detail.unwrap_or_default()
            );
        }
        match (dto.detail, dto.received_type) {
            (Some(detail), _) if !detail.is_empty() => format!("{}: {}", dto.error, detail),
            (_, Some(received_type)) => format!("{} (received {:?})", dto.error, received_type),
            _ => dto.error,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        json_response(self.status_code(), &self.to_dto())
    }
}
