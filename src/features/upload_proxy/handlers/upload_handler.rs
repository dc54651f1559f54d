use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::features::upload_proxy::dtos::{
    FilePart, ProxyErrorDto, ProxyUploadForm, RelayResultDto, UploadSubmission,
    ACCEPTED_MIME_TYPE, MAX_FILE_SIZE, MAX_UPLOAD_BODY_SIZE,
};
use crate::features::upload_proxy::error::ProxyError;
use crate::features::upload_proxy::response::{
    json_response, preflight_response, raw_json_response,
};
use crate::features::upload_proxy::services::UploadProxyService;

/// Relay a PDF to the workflow webhook
///
/// Accepts multipart/form-data with a `file` part and the `input_id`,
/// `opportunity_id`, `file_name` and `uploaded_by` fields. On success the
/// webhook's JSON body is returned unchanged.
#[utoipa::path(
    post,
    path = "/api/upload-proxy",
    tag = "upload-proxy",
    request_body(
        content = ProxyUploadForm,
        content_type = "multipart/form-data",
        description = "PDF file plus input metadata",
    ),
    responses(
        (status = 200, description = "Webhook result, passed through verbatim", body = RelayResultDto),
        (status = 400, description = "Missing file, wrong type or unreadable body", body = ProxyErrorDto),
        (status = 413, description = "File too large", body = ProxyErrorDto),
        (status = 500, description = "Not configured, webhook unreachable or contract violation", body = ProxyErrorDto),
        (status = 504, description = "Webhook timed out", body = ProxyErrorDto)
    )
)]
pub async fn proxy_upload(
    State(service): State<Arc<UploadProxyService>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    // Configuration is checked before the body is touched
    if !service.is_configured() {
        return ProxyError::NotConfigured.into_response();
    }

    let submission = match multipart {
        Ok(mut multipart) => read_submission(&mut multipart).await,
        Err(rejection) => Err(ProxyError::InvalidPayload(rejection.body_text())),
    };

    let result = match submission {
        Ok(submission) => service.relay(submission).await,
        Err(e) => {
            warn!("Unreadable upload request: {}", e.describe());
            Err(e)
        }
    };

    match result {
        Ok(relayed) => raw_json_response(StatusCode::OK, relayed.body),
        Err(e) => e.into_response(),
    }
}

/// CORS pre-flight
pub async fn preflight() -> Response {
    preflight_response()
}

pub async fn method_not_allowed() -> Response {
    json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &ProxyErrorDto::new("method not allowed"),
    )
}

/// Reads the whole form. The file is streamed so oversize parts are counted
/// without being buffered past the limit.
///
/// A non-PDF file part ends the read as soon as its headers are seen, since
/// the type check outranks everything after configuration. Bodies past
/// `MAX_UPLOAD_BODY_SIZE` are cut off and reported with the bytes counted so far.
pub async fn read_submission(multipart: &mut Multipart) -> Result<UploadSubmission, ProxyError> {
    let mut submission = UploadSubmission::default();
    let mut counted = 0usize;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(multipart_failure(e, counted)),
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file = read_file_part(field, &mut counted).await?;
                submission.file = Some(file);
            }
            "input_id" => submission.input_id = read_text(field, &mut counted).await?,
            "opportunity_id" => {
                submission.opportunity_id = read_text(field, &mut counted).await?
            }
            "file_name" => submission.file_name = Some(read_text(field, &mut counted).await?),
            "uploaded_by" => submission.uploaded_by = read_text(field, &mut counted).await?,
            _ => {
                debug!("Ignoring unknown field: {}", name);
                drain(field, &mut counted).await?;
            }
        }
    }

    Ok(submission)
}

async fn read_file_part(mut field: Field<'_>, counted: &mut usize) -> Result<FilePart, ProxyError> {
    let file_name = field.file_name().map(str::to_string);
    let content_type = field.content_type().unwrap_or_default().to_string();
    if content_type != ACCEPTED_MIME_TYPE {
        return Err(ProxyError::UnsupportedType {
            received_type: content_type,
        });
    }

    let mut data = Vec::new();
    let mut size = 0usize;
    while let Some(chunk) = next_chunk(&mut field, counted).await? {
        size += chunk.len();
        if size <= MAX_FILE_SIZE {
            data.extend_from_slice(&chunk);
        }
    }

    if size > MAX_FILE_SIZE {
        data = Vec::new();
    }

    Ok(FilePart {
        file_name,
        content_type,
        size,
        data,
    })
}

async fn read_text(mut field: Field<'_>, counted: &mut usize) -> Result<String, ProxyError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = next_chunk(&mut field, counted).await? {
        bytes.extend_from_slice(&chunk);
    }
    String::from_utf8(bytes)
        .map_err(|_| ProxyError::InvalidPayload("form field is not valid UTF-8".to_string()))
}

async fn drain(mut field: Field<'_>, counted: &mut usize) -> Result<(), ProxyError> {
    while next_chunk(&mut field, counted).await?.is_some() {}
    Ok(())
}

/// Next chunk of a field, charged against the transport cap
async fn next_chunk(field: &mut Field<'_>, counted: &mut usize) -> Result<Option<Bytes>, ProxyError> {
    match field.chunk().await {
        Ok(Some(chunk)) => {
            *counted += chunk.len();
            if *counted > MAX_UPLOAD_BODY_SIZE {
                return Err(ProxyError::FileTooLarge {
                    max_size: MAX_FILE_SIZE,
                    received_size: *counted,
                });
            }
            Ok(Some(chunk))
        }
        Ok(None) => Ok(None),
        Err(e) => Err(multipart_failure(e, *counted)),
    }
}

fn multipart_failure(error: MultipartError, received_size: usize) -> ProxyError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ProxyError::FileTooLarge {
            max_size: MAX_FILE_SIZE,
            received_size,
        }
    } else {
        ProxyError::InvalidPayload(error.body_text())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::core::config::ProxyConfig;
    use crate::features::upload_proxy::routes;
    use crate::features::upload_proxy::services::UploadProxyService;
    use crate::shared::test_helpers::{pdf_bytes, MockWebhook, WebhookBehavior};

    use super::*;

    const TWO_MB: usize = 2 * 1024 * 1024;

    fn server(webhook_url: Option<String>, deadline: Duration) -> TestServer {
        let mut config = ProxyConfig::new(webhook_url);
        config.deadline = deadline;
        let service = Arc::new(UploadProxyService::new(&config).unwrap());
        TestServer::new(routes(service)).unwrap()
    }

    fn form(data: Vec<u8>, mime: &str) -> MultipartForm {
        MultipartForm::new()
            .add_part("file", Part::bytes(data).file_name("deck.pdf").mime_type(mime))
            .add_text("input_id", "42")
            .add_text("opportunity_id", "7")
            .add_text("file_name", "Deck")
            .add_text("uploaded_by", "user-1")
    }

    fn assert_cors(response: &axum_test::TestResponse) {
        assert_eq!(response.header("access-control-allow-origin"), "*");
        assert_eq!(
            response.header("access-control-allow-methods"),
            "POST, OPTIONS"
        );
        assert_eq!(
            response.header("access-control-allow-headers"),
            "authorization, x-client-info, apikey, content-type"
        );
    }

    #[tokio::test]
    async fn test_success_passes_webhook_body_through() {
        let body = r#"{"gdrive_file_name":"f1","gdrive_web_url":"https://x/f1"}"#;
        let webhook = MockWebhook::start(WebhookBehavior::json(200, body)).await;
        let server = server(Some(webhook.url()), Duration::from_secs(5));

        let response = server
            .post("/api/upload-proxy")
            .multipart(form(pdf_bytes(TWO_MB), "application/pdf"))
            .await;

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.text(), body);
        assert_cors(&response);

        let received = webhook.last_request().unwrap();
        assert_eq!(received.fields.get("input_id").unwrap(), "42");
        assert_eq!(received.fields.get("id_opp").unwrap(), "7");
        assert_eq!(received.fields.get("file_name").unwrap(), "Deck");
        assert_eq!(received.file_len, TWO_MB);
        assert_eq!(webhook.hits(), 1);
    }

    #[tokio::test]
    async fn test_success_keeps_extra_fields() {
        let body = r#"{"gdrive_file_name":"f1","gdrive_web_url":"https://x/f1","folder":{"id":9},"tags":["a"]}"#;
        let webhook = MockWebhook::start(WebhookBehavior::json(200, body)).await;
        let server = server(Some(webhook.url()), Duration::from_secs(5));

        let response = server
            .post("/api/upload-proxy")
            .multipart(form(pdf_bytes(1024), "application/pdf"))
            .await;

        assert_eq!(response.status_code(), 200);
        let value: Value = response.json();
        assert_eq!(value, serde_json::from_str::<Value>(body).unwrap());
    }

    #[tokio::test]
    async fn test_non_pdf_is_rejected_without_calling_webhook() {
        let webhook = MockWebhook::start(WebhookBehavior::success()).await;
        let server = server(Some(webhook.url()), Duration::from_secs(5));

        for (mime, size) in [("image/png", 10), ("text/plain", TWO_MB), ("image/jpeg", 12 * 1024 * 1024)] {
            let response = server
                .post("/api/upload-proxy")
                .multipart(form(vec![7u8; size], mime))
                .await;

            assert_eq!(response.status_code(), 400);
            assert_cors(&response);
            let value: Value = response.json();
            assert_eq!(value["error"], "only PDF files are allowed");
            assert_eq!(value["received_type"], mime);
        }

        assert_eq!(webhook.hits(), 0);
    }

    #[tokio::test]
    async fn test_oversized_pdf_is_rejected() {
        let webhook = MockWebhook::start(WebhookBehavior::success()).await;
        let server = server(Some(webhook.url()), Duration::from_secs(5));
        let size = MAX_FILE_SIZE + 1;

        let response = server
            .post("/api/upload-proxy")
            .multipart(form(pdf_bytes(size), "application/pdf"))
            .await;

        assert_eq!(response.status_code(), 413);
        assert_cors(&response);
        let value: Value = response.json();
        assert_eq!(
            value,
            json!({ "error": "file too large", "max_size": MAX_FILE_SIZE, "received_size": size })
        );
        assert_eq!(webhook.hits(), 0);
    }

    #[tokio::test]
    async fn test_non_pdf_past_transport_cap_reports_its_type() {
        let webhook = MockWebhook::start(WebhookBehavior::success()).await;
        let server = server(Some(webhook.url()), Duration::from_secs(5));

        let response = server
            .post("/api/upload-proxy")
            .multipart(form(vec![7u8; MAX_UPLOAD_BODY_SIZE + 1024 * 1024], "image/jpeg"))
            .await;

        assert_eq!(response.status_code(), 400);
        assert_cors(&response);
        assert_eq!(
            response.json::<Value>(),
            json!({ "error": "only PDF files are allowed", "received_type": "image/jpeg" })
        );
        assert_eq!(webhook.hits(), 0);
    }

    #[tokio::test]
    async fn test_pdf_past_transport_cap_reports_bytes_received() {
        let webhook = MockWebhook::start(WebhookBehavior::success()).await;
        let server = server(Some(webhook.url()), Duration::from_secs(5));

        let response = server
            .post("/api/upload-proxy")
            .multipart(form(
                pdf_bytes(MAX_UPLOAD_BODY_SIZE + 1024 * 1024),
                "application/pdf",
            ))
            .await;

        assert_eq!(response.status_code(), 413);
        assert_cors(&response);
        let value: Value = response.json();
        assert_eq!(value["error"], "file too large");
        assert_eq!(value["max_size"], MAX_FILE_SIZE);
        let received = value["received_size"].as_u64().unwrap() as usize;
        assert!(received > MAX_UPLOAD_BODY_SIZE);
        assert_eq!(webhook.hits(), 0);
    }

    #[tokio::test]
    async fn test_missing_file_part() {
        let webhook = MockWebhook::start(WebhookBehavior::success()).await;
        let server = server(Some(webhook.url()), Duration::from_secs(5));

        let response = server
            .post("/api/upload-proxy")
            .multipart(MultipartForm::new().add_text("input_id", "42"))
            .await;

        assert_eq!(response.status_code(), 400);
        assert_eq!(response.json::<Value>(), json!({ "error": "file is required" }));
        assert_eq!(webhook.hits(), 0);
    }

    #[tokio::test]
    async fn test_missing_configuration_wins_over_bad_input() {
        let server = server(None, Duration::from_secs(5));

        let response = server
            .post("/api/upload-proxy")
            .multipart(form(vec![1, 2, 3], "image/png"))
            .await;

        assert_eq!(response.status_code(), 500);
        assert_cors(&response);
        assert_eq!(
            response.json::<Value>(),
            json!({ "error": "Upload webhook URL not configured" })
        );
    }

    #[tokio::test]
    async fn test_non_multipart_body_is_a_validation_error() {
        let webhook = MockWebhook::start(WebhookBehavior::success()).await;
        let server = server(Some(webhook.url()), Duration::from_secs(5));

        let response = server
            .post("/api/upload-proxy")
            .json(&json!({ "file": "nope" }))
            .await;

        assert_eq!(response.status_code(), 400);
        assert_cors(&response);
        assert_eq!(response.json::<Value>()["error"], "invalid multipart payload");
        assert_eq!(webhook.hits(), 0);
    }

    #[tokio::test]
    async fn test_webhook_hang_yields_gateway_timeout() {
        let webhook = MockWebhook::start(WebhookBehavior::hang(Duration::from_secs(30))).await;
        let deadline = Duration::from_millis(500);
        let server = server(Some(webhook.url()), deadline);

        let started = Instant::now();
        let response = server
            .post("/api/upload-proxy")
            .multipart(form(pdf_bytes(TWO_MB), "application/pdf"))
            .await;
        let elapsed = started.elapsed();

        assert_eq!(response.status_code(), 504);
        assert_cors(&response);
        assert_eq!(
            response.json::<Value>(),
            json!({
                "error": "Request to webhook timed out",
                "detail": "The upload took too long to complete"
            })
        );
        assert!(elapsed >= deadline);
        assert!(elapsed < deadline + Duration::from_secs(3));
        assert_eq!(webhook.hits(), 1);
    }

    #[tokio::test]
    async fn test_webhook_error_status_is_passed_through() {
        let body = "x".repeat(300);
        let webhook = MockWebhook::start(WebhookBehavior::text(422, &body)).await;
        let server = server(Some(webhook.url()), Duration::from_secs(5));

        let response = server
            .post("/api/upload-proxy")
            .multipart(form(pdf_bytes(1024), "application/pdf"))
            .await;

        assert_eq!(response.status_code(), 422);
        assert_cors(&response);
        let value: Value = response.json();
        assert_eq!(value["error"], "webhook returned error");
        assert_eq!(value["status"], 422);
        assert_eq!(value["detail"], "x".repeat(200));
    }

    #[tokio::test]
    async fn test_webhook_missing_fields_is_contract_violation() {
        let webhook = MockWebhook::start(WebhookBehavior::json(
            200,
            r#"{"gdrive_file_id":"legacy","gdrive_web_url":"https://x/f1"}"#,
        ))
        .await;
        let server = server(Some(webhook.url()), Duration::from_secs(5));

        let response = server
            .post("/api/upload-proxy")
            .multipart(form(pdf_bytes(1024), "application/pdf"))
            .await;

        assert_eq!(response.status_code(), 500);
        assert_eq!(
            response.json::<Value>(),
            json!({
                "error": "webhook response missing required fields",
                "detail": "Expected gdrive_file_name and gdrive_web_url",
                "received": ["gdrive_file_id", "gdrive_web_url"]
            })
        );
    }

    #[tokio::test]
    async fn test_webhook_invalid_json() {
        let webhook = MockWebhook::start(WebhookBehavior::text(200, "Workflow was started")).await;
        let server = server(Some(webhook.url()), Duration::from_secs(5));

        let response = server
            .post("/api/upload-proxy")
            .multipart(form(pdf_bytes(1024), "application/pdf"))
            .await;

        assert_eq!(response.status_code(), 500);
        assert_eq!(
            response.json::<Value>(),
            json!({
                "error": "Invalid JSON response from webhook",
                "detail": "webhook did not return valid JSON"
            })
        );
    }

    #[tokio::test]
    async fn test_unreachable_webhook() {
        let url = crate::shared::test_helpers::unreachable_url().await;
        let server = server(Some(url), Duration::from_secs(5));

        let response = server
            .post("/api/upload-proxy")
            .multipart(form(pdf_bytes(1024), "application/pdf"))
            .await;

        assert_eq!(response.status_code(), 500);
        let value: Value = response.json();
        assert_eq!(value["error"], "Failed to connect to webhook");
        assert!(value["detail"].as_str().is_some_and(|d| !d.is_empty()));
    }

    #[tokio::test]
    async fn test_preflight_and_other_methods_carry_cors() {
        let server = server(None, Duration::from_secs(5));

        let preflight = server
            .method(axum::http::Method::OPTIONS, "/api/upload-proxy")
            .await;
        assert_eq!(preflight.status_code(), 200);
        assert!(preflight.text().is_empty());
        assert_cors(&preflight);

        let get = server.get("/api/upload-proxy").await;
        assert_eq!(get.status_code(), 405);
        assert_cors(&get);
    }
}
