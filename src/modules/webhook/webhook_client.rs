//! Workflow webhook client
//!
//! Sends one multipart POST per upload and reports what came back without
//! interpreting it. Status and body normalization belong to the upload proxy.

use std::error::Error as _;
use std::time::{Duration, Instant};

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

/// MIME type attached to the relayed file part
const RELAYED_CONTENT_TYPE: &str = "application/pdf";

/// Failure to obtain any HTTP answer from the webhook
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("webhook did not answer within {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Transport(String),

    #[error("failed to build webhook HTTP client: {0}")]
    Client(String),
}

/// Payload relayed to the webhook
#[derive(Debug, Clone)]
pub struct OutboundUpload {
    pub data: Vec<u8>,
    pub file_name: String,
    pub input_id: String,
    pub opportunity_id: String,
    pub uploaded_by: String,
}

/// Raw webhook answer: status code and full body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookReply {
    pub status: u16,
    pub body: String,
}

impl WebhookReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub struct WebhookClient {
    client: Client,
    url: String,
    deadline: Duration,
}

impl WebhookClient {
    pub fn new(url: impl Into<String>, deadline: Duration) -> Result<Self, WebhookError> {
        let client = Client::builder()
            .user_agent(concat!("opportunity-tracker/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WebhookError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            deadline,
        })
    }

    /// POST the upload once. The deadline covers sending the request and reading
    /// the whole response body; on expiry the in-flight request is dropped.
    pub async fn forward(&self, upload: OutboundUpload) -> Result<WebhookReply, WebhookError> {
        let input_id = upload.input_id.clone();
        let form = build_form(upload)?;
        let started = Instant::now();

        let exchange = async {
            let response = self.client.post(&self.url).multipart(form).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>(WebhookReply { status, body })
        };

        match tokio::time::timeout(self.deadline, exchange).await {
            Ok(Ok(reply)) => {
                debug!(
                    "Webhook answered {} for input_id={} after {:?}",
                    reply.status,
                    input_id,
                    started.elapsed()
                );
                Ok(reply)
            }
            Ok(Err(e)) if e.is_timeout() => {
                warn!("Webhook transport timed out for input_id={}", input_id);
                Err(WebhookError::Timeout(self.deadline))
            }
            Ok(Err(e)) => Err(WebhookError::Transport(describe(&e))),
            Err(_) => {
                warn!(
                    "Webhook call aborted for input_id={} after {:?}",
                    input_id, self.deadline
                );
                Err(WebhookError::Timeout(self.deadline))
            }
        }
    }
}

fn build_form(upload: OutboundUpload) -> Result<Form, WebhookError> {
    let file = Part::bytes(upload.data)
        .file_name(upload.file_name.clone())
        .mime_str(RELAYED_CONTENT_TYPE)
        .map_err(|e| WebhookError::Client(e.to_string()))?;

    // The workflow expects the opportunity under `id_opp`
    Ok(Form::new()
        .part("file", file)
        .text("input_id", upload.input_id)
        .text("id_opp", upload.opportunity_id)
        .text("file_name", upload.file_name)
        .text("uploaded_by", upload.uploaded_by))
}

/// Flattens the error chain so "connection refused" style causes reach the caller
fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{MockWebhook, WebhookBehavior};

    fn upload() -> OutboundUpload {
        OutboundUpload {
            data: b"%PDF-1.4 test".to_vec(),
            file_name: "deck.pdf".to_string(),
            input_id: "42".to_string(),
            opportunity_id: "7".to_string(),
            uploaded_by: "user-1".to_string(),
        }
    }

    #[test]
    fn test_reply_success_range() {
        let ok = WebhookReply {
            status: 204,
            body: String::new(),
        };
        let redirect = WebhookReply {
            status: 302,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }

    #[tokio::test]
    async fn test_forward_sends_renamed_fields() {
        let webhook = MockWebhook::start(WebhookBehavior::json(
            200,
            r#"{"gdrive_file_name":"f1","gdrive_web_url":"https://x/f1"}"#,
        ))
        .await;
        let client = WebhookClient::new(webhook.url(), Duration::from_secs(5)).unwrap();

        let reply = client.forward(upload()).await.unwrap();

        assert_eq!(reply.status, 200);
        assert_eq!(webhook.hits(), 1);
        let received = webhook.last_request().unwrap();
        assert_eq!(received.fields.get("input_id").unwrap(), "42");
        assert_eq!(received.fields.get("id_opp").unwrap(), "7");
        assert_eq!(received.fields.get("file_name").unwrap(), "deck.pdf");
        assert_eq!(received.fields.get("uploaded_by").unwrap(), "user-1");
        assert_eq!(received.file_name.as_deref(), Some("deck.pdf"));
        assert_eq!(received.file_type.as_deref(), Some("application/pdf"));
        assert_eq!(received.file_len, b"%PDF-1.4 test".len());
    }

    #[tokio::test]
    async fn test_forward_times_out_once() {
        let webhook = MockWebhook::start(WebhookBehavior::hang(Duration::from_secs(30))).await;
        let client = WebhookClient::new(webhook.url(), Duration::from_millis(200)).unwrap();

        let started = Instant::now();
        let err = client.forward(upload()).await.unwrap_err();

        assert!(matches!(err, WebhookError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(webhook.hits(), 1);
    }

    #[tokio::test]
    async fn test_forward_reports_unreachable_host() {
        let url = crate::shared::test_helpers::unreachable_url().await;
        let client = WebhookClient::new(url, Duration::from_secs(5)).unwrap();

        let err = client.forward(upload()).await.unwrap_err();

        match err {
            WebhookError::Transport(detail) => assert!(!detail.is_empty()),
            other => panic!("expected transport error, got {:?}", other),
        }
    }
}
