use serde_json::Value;
use tracing::{error, info, warn};

use crate::core::config::ProxyConfig;
use crate::features::upload_proxy::dtos::{
    RelayResultDto, UploadSubmission, REQUIRED_RESULT_FIELDS, UPSTREAM_DETAIL_MAX_CHARS,
};
use crate::features::upload_proxy::error::ProxyError;
use crate::modules::webhook::{OutboundUpload, WebhookClient, WebhookError, WebhookReply};

/// Successful relay: the webhook's body exactly as received plus the two
/// identifiers extracted from it
#[derive(Debug, Clone)]
pub struct RelayedUpload {
    pub body: String,
    pub result: RelayResultDto,
}

/// Validates uploads and relays them to the workflow webhook.
///
/// Holds no per-request state; one instance serves every request.
pub struct UploadProxyService {
    webhook: Option<WebhookClient>,
}

impl UploadProxyService {
    pub fn new(config: &ProxyConfig) -> Result<Self, WebhookError> {
        let webhook = config
            .webhook_url
            .as_ref()
            .map(|url| WebhookClient::new(url.clone(), config.deadline))
            .transpose()?;

        Ok(Self { webhook })
    }

    pub fn is_configured(&self) -> bool {
        self.webhook.is_some()
    }

    /// Validate, forward once, normalize. Never retries.
    pub async fn relay(&self, submission: UploadSubmission) -> Result<RelayedUpload, ProxyError> {
        let webhook = self.webhook.as_ref().ok_or_else(|| {
            error!("Upload webhook URL not configured");
            ProxyError::NotConfigured
        })?;

        let input_id = submission.input_id.clone();
        info!("Starting upload relay for input_id={}", input_id);

        if let Err(e) = submission.validate() {
            warn!("Rejected upload for input_id={}: {}", input_id, e.describe());
            return Err(e);
        }

        let file_name = submission.resolved_file_name();
        let Some(file) = submission.file else {
            return Err(ProxyError::MissingFile);
        };

        info!(
            "Forwarding file '{}' ({} bytes) for input_id={}",
            file_name, file.size, input_id
        );

        let upload = OutboundUpload {
            data: file.data,
            file_name,
            input_id: submission.input_id,
            opportunity_id: submission.opportunity_id,
            uploaded_by: submission.uploaded_by,
        };

        let reply = webhook.forward(upload).await.map_err(|e| match e {
            WebhookError::Timeout(deadline) => {
                error!(
                    "Webhook timed out after {:?} for input_id={}",
                    deadline, input_id
                );
                ProxyError::UpstreamTimeout
            }
            WebhookError::Transport(detail) | WebhookError::Client(detail) => {
                error!("Webhook unreachable for input_id={}: {}", input_id, detail);
                ProxyError::UpstreamUnreachable(detail)
            }
        })?;

        info!("Webhook status {} for input_id={}", reply.status, input_id);

        match normalize_reply(reply) {
            Ok(relayed) => {
                info!(
                    "Upload relayed for input_id={}: gdrive_file_name={}, gdrive_web_url={}",
                    input_id, relayed.result.gdrive_file_name, relayed.result.gdrive_web_url
                );
                Ok(relayed)
            }
            Err(e) => {
                error!("Upload failed for input_id={}: {}", input_id, e.describe());
                Err(e)
            }
        }
    }
}

/// Maps a raw webhook answer onto the proxy contract
pub fn normalize_reply(reply: WebhookReply) -> Result<RelayedUpload, ProxyError> {
    if !reply.is_success() {
        return Err(ProxyError::UpstreamStatus {
            status: reply.status,
            detail: reply.body.chars().take(UPSTREAM_DETAIL_MAX_CHARS).collect(),
        });
    }

    let parsed: Value =
        serde_json::from_str(&reply.body).map_err(|_| ProxyError::MalformedResponse)?;

    let field = |name: &str| {
        parsed
            .get(name)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    match (field(REQUIRED_RESULT_FIELDS[0]), field(REQUIRED_RESULT_FIELDS[1])) {
        (Some(gdrive_file_name), Some(gdrive_web_url)) => Ok(RelayedUpload {
            body: reply.body,
            result: RelayResultDto {
                gdrive_file_name,
                gdrive_web_url,
            },
        }),
        _ => {
            let received = parsed
                .as_object()
                .map(|object| object.keys().cloned().collect())
                .unwrap_or_default();
            Err(ProxyError::MissingFields { received })
        }
    }
}
