//! Workflow webhook module
//!
//! Outbound multipart client for the workflow-automation webhook that
//! stores relayed files and answers with their storage identifiers.

mod webhook_client;

pub use webhook_client::{OutboundUpload, WebhookClient, WebhookError, WebhookReply};
