//! Test doubles shared across modules: an in-process workflow webhook and
//! PDF payload builders.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A `%PDF` header padded with filler up to `size` bytes
pub fn pdf_bytes(size: usize) -> Vec<u8> {
    let mut data = b"%PDF-1.4\n".to_vec();
    data.resize(size, b'0');
    data.truncate(size);
    data
}

/// URL on a local port nothing listens on
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/webhook", addr)
}

/// What the mock webhook answers
#[derive(Debug, Clone)]
pub struct WebhookBehavior {
    pub status: u16,
    pub body: String,
    pub content_type: &'static str,
    pub delay: Duration,
}

impl WebhookBehavior {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            content_type: "application/json",
            delay: Duration::ZERO,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            content_type: "text/plain",
            ..Self::json(status, body)
        }
    }

    pub fn success() -> Self {
        Self::json(
            200,
            r#"{"gdrive_file_name":"f1","gdrive_web_url":"https://x/f1"}"#,
        )
    }

    /// Accepts the upload, then sits on the response
    pub fn hang(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::success()
        }
    }
}

/// One request as the webhook saw it
#[derive(Debug, Clone, Default)]
pub struct ReceivedRequest {
    pub fields: HashMap<String, String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub file_len: usize,
}

struct MockState {
    behavior: WebhookBehavior,
    hits: AtomicUsize,
    requests: Mutex<Vec<ReceivedRequest>>,
}

/// Workflow webhook stand-in bound to an ephemeral local port
pub struct MockWebhook {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockWebhook {
    pub async fn start(behavior: WebhookBehavior) -> Self {
        let state = Arc::new(MockState {
            behavior,
            hits: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/webhook", post(receive))
            .layer(DefaultBodyLimit::disable())
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/webhook", self.addr)
    }

    /// Requests that reached the handler, counted before the body is read
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ReceivedRequest> {
        self.state.requests.lock().unwrap().last().cloned()
    }
}

impl Drop for MockWebhook {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn receive(State(state): State<Arc<MockState>>, mut multipart: Multipart) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);

    let mut received = ReceivedRequest::default();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            received.file_name = field.file_name().map(str::to_string);
            received.file_type = field.content_type().map(str::to_string);
            received.file_len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
        } else {
            let text = field.text().await.unwrap_or_default();
            received.fields.insert(name, text);
        }
    }
    state.requests.lock().unwrap().push(received);

    let behavior = state.behavior.clone();
    if !behavior.delay.is_zero() {
        tokio::time::sleep(behavior.delay).await;
    }

    (
        StatusCode::from_u16(behavior.status).unwrap(),
        [(header::CONTENT_TYPE, behavior.content_type)],
        behavior.body,
    )
        .into_response()
}
