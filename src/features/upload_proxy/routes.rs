use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::sync::Arc;

use crate::features::upload_proxy::handlers::{method_not_allowed, preflight, proxy_upload};
use crate::features::upload_proxy::services::UploadProxyService;

/// Create routes for the upload proxy
///
/// Mounted outside the tracker's CORS layer: these handlers set their own headers.
/// The body cap is enforced while reading the form, after the file type is known.
pub fn routes(service: Arc<UploadProxyService>) -> Router {
    Router::new()
        .route(
            "/api/upload-proxy",
            post(proxy_upload)
                .options(preflight)
                .fallback(method_not_allowed)
                .layer(DefaultBodyLimit::disable()),
        )
        .with_state(service)
}
