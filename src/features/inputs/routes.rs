use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::features::inputs::handlers;
use crate::features::inputs::services::IngestionService;

/// Create routes for the inputs feature
pub fn routes(service: Arc<IngestionService>) -> Router {
    Router::new()
        .route(
            "/api/opportunities/{id}/inputs",
            get(handlers::list_inputs).post(handlers::create_input),
        )
        .route("/api/inputs/{id}/retry", post(handlers::retry_input))
        .route("/api/inputs/{id}", delete(handlers::delete_input))
        .layer(DefaultBodyLimit::disable())
        .with_state(service)
}
