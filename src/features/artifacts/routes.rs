use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Router,
};

use crate::features::artifacts::handlers;
use crate::features::artifacts::services::ArtifactService;

/// Create routes for the artifacts feature
pub fn routes(service: Arc<ArtifactService>) -> Router {
    Router::new()
        .route(
            "/api/opportunities/{id}/artifacts",
            get(handlers::list_artifacts).post(handlers::generate_artifact),
        )
        .route("/api/artifacts/{id}", delete(handlers::delete_artifact))
        .with_state(service)
}
