use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::clients::handlers;
use crate::features::clients::services::ClientService;

/// Create routes for the clients feature
pub fn routes(service: Arc<ClientService>) -> Router {
    Router::new()
        .route("/api/clients", get(handlers::list_clients))
        .with_state(service)
}
