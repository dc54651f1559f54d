use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::opportunities::handlers;
use crate::features::opportunities::services::OpportunityService;

/// Create routes for the opportunities feature
pub fn routes(service: Arc<OpportunityService>) -> Router {
    Router::new()
        .route(
            "/api/opportunities",
            get(handlers::list_opportunities).post(handlers::create_opportunity),
        )
        // Static segment wins over {id} in axum's router
        .route(
            "/api/opportunities/responsible-names",
            get(handlers::list_responsible_names),
        )
        .route(
            "/api/opportunities/{id}",
            get(handlers::get_opportunity).delete(handlers::delete_opportunity),
        )
        .with_state(service)
}
