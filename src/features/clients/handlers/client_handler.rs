use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::clients::dtos::ClientResponseDto;
use crate::features::clients::services::ClientService;
use crate::shared::types::ApiResponse;

/// List all clients
#[utoipa::path(
    get,
    path = "/api/clients",
    responses(
        (status = 200, description = "Clients ordered by name", body = ApiResponse<Vec<ClientResponseDto>>)
    ),
    tag = "clients"
)]
pub async fn list_clients(
    State(service): State<Arc<ClientService>>,
) -> Result<Json<ApiResponse<Vec<ClientResponseDto>>>> {
    let clients = service.list().await?;
    let dtos: Vec<ClientResponseDto> = clients.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::list(dtos)))
}
