use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::ValidatedJson;
use crate::features::artifacts::dtos::{ArtifactResponseDto, GenerateArtifactDto};
use crate::features::artifacts::services::ArtifactService;
use crate::shared::types::ApiResponse;

/// List the artifacts of an opportunity, newest first
#[utoipa::path(
    get,
    path = "/api/opportunities/{id}/artifacts",
    params(("id" = i64, Path, description = "Opportunity id")),
    responses(
        (status = 200, description = "Artifacts of the opportunity", body = ApiResponse<Vec<ArtifactResponseDto>>),
        (status = 404, description = "Opportunity not found")
    ),
    tag = "artifacts"
)]
pub async fn list_artifacts(
    State(service): State<Arc<ArtifactService>>,
    Path(opportunity_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<ArtifactResponseDto>>>> {
    let artifacts = service.list(opportunity_id).await?;
    let dtos: Vec<ArtifactResponseDto> = artifacts.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::list(dtos)))
}

/// Generate an artifact for an opportunity
#[utoipa::path(
    post,
    path = "/api/opportunities/{id}/artifacts",
    params(("id" = i64, Path, description = "Opportunity id")),
    request_body = GenerateArtifactDto,
    responses(
        (status = 201, description = "Artifact generated", body = ApiResponse<ArtifactResponseDto>),
        (status = 400, description = "Invalid request body"),
        (status = 404, description = "Opportunity not found")
    ),
    tag = "artifacts"
)]
pub async fn generate_artifact(
    State(service): State<Arc<ArtifactService>>,
    Path(opportunity_id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<GenerateArtifactDto>,
) -> Result<(StatusCode, Json<ApiResponse<ArtifactResponseDto>>)> {
    let artifact = service.generate(opportunity_id, dto.generated_by).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(artifact.into()),
            Some("Artifact generated successfully".to_string()),
            None,
        )),
    ))
}

/// Delete an artifact
#[utoipa::path(
    delete,
    path = "/api/artifacts/{id}",
    params(("id" = i64, Path, description = "Artifact id")),
    responses(
        (status = 200, description = "Artifact deleted"),
        (status = 404, description = "Artifact not found")
    ),
    tag = "artifacts"
)]
pub async fn delete_artifact(
    State(service): State<Arc<ArtifactService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Artifact deleted successfully".to_string()),
        None,
    )))
}
