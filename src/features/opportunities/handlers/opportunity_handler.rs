use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::ValidatedJson;
use crate::features::opportunities::dtos::{
    CreateOpportunityDto, ListOpportunitiesQuery, OpportunityDetailDto, OpportunityResponseDto,
};
use crate::features::opportunities::services::OpportunityService;
use crate::shared::types::ApiResponse;

/// List opportunities
#[utoipa::path(
    get,
    path = "/api/opportunities",
    params(ListOpportunitiesQuery),
    responses(
        (status = 200, description = "Live opportunities", body = ApiResponse<Vec<OpportunityResponseDto>>),
        (status = 400, description = "Unknown sort column or direction")
    ),
    tag = "opportunities"
)]
pub async fn list_opportunities(
    State(service): State<Arc<OpportunityService>>,
    Query(query): Query<ListOpportunitiesQuery>,
) -> Result<Json<ApiResponse<Vec<OpportunityResponseDto>>>> {
    let opportunities = service.list(&query).await?;
    let dtos: Vec<OpportunityResponseDto> = opportunities.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::list(dtos)))
}

/// Distinct free-text responsible names
#[utoipa::path(
    get,
    path = "/api/opportunities/responsible-names",
    responses(
        (status = 200, description = "Sorted names", body = ApiResponse<Vec<String>>)
    ),
    tag = "opportunities"
)]
pub async fn list_responsible_names(
    State(service): State<Arc<OpportunityService>>,
) -> Result<Json<ApiResponse<Vec<String>>>> {
    let names = service.responsible_names().await?;
    Ok(Json(ApiResponse::list(names)))
}

/// Create an opportunity
#[utoipa::path(
    post,
    path = "/api/opportunities",
    request_body = CreateOpportunityDto,
    responses(
        (status = 201, description = "Opportunity created", body = ApiResponse<OpportunityResponseDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "opportunities"
)]
pub async fn create_opportunity(
    State(service): State<Arc<OpportunityService>>,
    ValidatedJson(dto): ValidatedJson<CreateOpportunityDto>,
) -> Result<(StatusCode, Json<ApiResponse<OpportunityResponseDto>>)> {
    let opportunity = service.create(dto.normalize()?).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(opportunity.into()),
            Some("Opportunity created successfully".to_string()),
            None,
        )),
    ))
}

/// Get an opportunity with its inputs and artifacts
#[utoipa::path(
    get,
    path = "/api/opportunities/{id}",
    params(("id" = i64, Path, description = "Opportunity id")),
    responses(
        (status = 200, description = "Opportunity details", body = ApiResponse<OpportunityDetailDto>),
        (status = 404, description = "Opportunity not found or deleted")
    ),
    tag = "opportunities"
)]
pub async fn get_opportunity(
    State(service): State<Arc<OpportunityService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<OpportunityDetailDto>>> {
    let detail = service.detail(id).await?;
    let dto = OpportunityDetailDto {
        opportunity: detail.opportunity.into(),
        inputs: detail.inputs.into_iter().map(Into::into).collect(),
        artifacts: detail.artifacts.into_iter().map(Into::into).collect(),
    };
    Ok(Json(ApiResponse::success(Some(dto), None, None)))
}

/// Soft-delete an opportunity
#[utoipa::path(
    delete,
    path = "/api/opportunities/{id}",
    params(("id" = i64, Path, description = "Opportunity id")),
    responses(
        (status = 200, description = "Opportunity deleted"),
        (status = 404, description = "Opportunity not found or already deleted")
    ),
    tag = "opportunities"
)]
pub async fn delete_opportunity(
    State(service): State<Arc<OpportunityService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    service.soft_delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Opportunity deleted successfully".to_string()),
        None,
    )))
}
