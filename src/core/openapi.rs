use utoipa::{Modify, OpenApi};

use crate::features::artifacts::{dtos as artifacts_dtos, handlers as artifacts_handlers};
use crate::features::clients::{dtos as clients_dtos, handlers as clients_handlers};
use crate::features::inputs::{
    dtos as inputs_dtos, handlers as inputs_handlers, models as inputs_models,
};
use crate::features::opportunities::{
    dtos as opportunities_dtos, handlers as opportunities_handlers,
};
use crate::features::upload_proxy::{dtos as upload_proxy_dtos, handlers as upload_proxy_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Upload proxy
        upload_proxy_handlers::proxy_upload,
        // Clients
        clients_handlers::list_clients,
        // Opportunities
        opportunities_handlers::list_opportunities,
        opportunities_handlers::list_responsible_names,
        opportunities_handlers::create_opportunity,
        opportunities_handlers::get_opportunity,
        opportunities_handlers::delete_opportunity,
        // Inputs
        inputs_handlers::list_inputs,
        inputs_handlers::create_input,
        inputs_handlers::retry_input,
        inputs_handlers::delete_input,
        // Artifacts
        artifacts_handlers::list_artifacts,
        artifacts_handlers::generate_artifact,
        artifacts_handlers::delete_artifact,
    ),
    components(
        schemas(
            Meta,
            // Upload proxy
            upload_proxy_dtos::ProxyUploadForm,
            upload_proxy_dtos::RelayResultDto,
            upload_proxy_dtos::ProxyErrorDto,
            // Clients
            clients_dtos::ClientResponseDto,
            ApiResponse<Vec<clients_dtos::ClientResponseDto>>,
            // Opportunities
            opportunities_dtos::CreateOpportunityDto,
            opportunities_dtos::OpportunityResponseDto,
            opportunities_dtos::OpportunityDetailDto,
            opportunities_dtos::OpportunitySortBy,
            opportunities_dtos::SortDirection,
            ApiResponse<opportunities_dtos::OpportunityResponseDto>,
            ApiResponse<opportunities_dtos::OpportunityDetailDto>,
            ApiResponse<Vec<opportunities_dtos::OpportunityResponseDto>>,
            // Inputs
            inputs_models::UploadStatus,
            inputs_dtos::InputFileResponseDto,
            inputs_dtos::UploadInputForm,
            ApiResponse<inputs_dtos::InputFileResponseDto>,
            ApiResponse<Vec<inputs_dtos::InputFileResponseDto>>,
            // Artifacts
            artifacts_dtos::GenerateArtifactDto,
            artifacts_dtos::ArtifactResponseDto,
            ApiResponse<artifacts_dtos::ArtifactResponseDto>,
            ApiResponse<Vec<artifacts_dtos::ArtifactResponseDto>>,
        )
    ),
    tags(
        (name = "upload-proxy", description = "Relay PDF uploads to the document workflow"),
        (name = "clients", description = "Client organisations"),
        (name = "opportunities", description = "Sales opportunities"),
        (name = "inputs", description = "PDF inputs attached to opportunities"),
        (name = "artifacts", description = "Documents generated for opportunities"),
    ),
    info(
        title = "Opportunity Tracker API",
        version = "0.1.0",
        description = "Opportunity tracking with a PDF upload relay"
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_is_documented() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/upload-proxy",
            "/api/clients",
            "/api/opportunities",
            "/api/opportunities/responsible-names",
            "/api/opportunities/{id}",
            "/api/opportunities/{id}/inputs",
            "/api/inputs/{id}/retry",
            "/api/inputs/{id}",
            "/api/opportunities/{id}/artifacts",
            "/api/artifacts/{id}",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn test_info_modifier() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Tracker".to_string(),
            version: "9.9.9".to_string(),
            description: "desc".to_string(),
        }
        .modify(&mut doc);

        assert_eq!(doc.info.title, "Tracker");
        assert_eq!(doc.info.version, "9.9.9");
    }
}
