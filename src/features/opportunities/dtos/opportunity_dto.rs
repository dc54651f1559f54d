use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::artifacts::dtos::ArtifactResponseDto;
use crate::features::clients::services::normalize_client_name;
use crate::features::inputs::dtos::InputFileResponseDto;
use crate::features::opportunities::models::{NewOpportunity, OpportunitySummary};

/// Sortable columns of the opportunity list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OpportunitySortBy {
    Name,
    Client,
    Responsible,
    #[default]
    CreationDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Query parameters for listing opportunities
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListOpportunitiesQuery {
    /// Case-insensitive match on opportunity, client or responsible name
    #[param(example = "acme")]
    pub search: Option<String>,
    /// name | client | responsible | creation_date
    pub sort_by: Option<OpportunitySortBy>,
    /// asc | desc
    pub sort_dir: Option<SortDirection>,
}

impl ListOpportunitiesQuery {
    /// ORDER BY clause built only from whitelisted column expressions
    pub fn order_by(&self) -> String {
        let column = match self.sort_by.unwrap_or_default() {
            OpportunitySortBy::Name => "LOWER(o.name)",
            OpportunitySortBy::Client => "LOWER(c.name)",
            OpportunitySortBy::Responsible => "LOWER(COALESCE(p.full_name, o.responsible_name))",
            OpportunitySortBy::CreationDate => "o.creation_date",
        };
        let direction = match self.sort_dir.unwrap_or_default() {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        format!("{} {} NULLS LAST, o.id {}", column, direction, direction)
    }

    /// ILIKE pattern for the search term with wildcards in the term escaped
    pub fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref()?.trim();
        if term.is_empty() {
            return None;
        }
        let escaped = term
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        Some(format!("%{}%", escaped))
    }
}

/// Request DTO for creating an opportunity
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOpportunityDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    #[schema(example = "Acme renewal 2025")]
    pub name: String,

    /// Client name; an existing client with the same name is reused
    #[validate(length(min = 1, max = 255, message = "Client must be 1-255 characters"))]
    #[schema(example = "Acme Corp")]
    pub client: String,

    /// Profile id of the responsible person
    pub responsible_user_id: Option<Uuid>,

    /// Free-text responsible person, for people without a profile
    #[validate(length(max = 255, message = "Responsible name must not exceed 255 characters"))]
    pub responsible_name: Option<String>,

    /// Defaults to today
    pub creation_date: Option<NaiveDate>,

    pub created_by: Uuid,
}

impl CreateOpportunityDto {
    /// Trims text fields and checks the rules `validator` cannot express
    pub fn normalize(self) -> Result<NewOpportunity, AppError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }

        let client = normalize_client_name(&self.client)
            .ok_or_else(|| AppError::Validation("Client is required".to_string()))?;

        let responsible_name = self
            .responsible_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        if self.responsible_user_id.is_some() && responsible_name.is_some() {
            return Err(AppError::Validation(
                "Set either responsible_user_id or responsible_name, not both".to_string(),
            ));
        }

        Ok(NewOpportunity {
            name,
            client,
            responsible_user_id: self.responsible_user_id,
            responsible_name,
            creation_date: self.creation_date,
            created_by: self.created_by,
        })
    }
}

/// Opportunity list row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OpportunityResponseDto {
    pub id: i64,
    pub name: String,
    pub client_id: i64,
    pub client_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_name: Option<String>,
    pub creation_date: NaiveDate,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub input_count: i64,
    pub artifact_count: i64,
}

impl From<OpportunitySummary> for OpportunityResponseDto {
    fn from(summary: OpportunitySummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            client_id: summary.client_id,
            client_name: summary.client_name,
            responsible_user_id: summary.responsible_user_id,
            responsible_name: summary.responsible_name,
            creation_date: summary.creation_date,
            created_by: summary.created_by,
            created_at: summary.created_at,
            updated_at: summary.updated_at,
            input_count: summary.input_count,
            artifact_count: summary.artifact_count,
        }
    }
}

/// Opportunity with its inputs and artifacts, both newest first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OpportunityDetailDto {
    pub opportunity: OpportunityResponseDto,
    pub inputs: Vec<InputFileResponseDto>,
    pub artifacts: Vec<ArtifactResponseDto>,
}
