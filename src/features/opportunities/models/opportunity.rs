use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// An opportunity joined with its client, responsible person and child counts
#[derive(Debug, Clone, FromRow)]
pub struct OpportunitySummary {
    pub id: i64,
    pub name: String,
    pub client_id: i64,
    pub client_name: String,
    pub responsible_user_id: Option<Uuid>,
    /// Profile name when a profile is referenced, else the free-text name
    pub responsible_name: Option<String>,
    pub creation_date: NaiveDate,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub input_count: i64,
    pub artifact_count: i64,
}

/// Normalized values for a new opportunity row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOpportunity {
    pub name: String,
    pub client: String,
    pub responsible_user_id: Option<Uuid>,
    pub responsible_name: Option<String>,
    pub creation_date: Option<NaiveDate>,
    pub created_by: Uuid,
}
