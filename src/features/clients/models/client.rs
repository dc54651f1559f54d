use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Customer organisation an opportunity is tracked for
#[derive(Debug, Clone, FromRow)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
