use std::sync::Arc;

use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::artifacts::models::ArtifactDoc;
use crate::features::artifacts::ArtifactService;
use crate::features::clients::ClientService;
use crate::features::inputs::models::InputFile;
use crate::features::inputs::InputStore;
use crate::features::opportunities::dtos::ListOpportunitiesQuery;
use crate::features::opportunities::models::{NewOpportunity, OpportunitySummary};

const SUMMARY_SELECT: &str = r#"
    SELECT o.id, o.name, o.client_id, c.name AS client_name, o.responsible_user_id,
           COALESCE(p.full_name, o.responsible_name) AS responsible_name,
           o.creation_date, o.created_by, o.created_at, o.updated_at,
           (SELECT COUNT(*) FROM inputs i WHERE i.opportunity_id = o.id) AS input_count,
           (SELECT COUNT(*) FROM artifacts a WHERE a.opportunity_id = o.id) AS artifact_count
    FROM opportunities o
    JOIN clients c ON c.id = o.client_id
    LEFT JOIN profiles p ON p.id = o.responsible_user_id
    WHERE o.deleted_at IS NULL
"#;

pub struct OpportunityDetail {
    pub opportunity: OpportunitySummary,
    pub inputs: Vec<InputFile>,
    pub artifacts: Vec<ArtifactDoc>,
}

pub struct OpportunityService {
    pool: PgPool,
    inputs: Arc<dyn InputStore>,
    artifacts: Arc<ArtifactService>,
}

impl OpportunityService {
    pub fn new(pool: PgPool, inputs: Arc<dyn InputStore>, artifacts: Arc<ArtifactService>) -> Self {
        Self {
            pool,
            inputs,
            artifacts,
        }
    }

    /// Live opportunities filtered by the search term and sorted as requested
    pub async fn list(&self, query: &ListOpportunitiesQuery) -> Result<Vec<OpportunitySummary>> {
        let pattern = query.search_pattern();
        let mut sql = SUMMARY_SELECT.to_string();
        if pattern.is_some() {
            sql.push_str(
                " AND (o.name ILIKE $1 OR c.name ILIKE $1 \
                 OR COALESCE(p.full_name, o.responsible_name) ILIKE $1)",
            );
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(&query.order_by());

        let mut statement = sqlx::query_as::<_, OpportunitySummary>(&sql);
        if let Some(pattern) = pattern {
            statement = statement.bind(pattern);
        }

        let opportunities = statement.fetch_all(&self.pool).await.map_err(|e| {
            tracing::error!("Failed to fetch opportunities: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(opportunities)
    }

    /// Distinct free-text responsible names, for autocompletion
    pub async fn responsible_names(&self) -> Result<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT responsible_name
            FROM opportunities
            WHERE deleted_at IS NULL
              AND responsible_name IS NOT NULL
              AND responsible_name <> ''
            ORDER BY responsible_name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    pub async fn get(&self, id: i64) -> Result<OpportunitySummary> {
        let sql = format!("{} AND o.id = $1", SUMMARY_SELECT);
        sqlx::query_as::<_, OpportunitySummary>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch opportunity {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Opportunity {} not found", id)))
    }

    pub async fn detail(&self, id: i64) -> Result<OpportunityDetail> {
        let opportunity = self.get(id).await?;
        let inputs = self.inputs.list_for_opportunity(id).await?;
        let artifacts = self.artifacts.list_for_opportunity(id).await?;

        Ok(OpportunityDetail {
            opportunity,
            inputs,
            artifacts,
        })
    }

    /// Inserts the opportunity, creating its client on first use
    pub async fn create(&self, new: NewOpportunity) -> Result<OpportunitySummary> {
        let mut tx = self.pool.begin().await?;

        if let Some(profile_id) = new.responsible_user_id {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM profiles WHERE id = $1)")
                    .bind(profile_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if !exists {
                return Err(AppError::Validation(format!(
                    "Responsible user {} does not exist",
                    profile_id
                )));
            }
        }

        let client = ClientService::find_or_create(&mut *tx, &new.client).await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO opportunities
                (name, client_id, responsible_user_id, responsible_name, creation_date, created_by)
            VALUES ($1, $2, $3, $4, COALESCE($5, CURRENT_DATE), $6)
            RETURNING id
            "#,
        )
        .bind(&new.name)
        .bind(client.id)
        .bind(new.responsible_user_id)
        .bind(&new.responsible_name)
        .bind(new.creation_date)
        .bind(new.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create opportunity: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await?;

        tracing::info!(
            "Created opportunity {} '{}' for client '{}'",
            id,
            new.name,
            client.name
        );
        self.get(id).await
    }

    /// Hides the opportunity from every listing; child rows are kept
    pub async fn soft_delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE opportunities
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Opportunity {} not found", id)));
        }

        tracing::info!("Soft-deleted opportunity {}", id);
        Ok(())
    }
}
