use sqlx::{PgExecutor, PgPool};

use crate::core::error::{AppError, Result};
use crate::features::clients::models::Client;

/// Client names are matched exactly after trimming
pub fn normalize_client_name(name: &str) -> Option<String> {
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

pub struct ClientService {
    pool: PgPool,
}

impl ClientService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All clients ordered by name
    pub async fn list(&self) -> Result<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            "SELECT id, name, created_at, updated_at FROM clients ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch clients: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(clients)
    }

    /// Returns the client with this name, creating it first if needed.
    /// Runs on the caller's executor so it can join a transaction.
    pub async fn find_or_create<'e>(executor: impl PgExecutor<'e>, name: &str) -> Result<Client> {
        let name = normalize_client_name(name)
            .ok_or_else(|| AppError::Validation("Client name is required".to_string()))?;

        // The no-op update makes RETURNING yield the existing row on conflict
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(&name)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            tracing::error!("Failed to find or create client '{}': {:?}", name, e);
            AppError::Database(e)
        })?;

        Ok(client)
    }
}
