use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use tracing::{debug, info, instrument, warn};

use super::KvStore;
use crate::shared::AppError;

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS kv_entries (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
)";

/// PostgreSQL implementation of KvStore
///
/// Every key is one row in `kv_entries`. Writes are single-statement upserts,
/// so each call is atomic but nothing ties a read to the write that follows it.
pub struct PostgresKvStore {
    pool: PgPool,
}

impl PostgresKvStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool against `database_url`
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to connect to database");
                AppError::Store(e.to_string())
            })?;

        info!("Connected to PostgreSQL key-value store");
        Ok(Self::new(pool))
    }

    /// Creates the backing table if it does not exist yet
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(CREATE_TABLE_SQL)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to create kv_entries table");
                AppError::Store(e.to_string())
            })?;

        debug!("kv_entries table ready");
        Ok(())
    }
}

#[async_trait]
impl KvStore for PostgresKvStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT value FROM kv_entries WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, key = %key, "Failed to read key from database");
                AppError::Store(e.to_string())
            })?;

        let value = row.map(|row| row.get::<String, _>("value"));
        debug!(key = %key, found = value.is_some(), "Read key from database");
        Ok(value)
    }

    #[instrument(skip(self, value))]
    async fn put(&self, key: &str, value: String) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO kv_entries (key, value, updated_at) VALUES ($1, $2, now())
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()",
        )
        .bind(key)
        .bind(&value)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, key = %key, "Failed to write key to database");
            AppError::Store(e.to_string())
        })?;

        debug!(key = %key, bytes = value.len(), "Wrote key to database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM kv_entries WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, key = %key, "Failed to delete key from database");
                AppError::Store(e.to_string())
            })?;

        debug!(
            key = %key,
            rows_affected = result.rows_affected(),
            "Deleted key from database"
        );
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
