//! SQLite backend for the shared store

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite, SqlitePool};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info};

use super::KvBackend;

const UPSERT_SQL: &str = r#"
    INSERT INTO kv_store (key, value, expires_at, updated_at)
    VALUES (?, ?, ?, ?)
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        expires_at = excluded.expires_at,
        updated_at = excluded.updated_at
"#;

pub struct SqliteBackend {
    pool: Pool<Sqlite>,
}

impl SqliteBackend {
    /// Underlying pool, for direct queries against `kv_store`
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn new(database_path: &str) -> Result<Self> {
        info!("Opening store database at {}", database_path);

        if let Some(parent) = Path::new(database_path).parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = tokio::fs::create_dir_all(parent).await {
                    error!("Failed to create parent directory {:?}: {}", parent, e);
                    return Err(e.into());
                }
            }
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path);

        let pool = match SqlitePool::connect(&database_url).await {
            Ok(pool) => pool,
            Err(e) => {
                error!("Failed to connect to database {}: {}", database_url, e);
                return Err(e.into());
            }
        };

        let backend = Self { pool };
        backend.initialize_tables().await?;
        backend.purge_expired().await?;

        info!("Store database ready");
        Ok(backend)
    }

    async fn initialize_tables(&self) -> Result<()> {
        let kv_table_sql = r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at DATETIME,
                updated_at DATETIME NOT NULL
            )
        "#;

        if let Err(e) = sqlx::query(kv_table_sql).execute(&self.pool).await {
            error!("Failed to create kv_store table: {}", e);
            return Err(e.into());
        }

        let expiry_index_sql =
            "CREATE INDEX IF NOT EXISTS idx_kv_store_expires_at ON kv_store(expires_at)";
        if let Err(e) = sqlx::query(expiry_index_sql).execute(&self.pool).await {
            error!("Failed to create kv_store expiry index: {}", e);
            return Err(e.into());
        }

        debug!("kv_store table initialized");
        Ok(())
    }

    /// Drop entries whose TTL elapsed, returns how many were removed
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM kv_store WHERE expires_at IS NOT NULL AND expires_at <= ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected();
        if removed > 0 {
            debug!("Purged {} expired store entries", removed);
        }
        Ok(removed)
    }
}

#[async_trait]
impl KvBackend for SqliteBackend {
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let now = Utc::now();
        let expires_at = match ttl {
            Some(ttl) => Some(now + chrono::Duration::from_std(ttl)?),
            None => None,
        };

        sqlx::query(UPSERT_SQL)
            .bind(key)
            .bind(value)
            .bind(expires_at)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to write store key {}: {}", key, e);
                e
            })?;

        Ok(())
    }

    async fn set_many(&self, entries: &[(String, String)]) -> Result<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        for (key, value) in entries {
            sqlx::query(UPSERT_SQL)
                .bind(key)
                .bind(value)
                .bind(None::<DateTime<Utc>>)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    error!("Failed to write store key {}, rolling back batch: {}", key, e);
                    e
                })?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value, expires_at FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let expires_at: Option<DateTime<Utc>> = row.try_get("expires_at")?;
        if expires_at.is_some_and(|at| at <= Utc::now()) {
            debug!("Store key {} expired", key);
            return Ok(None);
        }

        Ok(Some(row.try_get("value")?))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
