// SQLite Maintenance Implementation
use crate::error::map_sqlx_error;
use async_trait::async_trait;
use sqlx::SqlitePool;
use storefront_core::error::{AppError, Result};
use storefront_core::port::{Maintenance, MaintenanceStats};
use tracing::info;

/// SQLite maintenance implementation
pub struct SqliteMaintenance {
    pool: SqlitePool,
}

impl SqliteMaintenance {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get DB file size in bytes
    async fn get_db_size(&self) -> Result<i64> {
        let page_count: i64 = sqlx::query_scalar("PRAGMA page_count")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get page count: {}", e)))?;

        let page_size: i64 = sqlx::query_scalar("PRAGMA page_size")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get page size: {}", e)))?;

        Ok(page_count * page_size)
    }

    async fn count(&self, sql: &str) -> Result<i64> {
        sqlx::query_scalar(sql)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}

fn to_mb(bytes: i64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

#[async_trait]
impl Maintenance for SqliteMaintenance {
    async fn vacuum(&self) -> Result<f64> {
        info!("Running VACUUM to optimize database...");

        let size_before = self.get_db_size().await?;

        sqlx::query("VACUUM")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("VACUUM failed: {}", e)))?;

        let size_after = self.get_db_size().await?;
        let reclaimed = to_mb((size_before - size_after).max(0));

        info!(
            size_before_mb = to_mb(size_before),
            size_after_mb = to_mb(size_after),
            reclaimed_mb = reclaimed,
            "VACUUM completed"
        );

        Ok(reclaimed)
    }

    async fn purge_expired_sessions(&self, now_millis: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now_millis)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let deleted = result.rows_affected();
        info!(deleted_sessions = deleted, "Expired session purge completed");
        Ok(deleted)
    }

    async fn get_stats(&self, now_millis: i64) -> Result<MaintenanceStats> {
        let db_size_bytes = self.get_db_size().await?;

        let expired_session_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE expires_at <= ?")
                .bind(now_millis)
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(MaintenanceStats {
            db_size_mb: to_mb(db_size_bytes),
            db_size_bytes,
            session_count: self.count("SELECT COUNT(*) FROM sessions").await?,
            expired_session_count,
            order_count: self.count("SELECT COUNT(*) FROM orders").await?,
            product_count: self.count("SELECT COUNT(*) FROM products").await?,
        })
    }
}
