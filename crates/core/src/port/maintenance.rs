// DB Maintenance port
use crate::error::Result;
use async_trait::async_trait;

/// Database maintenance statistics
#[derive(Debug, Clone)]
pub struct MaintenanceStats {
    pub db_size_mb: f64,
    pub db_size_bytes: i64,
    pub session_count: i64,
    pub expired_session_count: i64,
    pub order_count: i64,
    pub product_count: i64,
}

/// Maintenance configuration
#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    /// Maximum DB size before forcing VACUUM (MB)
    pub max_db_size_mb: f64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            max_db_size_mb: 512.0,
        }
    }
}

/// Database maintenance operations
#[async_trait]
pub trait Maintenance: Send + Sync {
    /// Run VACUUM to reclaim space
    ///
    /// # Returns
    /// Space reclaimed in MB
    async fn vacuum(&self) -> Result<f64>;

    /// Delete sessions that expired before `now_millis`
    ///
    /// # Returns
    /// Number of sessions deleted
    async fn purge_expired_sessions(&self, now_millis: i64) -> Result<u64>;

    /// Get maintenance statistics
    async fn get_stats(&self, now_millis: i64) -> Result<MaintenanceStats>;

    /// Run full maintenance (session purge + VACUUM when large)
    async fn run_full_maintenance(
        &self,
        config: &MaintenanceConfig,
        now_millis: i64,
    ) -> Result<MaintenanceStats> {
        let stats_before = self.get_stats(now_millis).await?;

        let purged = self.purge_expired_sessions(now_millis).await?;

        let reclaimed_mb = if stats_before.db_size_mb > config.max_db_size_mb {
            self.vacuum().await?
        } else {
            0.0
        };

        let stats_after = self.get_stats(now_millis).await?;

        tracing::info!(
            purged_sessions = purged,
            reclaimed_mb = reclaimed_mb,
            db_size_mb = stats_after.db_size_mb,
            "Maintenance completed"
        );

        Ok(stats_after)
    }
}
