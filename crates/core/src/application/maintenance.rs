// Maintenance Service
// Scheduled maintenance operations for the session table and DB file

use crate::error::Result;
use crate::port::{Maintenance, MaintenanceConfig, TimeProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info};

use super::shutdown::ShutdownToken;

/// Maintenance scheduler
///
/// Purges expired sessions (and VACUUMs when the file grows) in the background
pub struct MaintenanceScheduler {
    maintenance: Arc<dyn Maintenance>,
    time_provider: Arc<dyn TimeProvider>,
    config: MaintenanceConfig,
    interval_hours: u64,
}

impl MaintenanceScheduler {
    /// Create a new maintenance scheduler
    ///
    /// # Arguments
    /// * `maintenance` - Maintenance implementation
    /// * `time_provider` - Clock used to decide which sessions expired
    /// * `config` - Maintenance configuration
    /// * `interval_hours` - How often to run maintenance (hours)
    pub fn new(
        maintenance: Arc<dyn Maintenance>,
        time_provider: Arc<dyn TimeProvider>,
        config: MaintenanceConfig,
        interval_hours: u64,
    ) -> Self {
        Self {
            maintenance,
            time_provider,
            config,
            interval_hours,
        }
    }

    /// Run maintenance loop until shutdown is signalled
    ///
    /// Should be spawned in tokio::spawn
    pub async fn run(self, mut shutdown: ShutdownToken) {
        info!(
            interval_hours = self.interval_hours,
            "Maintenance scheduler started"
        );

        let mut tick = interval(Duration::from_secs(self.interval_hours.max(1) * 3600));

        loop {
            tokio::select! {
                _ = tick.tick() => {}
                _ = shutdown.wait() => {
                    info!("Maintenance scheduler stopping");
                    return;
                }
            }

            if shutdown.is_shutdown() {
                return;
            }

            info!("Running scheduled maintenance...");
            let now = self.time_provider.now_millis();

            match self.maintenance.run_full_maintenance(&self.config, now).await {
                Ok(stats) => {
                    info!(
                        db_size_mb = stats.db_size_mb,
                        sessions = stats.session_count,
                        orders = stats.order_count,
                        "Scheduled maintenance completed successfully"
                    );
                }
                Err(e) => {
                    error!(error = ?e, "Scheduled maintenance failed");
                }
            }
        }
    }

    /// Run maintenance immediately (for manual trigger)
    pub async fn run_now(&self) -> Result<()> {
        info!("Running manual maintenance...");

        let now = self.time_provider.now_millis();
        let stats = self.maintenance.run_full_maintenance(&self.config, now).await?;

        info!(
            db_size_mb = stats.db_size_mb,
            sessions = stats.session_count,
            "Manual maintenance completed"
        );

        Ok(())
    }
}
