use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tracing::info;

use crate::platform::PlatformClient;
use crate::services::sync_service::SyncService;

/// Runs a platform sync pass on a fixed interval.
pub struct SyncScheduler {
    db: SqlitePool,
    platform: Arc<dyn PlatformClient>,
    interval: Duration,
}

impl SyncScheduler {
    pub fn new(db: SqlitePool, platform: Arc<dyn PlatformClient>, interval_secs: u64) -> Self {
        Self {
            db,
            platform,
            interval: Duration::from_secs(interval_secs),
        }
    }

    pub async fn start(self) {
        info!("Starting auto-sync scheduler (interval: {:?})", self.interval);

        loop {
            tokio::time::sleep(self.interval).await;

            match self.run_sync().await {
                Ok(stats) => {
                    info!(
                        "Auto-sync completed - Pushed: {} courses, {} assignments | Pulled: {} courses, {} assignments",
                        stats.courses_pushed,
                        stats.assignments_pushed,
                        stats.courses_pulled,
                        stats.assignments_pulled
                    );
                }
                Err(e) => {
                    // Keep looping; the next tick retries.
                    tracing::warn!("Auto-sync failed: {:?}", e);
                }
            }
        }
    }

    async fn run_sync(&self) -> Result<crate::services::SyncStats, crate::error::AppError> {
        let service = SyncService::new(self.db.clone(), self.platform.clone());
        service.sync_all().await
    }
}
