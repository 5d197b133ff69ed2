use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::AppError;
use crate::services::completion_sweep::{CompletionSweep, SweepStats};
use crate::services::metrics::{self, DashboardMetrics, MetricsPublisher};

/// Recomputes dashboard metrics on a fixed interval and hands them to the
/// publisher. A failed tick is logged and retried on the next one.
pub struct MetricsScheduler {
    db: SqlitePool,
    publisher: Arc<dyn MetricsPublisher>,
    interval: Duration,
}

impl MetricsScheduler {
    pub fn new(db: SqlitePool, publisher: Arc<dyn MetricsPublisher>, interval_secs: u64) -> Self {
        Self {
            db,
            publisher,
            interval: Duration::from_secs(interval_secs.max(1)),
        }
    }

    pub async fn start(self) {
        info!("Starting metrics scheduler (interval: {:?})", self.interval);

        loop {
            match self.tick().await {
                Ok(m) => {
                    info!(
                        "Metrics published - students: {}, active enrollments: {}, pending: {}, avg gpa: {:.2}",
                        m.total_students, m.active_enrollments, m.pending_approvals, m.average_gpa
                    );
                }
                Err(e) => {
                    warn!("Metrics refresh failed: {:?}", e);
                }
            }

            tokio::time::sleep(self.interval).await;
        }
    }

    pub async fn tick(&self) -> Result<DashboardMetrics, AppError> {
        let snapshot = metrics::collect_metrics(&self.db).await?;
        self.publisher.publish(snapshot.clone()).await?;
        Ok(snapshot)
    }
}

/// Runs the completion sweep periodically, starting immediately.
pub struct SweepScheduler {
    sweep: CompletionSweep,
    interval: Duration,
}

impl SweepScheduler {
    pub fn new(sweep: CompletionSweep, interval_secs: u64) -> Self {
        Self {
            sweep,
            interval: Duration::from_secs(interval_secs.max(1)),
        }
    }

    pub async fn start(self) {
        info!("Starting completion sweep scheduler (interval: {:?})", self.interval);

        loop {
            if let Err(e) = self.tick().await {
                warn!("Completion sweep failed: {:?}", e);
            }

            tokio::time::sleep(self.interval).await;
        }
    }

    pub async fn tick(&self) -> Result<SweepStats, AppError> {
        self.sweep.run(Utc::now().date_naive()).await
    }
}
