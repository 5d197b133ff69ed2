use sqlx::SqlitePool;
use tokio::sync::watch;

use crate::services::{DashboardMetrics, EnrollmentService};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub enrollments: EnrollmentService,
    pub metrics: watch::Receiver<Option<DashboardMetrics>>,
}
