pub mod academics;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::services::{CompletionSweep, EnrollmentService, MetricsPublisher, WatchPublisher};
use crate::state::AppState;

/// Wires the shared state from a migrated pool. Also returns the publisher
/// that the metrics scheduler should feed.
pub fn build_state(db: SqlitePool, config: &AppConfig) -> (AppState, Arc<dyn MetricsPublisher>) {
    let calendar = config.term_calendar();
    let (publisher, metrics) = WatchPublisher::channel();

    let state = AppState {
        enrollments: EnrollmentService::new(
            db.clone(),
            calendar,
            config.default_completion_grade,
        ),
        db,
        metrics,
    };

    (state, Arc::new(publisher))
}

pub fn completion_sweep(db: SqlitePool, config: &AppConfig) -> CompletionSweep {
    CompletionSweep::new(db, config.term_calendar(), config.default_completion_grade)
}
