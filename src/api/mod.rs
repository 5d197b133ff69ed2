mod charts;
mod courses;
mod departments;
mod enrollments;
mod instructors;
mod students;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::academics::Term;
use crate::error::AppError;
use crate::services::{DashboardMetrics, metrics};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(departments::routes())
        .merge(instructors::routes())
        .merge(courses::routes())
        .merge(students::routes())
        .merge(enrollments::routes())
        .merge(charts::routes())
        .route("/terms/current", get(current_term))
        .route("/dashboard/metrics", get(dashboard_metrics));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

#[derive(Serialize)]
struct CurrentTermResponse {
    term: Term,
    pinned: bool,
}

async fn current_term(State(state): State<AppState>) -> Json<CurrentTermResponse> {
    Json(CurrentTermResponse {
        term: state.enrollments.current_term(),
        pinned: state.enrollments.calendar().is_pinned(),
    })
}

/// Latest snapshot from the scheduler, or a fresh one before its first tick.
async fn dashboard_metrics(
    State(state): State<AppState>,
) -> Result<Json<DashboardMetrics>, AppError> {
    let latest = state.metrics.borrow().clone();
    let snapshot = match latest {
        Some(m) => m,
        None => metrics::collect_metrics(&state.db).await?,
    };
    Ok(Json(snapshot))
}
