use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use validator::Validate;

use crate::db::enrollments;
use crate::error::AppError;
use crate::models::{Enrollment, EnrollmentFilter, NewEnrollmentRequest, UpdateEnrollmentRequest};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/enrollments", get(list_enrollments).post(create_enrollment))
        .route(
            "/enrollments/{id}",
            get(get_enrollment)
                .patch(update_enrollment)
                .delete(delete_enrollment),
        )
        .route("/enrollments/{id}/approve", post(approve_enrollment))
        .route("/enrollments/{id}/reject", post(reject_enrollment))
        .route("/enrollments/{id}/drop", post(drop_enrollment))
}

async fn list_enrollments(
    State(state): State<AppState>,
    Query(filter): Query<EnrollmentFilter>,
) -> Result<Json<Vec<Enrollment>>, AppError> {
    Ok(Json(enrollments::fetch_enrollments(&state.db, &filter).await?))
}

async fn get_enrollment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Enrollment>, AppError> {
    let enrollment = enrollments::find_enrollment_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(enrollment))
}

async fn create_enrollment(
    State(state): State<AppState>,
    Json(req): Json<NewEnrollmentRequest>,
) -> Result<(StatusCode, Json<Enrollment>), AppError> {
    req.validate()?;
    let enrollment = state.enrollments.create(req).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

async fn update_enrollment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateEnrollmentRequest>,
) -> Result<Json<Enrollment>, AppError> {
    req.validate()?;
    Ok(Json(state.enrollments.update(&id, req).await?))
}

async fn approve_enrollment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Enrollment>, AppError> {
    Ok(Json(state.enrollments.approve(&id).await?))
}

async fn reject_enrollment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Enrollment>, AppError> {
    Ok(Json(state.enrollments.reject(&id).await?))
}

async fn drop_enrollment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.enrollments.drop_enrollment(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_enrollment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.enrollments.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
