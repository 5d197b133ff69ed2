use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
};
use validator::Validate;

use crate::db::courses;
use crate::error::AppError;
use crate::models::{Course, CourseApprovalRequest, NewCourseRequest, UpdateCourseRequest};
use crate::services::ApprovalToggleOutcome;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/courses/{id}/approval", patch(set_approval))
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    Ok(Json(courses::fetch_courses(&state.db).await?))
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Course>, AppError> {
    let course = courses::find_course_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(course))
}

async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<NewCourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    req.validate()?;
    let course = courses::insert_course(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    req.validate()?;
    let course = courses::update_course(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(course))
}

async fn set_approval(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CourseApprovalRequest>,
) -> Result<Json<ApprovalToggleOutcome>, AppError> {
    let outcome = state
        .enrollments
        .set_course_approval(&id, req.requires_approval)
        .await?;
    Ok(Json(outcome))
}

async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if courses::delete_course(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
