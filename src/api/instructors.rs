use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use validator::Validate;

use crate::db::instructors;
use crate::error::AppError;
use crate::models::{Instructor, NewInstructorRequest, UpdateInstructorRequest};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/instructors", get(list_instructors).post(create_instructor))
        .route(
            "/instructors/{id}",
            get(get_instructor).put(update_instructor).delete(delete_instructor),
        )
}

async fn list_instructors(
    State(state): State<AppState>,
) -> Result<Json<Vec<Instructor>>, AppError> {
    Ok(Json(instructors::fetch_instructors(&state.db).await?))
}

async fn get_instructor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Instructor>, AppError> {
    let instructor = instructors::find_instructor_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(instructor))
}

async fn create_instructor(
    State(state): State<AppState>,
    Json(req): Json<NewInstructorRequest>,
) -> Result<(StatusCode, Json<Instructor>), AppError> {
    req.validate()?;
    let instructor = instructors::insert_instructor(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(instructor)))
}

async fn update_instructor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateInstructorRequest>,
) -> Result<Json<Instructor>, AppError> {
    req.validate()?;
    let instructor = instructors::update_instructor(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(instructor))
}

async fn delete_instructor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if instructors::delete_instructor(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
