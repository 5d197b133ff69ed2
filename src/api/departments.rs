use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use validator::Validate;

use crate::db::departments;
use crate::error::AppError;
use crate::models::{Department, NewDepartmentRequest, UpdateDepartmentRequest};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/departments", get(list_departments).post(create_department))
        .route(
            "/departments/{id}",
            get(get_department).put(update_department).delete(delete_department),
        )
}

async fn list_departments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Department>>, AppError> {
    Ok(Json(departments::fetch_departments(&state.db).await?))
}

async fn get_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Department>, AppError> {
    let department = departments::find_department_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(department))
}

async fn create_department(
    State(state): State<AppState>,
    Json(req): Json<NewDepartmentRequest>,
) -> Result<(StatusCode, Json<Department>), AppError> {
    req.validate()?;
    let department = departments::insert_department(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(department)))
}

async fn update_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateDepartmentRequest>,
) -> Result<Json<Department>, AppError> {
    req.validate()?;
    let department = departments::update_department(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(department))
}

async fn delete_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if departments::delete_department(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
