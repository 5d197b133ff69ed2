use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use validator::Validate;

use crate::db::{enrollments, students};
use crate::error::AppError;
use crate::models::{
    Enrollment, EnrollmentFilter, NewStudentRequest, SelfEnrollRequest, Student,
    UpdateStudentRequest,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/students", get(list_students).post(create_student))
        .route(
            "/students/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route(
            "/students/{id}/enrollments",
            get(list_student_enrollments).post(enroll),
        )
        .route("/students/{id}/gpa/recalculate", post(recalculate_gpa))
}

async fn list_students(State(state): State<AppState>) -> Result<Json<Vec<Student>>, AppError> {
    Ok(Json(students::fetch_students(&state.db).await?))
}

async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Student>, AppError> {
    let student = students::find_student_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(student))
}

async fn create_student(
    State(state): State<AppState>,
    Json(req): Json<NewStudentRequest>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    req.validate()?;
    let student = students::insert_student(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStudentRequest>,
) -> Result<Json<Student>, AppError> {
    req.validate()?;
    let student = students::update_student(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(student))
}

async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if students::delete_student(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn list_student_enrollments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Enrollment>>, AppError> {
    let filter = EnrollmentFilter {
        student_id: Some(id),
        ..Default::default()
    };
    Ok(Json(enrollments::fetch_enrollments(&state.db, &filter).await?))
}

async fn enroll(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SelfEnrollRequest>,
) -> Result<(StatusCode, Json<Enrollment>), AppError> {
    let enrollment = state
        .enrollments
        .enroll_self(&id, &req.course_id, req.term.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

#[derive(Serialize)]
struct GpaResponse {
    student_id: String,
    gpa: f64,
}

async fn recalculate_gpa(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GpaResponse>, AppError> {
    let gpa = state.enrollments.recompute_gpa(&id).await?;
    Ok(Json(GpaResponse { student_id: id, gpa }))
}
