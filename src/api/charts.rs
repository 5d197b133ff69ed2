use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::db::reports::{self, CourseEnrollmentPoint, LabelCount, StatusCount, StudentProgressPoint};
use crate::db::students;
use crate::error::AppError;
use crate::services::metrics::gpa_distribution;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/charts/enrollments-by-course", get(enrollments_by_course))
        .route("/charts/status-breakdown", get(status_breakdown))
        .route("/charts/grade-distribution", get(grade_distribution))
        .route("/charts/gpa-distribution", get(gpa_chart))
        .route("/charts/students-by-department", get(students_by_department))
        .route("/charts/students/{id}/progress", get(student_progress))
}

async fn enrollments_by_course(
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseEnrollmentPoint>>, AppError> {
    Ok(Json(reports::enrollments_by_course(&state.db).await?))
}

async fn status_breakdown(
    State(state): State<AppState>,
) -> Result<Json<Vec<StatusCount>>, AppError> {
    Ok(Json(reports::status_breakdown(&state.db).await?))
}

async fn grade_distribution(
    State(state): State<AppState>,
) -> Result<Json<Vec<LabelCount>>, AppError> {
    Ok(Json(reports::letter_grade_distribution(&state.db).await?))
}

async fn gpa_chart(State(state): State<AppState>) -> Result<Json<Vec<LabelCount>>, AppError> {
    let gpas = reports::student_gpas(&state.db).await?;
    Ok(Json(gpa_distribution(&gpas)))
}

async fn students_by_department(
    State(state): State<AppState>,
) -> Result<Json<Vec<LabelCount>>, AppError> {
    Ok(Json(reports::students_by_department(&state.db).await?))
}

async fn student_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<StudentProgressPoint>>, AppError> {
    if students::find_student_by_id(&state.db, &id).await?.is_none() {
        return Err(AppError::NotFound);
    }
    Ok(Json(reports::student_progress(&state.db, &id).await?))
}
