use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::models::EnrollmentStatus;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CourseEnrollmentPoint {
    pub course_id: String,
    pub code: String,
    pub title: String,
    pub capacity: i32,
    pub seats_taken: i64,
    pub pending: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StatusCount {
    pub status: EnrollmentStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StudentProgressPoint {
    pub enrollment_id: String,
    pub course_code: String,
    pub course_title: String,
    pub term: String,
    pub status: EnrollmentStatus,
    pub progress: i32,
    pub hours_studied: f64,
    pub grade: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct Totals {
    pub students: i64,
    pub instructors: i64,
    pub courses: i64,
    pub departments: i64,
    pub active_enrollments: i64,
    pub pending_approvals: i64,
    pub average_gpa: Option<f64>,
}

pub async fn enrollments_by_course(
    db: &SqlitePool,
) -> Result<Vec<CourseEnrollmentPoint>, sqlx::Error> {
    sqlx::query_as::<_, CourseEnrollmentPoint>(
        r#"
        SELECT c.id AS course_id,
               c.code,
               c.title,
               c.capacity,
               COALESCE(SUM(CASE WHEN e.status IN ('Approved', 'Completed') THEN 1 ELSE 0 END), 0) AS seats_taken,
               COALESCE(SUM(CASE WHEN e.status = 'Pending' THEN 1 ELSE 0 END), 0) AS pending
        FROM courses c
        LEFT JOIN enrollments e ON e.course_id = c.id
        GROUP BY c.id, c.code, c.title, c.capacity
        ORDER BY c.code
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn status_breakdown(db: &SqlitePool) -> Result<Vec<StatusCount>, sqlx::Error> {
    sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS count FROM enrollments GROUP BY status ORDER BY status",
    )
    .fetch_all(db)
    .await
}

pub async fn letter_grade_distribution(db: &SqlitePool) -> Result<Vec<LabelCount>, sqlx::Error> {
    sqlx::query_as::<_, LabelCount>(
        r#"
        SELECT letter_grade AS label, COUNT(*) AS count
        FROM enrollments
        WHERE letter_grade IS NOT NULL AND status != 'Dropped'
        GROUP BY letter_grade
        ORDER BY letter_grade
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn students_by_department(db: &SqlitePool) -> Result<Vec<LabelCount>, sqlx::Error> {
    sqlx::query_as::<_, LabelCount>(
        r#"
        SELECT COALESCE(d.name, 'Undeclared') AS label, COUNT(*) AS count
        FROM students s
        LEFT JOIN departments d ON d.id = s.department_id
        GROUP BY label
        ORDER BY count DESC, label
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn student_gpas(db: &SqlitePool) -> Result<Vec<f64>, sqlx::Error> {
    sqlx::query_scalar("SELECT gpa FROM students")
        .fetch_all(db)
        .await
}

pub async fn student_progress(
    db: &SqlitePool,
    student_id: &str,
) -> Result<Vec<StudentProgressPoint>, sqlx::Error> {
    sqlx::query_as::<_, StudentProgressPoint>(
        r#"
        SELECT e.id AS enrollment_id,
               c.code AS course_code,
               c.title AS course_title,
               e.term,
               e.status,
               e.progress,
               e.hours_studied,
               e.grade
        FROM enrollments e
        JOIN courses c ON c.id = e.course_id
        WHERE e.student_id = ?
        ORDER BY e.enrolled_at
        "#,
    )
    .bind(student_id)
    .fetch_all(db)
    .await
}

pub async fn totals(db: &SqlitePool) -> Result<Totals, sqlx::Error> {
    sqlx::query_as::<_, Totals>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM students) AS students,
            (SELECT COUNT(*) FROM instructors) AS instructors,
            (SELECT COUNT(*) FROM courses) AS courses,
            (SELECT COUNT(*) FROM departments) AS departments,
            (SELECT COUNT(*) FROM enrollments WHERE status = 'Approved') AS active_enrollments,
            (SELECT COUNT(*) FROM enrollments WHERE status = 'Pending') AS pending_approvals,
            (SELECT AVG(gpa) FROM students WHERE gpa > 0) AS average_gpa
        "#,
    )
    .fetch_one(db)
    .await
}
