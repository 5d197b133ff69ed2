#![allow(dead_code)]

use campus::academics::{Season, Term, TermCalendar};
use campus::db::{self, courses, departments, students};
use campus::models::{
    Course, Department, NewCourseRequest, NewDepartmentRequest, NewStudentRequest, Student,
};
use campus::services::EnrollmentService;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use tempfile::TempDir;

pub const DEFAULT_GRADE: f64 = 3.5;

pub fn fall_2025() -> Term {
    Term::new(Season::Fall, 2025)
}

pub fn calendar() -> TermCalendar {
    TermCalendar::pinned(fall_2025())
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub async fn setup_pool() -> SqlitePool {
    let pool = db::connect_in_memory()
        .await
        .expect("Failed to create database");
    db::migrate(&pool).await.expect("Failed to run migrations");
    pool
}

/// File-backed pool with several connections, for tests that need real
/// concurrent writers. Keep the returned directory alive for the test.
pub async fn setup_file_pool(max_connections: u32) -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("campus.db").display());
    let pool = db::connect(&url, max_connections)
        .await
        .expect("Failed to create database");
    db::migrate(&pool).await.expect("Failed to run migrations");
    (dir, pool)
}

pub async fn setup() -> (SqlitePool, EnrollmentService) {
    let pool = setup_pool().await;
    let service = EnrollmentService::new(pool.clone(), calendar(), DEFAULT_GRADE);
    (pool, service)
}

pub async fn department(pool: &SqlitePool, code: &str) -> Department {
    departments::insert_department(
        pool,
        NewDepartmentRequest {
            name: format!("Department {code}"),
            code: code.to_string(),
        },
    )
    .await
    .expect("Failed to insert department")
}

pub async fn course(
    pool: &SqlitePool,
    department_id: &str,
    code: &str,
    capacity: i32,
    requires_approval: bool,
) -> Course {
    courses::insert_course(
        pool,
        NewCourseRequest {
            code: code.to_string(),
            title: format!("Course {code}"),
            description: None,
            credits: 3,
            department_id: department_id.to_string(),
            instructor_id: None,
            capacity,
            requires_approval,
            start_date: date(2025, 9, 1),
            end_date: date(2025, 12, 15),
        },
    )
    .await
    .expect("Failed to insert course")
}

pub async fn student(pool: &SqlitePool, handle: &str) -> Student {
    students::insert_student(
        pool,
        NewStudentRequest {
            name: handle.to_string(),
            email: format!("{handle}@example.edu"),
            major: "Undeclared".to_string(),
            department_id: None,
            advisor_id: None,
            total_credits_required: None,
            enrollment_date: None,
        },
    )
    .await
    .expect("Failed to insert student")
}

pub async fn gpa_of(pool: &SqlitePool, student_id: &str) -> f64 {
    students::find_student_by_id(pool, student_id)
        .await
        .expect("Failed to fetch student")
        .expect("Student not found")
        .gpa
}
