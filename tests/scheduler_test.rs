mod common;

use std::sync::Arc;
use std::time::Duration;

use campus::db::enrollments;
use campus::models::{Enrollment, EnrollmentStatus};
use campus::services::{
    CompletionSweep, MetricsScheduler, NoopMetricsPublisher, SweepScheduler, WatchPublisher,
};
use chrono::Utc;
use common::*;
use uuid::Uuid;

fn approved(student_id: &str, course_id: &str, term: &str, grade: Option<f64>) -> Enrollment {
    let now = Utc::now();
    Enrollment {
        id: Uuid::new_v4().to_string(),
        student_id: student_id.to_string(),
        course_id: course_id.to_string(),
        term: term.to_string(),
        status: EnrollmentStatus::Approved,
        grade,
        letter_grade: None,
        progress: 40,
        hours_studied: 12.5,
        enrolled_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_sweep_completes_ended_past_term_enrollments() {
    let (pool, _service) = setup().await;
    let dept = department(&pool, "MA").await;
    let c = course(&pool, &dept.id, "MA101", 10, false).await;
    let alice = student(&pool, "alice").await;
    let bob = student(&pool, "bob").await;

    // Rows left Approved after their term rolled over.
    let stale = approved(&alice.id, &c.id, "Spring 2025", None);
    let current = approved(&bob.id, &c.id, "Fall 2025", None);
    let broken = approved(&bob.id, &c.id, "Someday", None);
    for row in [&stale, &current, &broken] {
        enrollments::insert_enrollment(&pool, row, None).await.unwrap();
    }

    let sweep = CompletionSweep::new(pool.clone(), calendar(), DEFAULT_GRADE);
    let stats = sweep.run(date(2026, 1, 10)).await.unwrap();
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.students_recomputed, 1);

    let done = enrollments::find_enrollment_by_id(&pool, &stale.id).await.unwrap().unwrap();
    assert_eq!(done.status, EnrollmentStatus::Completed);
    assert_eq!(done.grade, Some(DEFAULT_GRADE));
    assert_eq!(done.letter_grade.as_deref(), Some("A-"));
    assert_eq!(done.progress, 100);
    assert_eq!(gpa_of(&pool, &alice.id).await, DEFAULT_GRADE);

    let untouched = enrollments::find_enrollment_by_id(&pool, &current.id).await.unwrap().unwrap();
    assert_eq!(untouched.status, EnrollmentStatus::Approved);
    assert_eq!(untouched.grade, None);
}

#[tokio::test]
async fn test_sweep_ignores_courses_still_running() {
    let (pool, _service) = setup().await;
    let dept = department(&pool, "MA").await;
    let c = course(&pool, &dept.id, "MA101", 10, false).await;
    let alice = student(&pool, "alice").await;

    let row = approved(&alice.id, &c.id, "Spring 2025", None);
    enrollments::insert_enrollment(&pool, &row, None).await.unwrap();

    let sweep = CompletionSweep::new(pool.clone(), calendar(), DEFAULT_GRADE);
    // Course ends 2025-12-15.
    let stats = sweep.run(date(2025, 12, 15)).await.unwrap();
    assert_eq!(stats.completed, 0);
    assert_eq!(stats.skipped, 0);
}

#[tokio::test]
async fn test_sweep_keeps_existing_grade() {
    let (pool, _service) = setup().await;
    let dept = department(&pool, "MA").await;
    let c = course(&pool, &dept.id, "MA101", 10, false).await;
    let alice = student(&pool, "alice").await;

    let row = approved(&alice.id, &c.id, "Summer 2025", Some(2.0));
    enrollments::insert_enrollment(&pool, &row, None).await.unwrap();

    let sweep = CompletionSweep::new(pool.clone(), calendar(), DEFAULT_GRADE);
    sweep.run(date(2026, 2, 1)).await.unwrap();

    let done = enrollments::find_enrollment_by_id(&pool, &row.id).await.unwrap().unwrap();
    assert_eq!(done.grade, Some(2.0));
    assert_eq!(gpa_of(&pool, &alice.id).await, 2.0);
}

#[tokio::test]
async fn test_metrics_tick_publishes_snapshot() {
    let (pool, service) = setup().await;
    let dept = department(&pool, "MA").await;
    let open = course(&pool, &dept.id, "MA101", 10, false).await;
    let gated = course(&pool, &dept.id, "MA201", 10, true).await;
    let alice = student(&pool, "alice").await;
    student(&pool, "bob").await;

    service.enroll_self(&alice.id, &open.id, None).await.unwrap();
    service.enroll_self(&alice.id, &gated.id, None).await.unwrap();

    let (publisher, rx) = WatchPublisher::channel();
    let scheduler = MetricsScheduler::new(pool, Arc::new(publisher), 60);
    let snapshot = scheduler.tick().await.unwrap();

    assert_eq!(snapshot.total_students, 2);
    assert_eq!(snapshot.total_courses, 2);
    assert_eq!(snapshot.total_departments, 1);
    assert_eq!(snapshot.active_enrollments, 1);
    assert_eq!(snapshot.pending_approvals, 1);
    assert_eq!(snapshot.average_gpa, 0.0);
    assert_eq!(rx.borrow().as_ref(), Some(&snapshot));
}

#[tokio::test]
async fn test_metrics_scheduler_keeps_running() {
    let pool = setup_pool().await;
    let scheduler = MetricsScheduler::new(pool.clone(), Arc::new(NoopMetricsPublisher), 1);

    let task = tokio::spawn(scheduler.start());
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(!task.is_finished());
    task.abort();

    // A sweep scheduler over an empty database ticks cleanly too.
    let sweep = SweepScheduler::new(CompletionSweep::new(pool, calendar(), DEFAULT_GRADE), 1);
    let stats = sweep.tick().await.unwrap();
    assert_eq!(stats.completed, 0);
}
