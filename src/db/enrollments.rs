use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

use crate::models::{Enrollment, EnrollmentFilter, EnrollmentStatus};

const COLUMNS: &str = "id, student_id, course_id, term, status, grade, letter_grade, progress, \
    hours_studied, enrolled_at, updated_at";

pub async fn fetch_enrollments(
    db: &SqlitePool,
    filter: &EnrollmentFilter,
) -> Result<Vec<Enrollment>, sqlx::Error> {
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM enrollments WHERE 1 = 1"));

    if let Some(student_id) = &filter.student_id {
        query.push(" AND student_id = ").push_bind(student_id);
    }
    if let Some(course_id) = &filter.course_id {
        query.push(" AND course_id = ").push_bind(course_id);
    }
    if let Some(term) = &filter.term {
        query.push(" AND term = ").push_bind(term);
    }
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status);
    }
    query.push(" ORDER BY enrolled_at DESC");

    query.build_query_as::<Enrollment>().fetch_all(db).await
}

pub async fn find_enrollment_by_id<'e, E>(db: E, id: &str) -> Result<Option<Enrollment>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Enrollment>(&format!("SELECT {COLUMNS} FROM enrollments WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn exists_for_term<'e, E>(
    db: E,
    student_id: &str,
    course_id: &str,
    term: &str,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM enrollments WHERE student_id = ?1 AND course_id = ?2 AND term = ?3",
    )
    .bind(student_id)
    .bind(course_id)
    .bind(term)
    .fetch_one(db)
    .await?;

    Ok(count > 0)
}

pub async fn has_completed<'e, E>(
    db: E,
    student_id: &str,
    course_id: &str,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM enrollments WHERE student_id = ?1 AND course_id = ?2 AND status = 'Completed'",
    )
    .bind(student_id)
    .bind(course_id)
    .fetch_one(db)
    .await?;

    Ok(count > 0)
}

pub async fn seats_taken<'e, E>(db: E, course_id: &str) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM enrollments WHERE course_id = ? AND status IN ('Approved', 'Completed')",
    )
    .bind(course_id)
    .fetch_one(db)
    .await
}

/// Inserts the row. With a `seat_limit` the insert only happens while
/// fewer than `seat_limit` seats are taken; the count and the write are one
/// statement so concurrent enrollments cannot both squeeze in.
/// Returns false when the course was full.
pub async fn insert_enrollment<'e, E>(
    db: E,
    enrollment: &Enrollment,
    seat_limit: Option<i32>,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let limit = seat_limit.map(i64::from).unwrap_or(i64::MAX);

    let result = sqlx::query(
        r#"
        INSERT INTO enrollments
            (id, student_id, course_id, term, status, grade, letter_grade,
            progress, hours_studied, enrolled_at, updated_at)
        SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11
        WHERE (
            SELECT COUNT(*) FROM enrollments
            WHERE course_id = ?3 AND status IN ('Approved', 'Completed')
        ) < ?12
        "#,
    )
    .bind(&enrollment.id)
    .bind(&enrollment.student_id)
    .bind(&enrollment.course_id)
    .bind(&enrollment.term)
    .bind(enrollment.status)
    .bind(enrollment.grade)
    .bind(&enrollment.letter_grade)
    .bind(enrollment.progress)
    .bind(enrollment.hours_studied)
    .bind(enrollment.enrolled_at)
    .bind(enrollment.updated_at)
    .bind(limit)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

/// Writes every mutable column. With a `seat_limit` the write only happens
/// while fewer than `seat_limit` other rows of the course hold a seat,
/// checked in the same statement. Returns false when nothing was written.
pub async fn update_enrollment<'e, E>(
    db: E,
    enrollment: &Enrollment,
    seat_limit: Option<i32>,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let limit = seat_limit.map(i64::from).unwrap_or(i64::MAX);

    let result = sqlx::query(
        r#"
        UPDATE enrollments
        SET term = ?1,
            status = ?2,
            grade = ?3,
            letter_grade = ?4,
            progress = ?5,
            hours_studied = ?6,
            updated_at = ?7
        WHERE id = ?8
          AND (
            SELECT COUNT(*) FROM enrollments AS taken
            WHERE taken.course_id = enrollments.course_id
              AND taken.id <> enrollments.id
              AND taken.status IN ('Approved', 'Completed')
          ) < ?9
        "#,
    )
    .bind(&enrollment.term)
    .bind(enrollment.status)
    .bind(enrollment.grade)
    .bind(&enrollment.letter_grade)
    .bind(enrollment.progress)
    .bind(enrollment.hours_studied)
    .bind(enrollment.updated_at)
    .bind(&enrollment.id)
    .bind(limit)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

/// Pending -> Approved, guarded by the same single-statement seat check as
/// inserts. Returns false when the row is not pending or no seat is left.
pub async fn approve_if_seat_available<'e, E>(
    db: E,
    id: &str,
    capacity: i32,
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE enrollments
        SET status = 'Approved', updated_at = ?2
        WHERE id = ?1
          AND status = 'Pending'
          AND (
            SELECT COUNT(*) FROM enrollments AS taken
            WHERE taken.course_id = enrollments.course_id
              AND taken.status IN ('Approved', 'Completed')
          ) < ?3
        "#,
    )
    .bind(id)
    .bind(now)
    .bind(capacity)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn delete_enrollment<'e, E>(db: E, id: &str) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM enrollments WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn grade_rows<'e, E>(
    db: E,
    student_id: &str,
) -> Result<Vec<(EnrollmentStatus, Option<f64>)>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, (EnrollmentStatus, Option<f64>)>(
        "SELECT status, grade FROM enrollments WHERE student_id = ?",
    )
    .bind(student_id)
    .fetch_all(db)
    .await
}

/// Approved enrollments whose course ended before `today`.
pub async fn fetch_completion_candidates<'e, E>(
    db: E,
    today: NaiveDate,
) -> Result<Vec<Enrollment>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Enrollment>(
        r#"
        SELECT e.id, e.student_id, e.course_id, e.term, e.status, e.grade, e.letter_grade,
               e.progress, e.hours_studied, e.enrolled_at, e.updated_at
        FROM enrollments e
        JOIN courses c ON c.id = e.course_id
        WHERE e.status = 'Approved' AND c.end_date < ?
        ORDER BY e.enrolled_at
        "#,
    )
    .bind(today)
    .fetch_all(db)
    .await
}

pub async fn fetch_pending_for_course<'e, E>(
    db: E,
    course_id: &str,
) -> Result<Vec<Enrollment>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {COLUMNS} FROM enrollments WHERE course_id = ? AND status = 'Pending' ORDER BY enrolled_at, rowid"
    ))
    .bind(course_id)
    .fetch_all(db)
    .await
}
