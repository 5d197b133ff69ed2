use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

use crate::models::{Course, NewCourseRequest, UpdateCourseRequest};

const COLUMNS: &str = "id, code, title, description, credits, department_id, instructor_id, \
    capacity, requires_approval, start_date, end_date, created_at, updated_at";

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COLUMNS} FROM courses ORDER BY code"
    ))
    .fetch_all(db)
    .await
}

pub async fn find_course_by_id<'e, E>(db: E, id: &str) -> Result<Option<Course>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Course>(&format!("SELECT {COLUMNS} FROM courses WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_course(
    db: &SqlitePool,
    req: NewCourseRequest,
) -> Result<Course, sqlx::Error> {
    let now = Utc::now();
    let course = Course {
        id: Uuid::new_v4().to_string(),
        code: req.code.to_uppercase(),
        title: req.title,
        description: req.description,
        credits: req.credits,
        department_id: req.department_id,
        instructor_id: req.instructor_id,
        capacity: req.capacity,
        requires_approval: req.requires_approval,
        start_date: req.start_date,
        end_date: req.end_date,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO courses
            (id, code, title, description, credits, department_id, instructor_id,
            capacity, requires_approval, start_date, end_date, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
        "#,
    )
    .bind(&course.id)
    .bind(&course.code)
    .bind(&course.title)
    .bind(&course.description)
    .bind(course.credits)
    .bind(&course.department_id)
    .bind(&course.instructor_id)
    .bind(course.capacity)
    .bind(course.requires_approval)
    .bind(course.start_date)
    .bind(course.end_date)
    .bind(now)
    .execute(db)
    .await?;

    Ok(course)
}

pub async fn update_course(
    db: &SqlitePool,
    id: &str,
    req: UpdateCourseRequest,
) -> Result<Option<Course>, sqlx::Error> {
    let mut current = match find_course_by_id(db, id).await? {
        Some(c) => c,
        None => return Ok(None),
    };

    if let Some(code) = req.code {
        current.code = code.to_uppercase();
    }
    if let Some(title) = req.title {
        current.title = title;
    }
    if let Some(description) = req.description {
        current.description = Some(description);
    }
    if let Some(credits) = req.credits {
        current.credits = credits;
    }
    if let Some(department_id) = req.department_id {
        current.department_id = department_id;
    }
    if let Some(instructor_id) = req.instructor_id {
        current.instructor_id = Some(instructor_id);
    }
    if let Some(capacity) = req.capacity {
        current.capacity = capacity;
    }
    if let Some(start_date) = req.start_date {
        current.start_date = start_date;
    }
    if let Some(end_date) = req.end_date {
        current.end_date = end_date;
    }
    current.updated_at = Utc::now();

    sqlx::query(
        r#"
        UPDATE courses
        SET code = ?1,
            title = ?2,
            description = ?3,
            credits = ?4,
            department_id = ?5,
            instructor_id = ?6,
            capacity = ?7,
            start_date = ?8,
            end_date = ?9,
            updated_at = ?10
        WHERE id = ?11
        "#,
    )
    .bind(&current.code)
    .bind(&current.title)
    .bind(&current.description)
    .bind(current.credits)
    .bind(&current.department_id)
    .bind(&current.instructor_id)
    .bind(current.capacity)
    .bind(current.start_date)
    .bind(current.end_date)
    .bind(current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn set_requires_approval<'e, E>(
    db: E,
    id: &str,
    requires_approval: bool,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE courses SET requires_approval = ?1, updated_at = ?2 WHERE id = ?3",
    )
    .bind(requires_approval)
    .bind(Utc::now())
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

/// Fails with a foreign key violation while enrollments reference the course.
pub async fn delete_course(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::db::{departments, setup_test_db};
    use crate::models::NewDepartmentRequest;

    async fn department_id(pool: &SqlitePool) -> String {
        departments::insert_department(
            pool,
            NewDepartmentRequest {
                name: "Physics".to_string(),
                code: "PHY".to_string(),
            },
        )
        .await
        .expect("Failed to insert department")
        .id
    }

    fn mechanics(department_id: &str) -> NewCourseRequest {
        NewCourseRequest {
            code: "phy101".to_string(),
            title: "Mechanics".to_string(),
            description: None,
            credits: 4,
            department_id: department_id.to_string(),
            instructor_id: None,
            capacity: 30,
            requires_approval: false,
            start_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 15).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_course() {
        let pool = setup_test_db().await;
        let department_id = department_id(&pool).await;

        let course = insert_course(&pool, mechanics(&department_id))
            .await
            .expect("Failed to insert course");
        assert_eq!(course.code, "PHY101");

        let courses = fetch_courses(&pool).await.expect("Failed to fetch courses");
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].end_date, course.end_date);
        assert!(!courses[0].requires_approval);
    }

    #[tokio::test]
    async fn test_code_unique_within_department() {
        let pool = setup_test_db().await;
        let department_id = department_id(&pool).await;

        insert_course(&pool, mechanics(&department_id)).await.unwrap();
        let err = insert_course(&pool, mechanics(&department_id))
            .await
            .expect_err("duplicate accepted");
        assert!(err.as_database_error().is_some_and(|e| e.is_unique_violation()));
    }

    #[tokio::test]
    async fn test_unknown_department_is_rejected() {
        let pool = setup_test_db().await;

        let err = insert_course(&pool, mechanics("nope"))
            .await
            .expect_err("dangling department accepted");
        assert!(err.as_database_error().is_some_and(|e| e.is_foreign_key_violation()));
    }

    #[tokio::test]
    async fn test_set_requires_approval() {
        let pool = setup_test_db().await;
        let department_id = department_id(&pool).await;
        let course = insert_course(&pool, mechanics(&department_id)).await.unwrap();

        assert!(set_requires_approval(&pool, &course.id, true).await.unwrap());
        let found = find_course_by_id(&pool, &course.id).await.unwrap().unwrap();
        assert!(found.requires_approval);
    }
}
