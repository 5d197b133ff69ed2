use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{Instructor, NewInstructorRequest, UpdateInstructorRequest};

const COLUMNS: &str = "id, name, email, department_id, hire_date, created_at, updated_at";

pub async fn fetch_instructors(db: &SqlitePool) -> Result<Vec<Instructor>, sqlx::Error> {
    sqlx::query_as::<_, Instructor>(&format!(
        "SELECT {COLUMNS} FROM instructors ORDER BY name"
    ))
    .fetch_all(db)
    .await
}

pub async fn find_instructor_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Instructor>, sqlx::Error> {
    sqlx::query_as::<_, Instructor>(&format!("SELECT {COLUMNS} FROM instructors WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_instructor(
    db: &SqlitePool,
    req: NewInstructorRequest,
) -> Result<Instructor, sqlx::Error> {
    let now = Utc::now();
    let instructor = Instructor {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        email: req.email.to_lowercase(),
        department_id: req.department_id,
        hire_date: req.hire_date.unwrap_or_else(|| now.date_naive()),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO instructors
            (id, name, email, department_id, hire_date, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
        "#,
    )
    .bind(&instructor.id)
    .bind(&instructor.name)
    .bind(&instructor.email)
    .bind(&instructor.department_id)
    .bind(instructor.hire_date)
    .bind(now)
    .execute(db)
    .await?;

    Ok(instructor)
}

pub async fn update_instructor(
    db: &SqlitePool,
    id: &str,
    req: UpdateInstructorRequest,
) -> Result<Option<Instructor>, sqlx::Error> {
    let mut current = match find_instructor_by_id(db, id).await? {
        Some(i) => i,
        None => return Ok(None),
    };

    if let Some(name) = req.name {
        current.name = name;
    }
    if let Some(email) = req.email {
        current.email = email.to_lowercase();
    }
    if let Some(department_id) = req.department_id {
        current.department_id = Some(department_id);
    }
    if let Some(hire_date) = req.hire_date {
        current.hire_date = hire_date;
    }
    current.updated_at = Utc::now();

    sqlx::query(
        r#"
        UPDATE instructors
        SET name = ?1,
            email = ?2,
            department_id = ?3,
            hire_date = ?4,
            updated_at = ?5
        WHERE id = ?6
        "#,
    )
    .bind(&current.name)
    .bind(&current.email)
    .bind(&current.department_id)
    .bind(current.hire_date)
    .bind(current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_instructor(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM instructors WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
