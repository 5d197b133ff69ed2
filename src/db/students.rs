use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

use crate::models::{NewStudentRequest, Student, UpdateStudentRequest};

const COLUMNS: &str = "id, name, email, major, department_id, advisor_id, gpa, \
    total_credits_required, enrollment_date, created_at, updated_at";

pub async fn fetch_students(db: &SqlitePool) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students ORDER BY name"))
        .fetch_all(db)
        .await
}

pub async fn find_student_by_id<'e, E>(db: E, id: &str) -> Result<Option<Student>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_student(
    db: &SqlitePool,
    req: NewStudentRequest,
) -> Result<Student, sqlx::Error> {
    let now = Utc::now();
    let student = Student {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        email: req.email.to_lowercase(),
        major: req.major,
        department_id: req.department_id,
        advisor_id: req.advisor_id,
        gpa: 0.0,
        total_credits_required: req.total_credits_required.unwrap_or(120),
        enrollment_date: req.enrollment_date.unwrap_or_else(|| now.date_naive()),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO students
            (id, name, email, major, department_id, advisor_id, gpa,
            total_credits_required, enrollment_date, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8, ?9, ?9)
        "#,
    )
    .bind(&student.id)
    .bind(&student.name)
    .bind(&student.email)
    .bind(&student.major)
    .bind(&student.department_id)
    .bind(&student.advisor_id)
    .bind(student.total_credits_required)
    .bind(student.enrollment_date)
    .bind(now)
    .execute(db)
    .await?;

    Ok(student)
}

pub async fn update_student(
    db: &SqlitePool,
    id: &str,
    req: UpdateStudentRequest,
) -> Result<Option<Student>, sqlx::Error> {
    let mut current = match find_student_by_id(db, id).await? {
        Some(s) => s,
        None => return Ok(None),
    };

    if let Some(name) = req.name {
        current.name = name;
    }
    if let Some(email) = req.email {
        current.email = email.to_lowercase();
    }
    if let Some(major) = req.major {
        current.major = major;
    }
    if let Some(department_id) = req.department_id {
        current.department_id = Some(department_id);
    }
    if let Some(advisor_id) = req.advisor_id {
        current.advisor_id = Some(advisor_id);
    }
    if let Some(total) = req.total_credits_required {
        current.total_credits_required = total;
    }
    current.updated_at = Utc::now();

    sqlx::query(
        r#"
        UPDATE students
        SET name = ?1,
            email = ?2,
            major = ?3,
            department_id = ?4,
            advisor_id = ?5,
            total_credits_required = ?6,
            updated_at = ?7
        WHERE id = ?8
        "#,
    )
    .bind(&current.name)
    .bind(&current.email)
    .bind(&current.major)
    .bind(&current.department_id)
    .bind(&current.advisor_id)
    .bind(current.total_credits_required)
    .bind(current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn update_gpa<'e, E>(db: E, id: &str, gpa: f64) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE students SET gpa = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(gpa)
        .bind(Utc::now())
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Enrollments go with the student through the cascading foreign key.
pub async fn delete_student(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM students WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::setup_test_db;

    fn ada() -> NewStudentRequest {
        NewStudentRequest {
            name: "Ada Lovelace".to_string(),
            email: "Ada@Example.edu".to_string(),
            major: "Mathematics".to_string(),
            department_id: None,
            advisor_id: None,
            total_credits_required: None,
            enrollment_date: None,
        }
    }

    #[tokio::test]
    async fn test_insert_student_defaults() {
        let pool = setup_test_db().await;

        let student = insert_student(&pool, ada()).await.expect("Failed to insert student");
        assert_eq!(student.email, "ada@example.edu");
        assert_eq!(student.gpa, 0.0);
        assert_eq!(student.total_credits_required, 120);

        let found = find_student_by_id(&pool, &student.id)
            .await
            .expect("Failed to fetch")
            .expect("Student not found");
        assert_eq!(found.name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_email_is_unique() {
        let pool = setup_test_db().await;

        insert_student(&pool, ada()).await.expect("Failed to insert student");
        let err = insert_student(&pool, ada()).await.expect_err("duplicate accepted");
        assert!(err.as_database_error().is_some_and(|e| e.is_unique_violation()));
    }

    #[tokio::test]
    async fn test_update_gpa() {
        let pool = setup_test_db().await;
        let student = insert_student(&pool, ada()).await.expect("Failed to insert student");

        assert!(update_gpa(&pool, &student.id, 3.25).await.unwrap());
        let found = find_student_by_id(&pool, &student.id).await.unwrap().unwrap();
        assert_eq!(found.gpa, 3.25);

        assert!(!update_gpa(&pool, "missing", 1.0).await.unwrap());
    }
}
