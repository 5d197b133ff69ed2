use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{Department, NewDepartmentRequest, UpdateDepartmentRequest};

const COLUMNS: &str = "id, name, code, created_at, updated_at";

pub async fn fetch_departments(db: &SqlitePool) -> Result<Vec<Department>, sqlx::Error> {
    sqlx::query_as::<_, Department>(&format!(
        "SELECT {COLUMNS} FROM departments ORDER BY name"
    ))
    .fetch_all(db)
    .await
}

pub async fn find_department_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Department>, sqlx::Error> {
    sqlx::query_as::<_, Department>(&format!("SELECT {COLUMNS} FROM departments WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_department(
    db: &SqlitePool,
    req: NewDepartmentRequest,
) -> Result<Department, sqlx::Error> {
    let now = Utc::now();
    let department = Department {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        code: req.code.to_uppercase(),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO departments (id, name, code, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?4)
        "#,
    )
    .bind(&department.id)
    .bind(&department.name)
    .bind(&department.code)
    .bind(now)
    .execute(db)
    .await?;

    Ok(department)
}

pub async fn update_department(
    db: &SqlitePool,
    id: &str,
    req: UpdateDepartmentRequest,
) -> Result<Option<Department>, sqlx::Error> {
    let mut current = match find_department_by_id(db, id).await? {
        Some(d) => d,
        None => return Ok(None),
    };

    if let Some(name) = req.name {
        current.name = name;
    }
    if let Some(code) = req.code {
        current.code = code.to_uppercase();
    }
    current.updated_at = Utc::now();

    sqlx::query("UPDATE departments SET name = ?1, code = ?2, updated_at = ?3 WHERE id = ?4")
        .bind(&current.name)
        .bind(&current.code)
        .bind(current.updated_at)
        .bind(id)
        .execute(db)
        .await?;

    Ok(Some(current))
}

pub async fn delete_department(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM departments WHERE id = ?")
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

    fn cs() -> NewDepartmentRequest {
        NewDepartmentRequest {
            name: "Computer Science".to_string(),
            code: "cs".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_department() {
        let pool = setup_test_db().await;

        let department = insert_department(&pool, cs()).await.expect("Failed to insert");
        assert_eq!(department.code, "CS");

        let all = fetch_departments(&pool).await.expect("Failed to fetch");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, department.id);
    }

    #[tokio::test]
    async fn test_duplicate_name_is_rejected() {
        let pool = setup_test_db().await;

        insert_department(&pool, cs()).await.expect("Failed to insert");
        let err = insert_department(&pool, cs()).await.expect_err("duplicate accepted");
        let is_unique = err
            .as_database_error()
            .map(|e| e.is_unique_violation())
            .unwrap_or(false);
        assert!(is_unique);
    }

    #[tokio::test]
    async fn test_update_and_delete_department() {
        let pool = setup_test_db().await;
        let department = insert_department(&pool, cs()).await.expect("Failed to insert");

        let updated = update_department(
            &pool,
            &department.id,
            UpdateDepartmentRequest {
                name: Some("Computing".to_string()),
                code: None,
            },
        )
        .await
        .expect("Failed to update")
        .expect("Department not found");
        assert_eq!(updated.name, "Computing");
        assert_eq!(updated.code, "CS");

        assert!(delete_department(&pool, &department.id).await.unwrap());
        assert!(!delete_department(&pool, &department.id).await.unwrap());
    }
}
