use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub major: String,
    pub department_id: Option<String>,
    pub advisor_id: Option<String>,
    /// Derived from enrollments, never written by clients.
    pub gpa: f64,
    pub total_credits_required: i32,
    pub enrollment_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewStudentRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 120))]
    pub major: String,
    pub department_id: Option<String>,
    pub advisor_id: Option<String>,
    #[validate(range(min = 1, max = 400))]
    pub total_credits_required: Option<i32>,
    pub enrollment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateStudentRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 120))]
    pub major: Option<String>,
    pub department_id: Option<String>,
    pub advisor_id: Option<String>,
    #[validate(range(min = 1, max = 400))]
    pub total_credits_required: Option<i32>,
}
