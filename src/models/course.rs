use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: String,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub credits: i32,
    pub department_id: String,
    pub instructor_id: Option<String>,
    pub capacity: i32,
    pub requires_approval: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_new_course_dates"))]
pub struct NewCourseRequest {
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 0, max = 12))]
    pub credits: i32,
    pub department_id: String,
    pub instructor_id: Option<String>,
    #[validate(range(min = 1))]
    pub capacity: i32,
    #[serde(default)]
    pub requires_approval: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Approval requirement is changed through its own endpoint because
/// flipping it has side effects on pending enrollments.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, max = 20))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, max = 12))]
    pub credits: Option<i32>,
    pub department_id: Option<String>,
    pub instructor_id: Option<String>,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseApprovalRequest {
    pub requires_approval: bool,
}

fn validate_new_course_dates(req: &NewCourseRequest) -> Result<(), ValidationError> {
    if req.end_date < req.start_date {
        return Err(ValidationError::new("end_date_before_start_date"));
    }
    Ok(())
}
