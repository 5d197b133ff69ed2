use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Rejected,
    Dropped,
    Completed,
}

impl EnrollmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "Pending",
            EnrollmentStatus::Approved => "Approved",
            EnrollmentStatus::Rejected => "Rejected",
            EnrollmentStatus::Dropped => "Dropped",
            EnrollmentStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    pub term: String,
    pub status: EnrollmentStatus,
    pub grade: Option<f64>,
    pub letter_grade: Option<String>,
    pub progress: i32,
    pub hours_studied: f64,
    pub enrolled_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Student self-enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfEnrollRequest {
    pub course_id: String,
    pub term: Option<String>,
}

/// Administrative creation; may record historical (graded) enrollments.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewEnrollmentRequest {
    pub student_id: String,
    pub course_id: String,
    pub term: Option<String>,
    pub status: Option<EnrollmentStatus>,
    #[validate(range(min = 0.0, max = 4.0))]
    pub grade: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateEnrollmentRequest {
    pub status: Option<EnrollmentStatus>,
    /// Absent leaves the grade alone, `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub grade: Option<Option<f64>>,
    pub term: Option<String>,
    #[validate(range(min = 0, max = 100))]
    pub progress: Option<i32>,
    #[validate(range(min = 0.0))]
    pub hours_studied: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrollmentFilter {
    pub student_id: Option<String>,
    pub course_id: Option<String>,
    pub term: Option<String>,
    pub status: Option<EnrollmentStatus>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
