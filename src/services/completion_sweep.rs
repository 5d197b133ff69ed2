use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::academics::{Term, TermCalendar, TermPhase, letter_grade};
use crate::db::{self, enrollments};
use crate::error::AppError;
use crate::models::EnrollmentStatus;
use crate::services::enrollment_service::recompute_gpa_in;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SweepStats {
    pub completed: usize,
    pub skipped: usize,
    pub students_recomputed: usize,
}

/// Closes out approved enrollments once their course has ended.
#[derive(Clone)]
pub struct CompletionSweep {
    db: SqlitePool,
    calendar: TermCalendar,
    default_grade: f64,
}

impl CompletionSweep {
    pub fn new(db: SqlitePool, calendar: TermCalendar, default_grade: f64) -> Self {
        Self {
            db,
            calendar,
            default_grade,
        }
    }

    pub async fn run(&self, today: NaiveDate) -> Result<SweepStats, AppError> {
        let mut stats = SweepStats::default();
        let mut tx = db::begin_write(&self.db).await?;

        let candidates = enrollments::fetch_completion_candidates(&mut *tx, today).await?;
        let mut touched = BTreeSet::new();

        for mut enrollment in candidates {
            let term = match enrollment.term.parse::<Term>() {
                Ok(term) => term,
                Err(e) => {
                    warn!("skipping enrollment {}: {}", enrollment.id, e);
                    stats.skipped += 1;
                    continue;
                }
            };
            // Grades may not appear before a term is over.
            if self.calendar.classify(term, today) != TermPhase::Past {
                stats.skipped += 1;
                continue;
            }

            let grade = enrollment.grade.unwrap_or(self.default_grade);
            enrollment.status = EnrollmentStatus::Completed;
            enrollment.grade = Some(grade);
            enrollment.letter_grade = Some(letter_grade(grade).to_string());
            enrollment.progress = 100;
            enrollment.updated_at = Utc::now();

            enrollments::update_enrollment(&mut *tx, &enrollment, None).await?;
            touched.insert(enrollment.student_id);
            stats.completed += 1;
        }

        for student_id in &touched {
            recompute_gpa_in(&mut tx, student_id).await?;
        }
        stats.students_recomputed = touched.len();

        tx.commit().await?;

        info!(
            "completion sweep: completed {}, skipped {}, recomputed {} students",
            stats.completed, stats.skipped, stats.students_recomputed
        );
        Ok(stats)
    }
}
