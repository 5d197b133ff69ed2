use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::academics::lifecycle::{self, check_term_state, check_transition};
use crate::academics::{EnrollmentOrigin, RuleViolation, Term, TermCalendar, compute_gpa, letter_grade};
use crate::db::{self, courses, enrollments, students};
use crate::error::AppError;
use crate::models::{
    Course, Enrollment, EnrollmentStatus, NewEnrollmentRequest, UpdateEnrollmentRequest,
};

/// Owns every state change of an enrollment and keeps the student's GPA in
/// step with it. Each operation runs in one transaction.
#[derive(Clone)]
pub struct EnrollmentService {
    db: SqlitePool,
    calendar: TermCalendar,
    default_grade: f64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ApprovalToggleOutcome {
    pub course: Course,
    pub auto_approved: usize,
    pub still_pending: usize,
    /// Pending rows left alone because their term no longer admits approval.
    pub out_of_term: usize,
}

impl EnrollmentService {
    pub fn new(db: SqlitePool, calendar: TermCalendar, default_grade: f64) -> Self {
        Self {
            db,
            calendar,
            default_grade,
        }
    }

    pub fn calendar(&self) -> &TermCalendar {
        &self.calendar
    }

    pub fn current_term(&self) -> Term {
        self.calendar.current_term(today())
    }

    pub async fn enroll_self(
        &self,
        student_id: &str,
        course_id: &str,
        term: Option<&str>,
    ) -> Result<Enrollment, AppError> {
        self.create_enrollment(
            EnrollmentOrigin::SelfService,
            student_id,
            course_id,
            term,
            None,
            None,
        )
        .await
    }

    pub async fn create(&self, req: NewEnrollmentRequest) -> Result<Enrollment, AppError> {
        self.create_enrollment(
            EnrollmentOrigin::Administrative,
            &req.student_id,
            &req.course_id,
            req.term.as_deref(),
            req.status,
            req.grade,
        )
        .await
    }

    async fn create_enrollment(
        &self,
        origin: EnrollmentOrigin,
        student_id: &str,
        course_id: &str,
        term: Option<&str>,
        requested_status: Option<EnrollmentStatus>,
        requested_grade: Option<f64>,
    ) -> Result<Enrollment, AppError> {
        let today = today();
        let term = match term {
            Some(label) => label.parse::<Term>()?,
            None => self.calendar.current_term(today),
        };
        let phase = self.calendar.classify(term, today);

        let mut tx = db::begin_write(&self.db).await?;

        let student = students::find_student_by_id(&mut *tx, student_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let course = courses::find_course_by_id(&mut *tx, course_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let term_label = term.to_string();
        if enrollments::exists_for_term(&mut *tx, &student.id, &course.id, &term_label).await? {
            return Err(RuleViolation::DuplicateEnrollment { term: term_label }.into());
        }
        if enrollments::has_completed(&mut *tx, &student.id, &course.id).await? {
            return Err(RuleViolation::AlreadyCompleted.into());
        }

        let (status, grade) = lifecycle::plan_new_enrollment(
            origin,
            phase,
            course.requires_approval,
            requested_status,
            requested_grade,
            self.default_grade,
        )?;

        let now = Utc::now();
        let enrollment = Enrollment {
            id: Uuid::new_v4().to_string(),
            student_id: student.id.clone(),
            course_id: course.id.clone(),
            term: term_label,
            status,
            grade,
            letter_grade: grade.map(|g| letter_grade(g).to_string()),
            progress: if status == EnrollmentStatus::Completed { 100 } else { 0 },
            hours_studied: 0.0,
            enrolled_at: now,
            updated_at: now,
        };

        // Pending requests are turned away from a full course as well.
        let seat_limit = match status {
            EnrollmentStatus::Rejected | EnrollmentStatus::Dropped => None,
            _ => Some(course.capacity),
        };
        if !enrollments::insert_enrollment(&mut *tx, &enrollment, seat_limit).await? {
            return Err(RuleViolation::CourseFull {
                capacity: course.capacity,
            }
            .into());
        }

        recompute_gpa_in(&mut tx, &student.id).await?;
        tx.commit().await?;

        info!(
            "enrollment {} created: student={} course={} term={} status={} origin={:?}",
            enrollment.id, enrollment.student_id, course.code, enrollment.term, status, origin
        );
        Ok(enrollment)
    }

    pub async fn update(
        &self,
        id: &str,
        req: UpdateEnrollmentRequest,
    ) -> Result<Enrollment, AppError> {
        let mut tx = db::begin_write(&self.db).await?;

        let mut current = enrollments::find_enrollment_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound)?;

        let lifecycle_changed = req.status.is_some() || req.grade.is_some() || req.term.is_some();
        let mut takes_seat = false;

        if let Some(status) = req.status {
            check_transition(current.status, status)?;
            takes_seat = !current.status.occupies_seat() && status.occupies_seat();
            current.status = status;
        }
        if let Some(grade) = req.grade {
            current.grade = grade;
            current.letter_grade = grade.map(|g| letter_grade(g).to_string());
        }
        if let Some(term) = req.term {
            current.term = term.parse::<Term>()?.to_string();
        }
        if let Some(progress) = req.progress {
            current.progress = progress;
        }
        if let Some(hours) = req.hours_studied {
            current.hours_studied = hours;
        }

        if lifecycle_changed {
            let term: Term = current.term.parse()?;
            let phase = self.calendar.classify(term, today());
            check_term_state(phase, current.status, current.grade)?;
        }
        if current.status == EnrollmentStatus::Completed {
            current.progress = 100;
        }
        current.updated_at = Utc::now();

        let seat_limit = if takes_seat {
            let course = courses::find_course_by_id(&mut *tx, &current.course_id)
                .await?
                .ok_or(AppError::NotFound)?;
            Some(course.capacity)
        } else {
            None
        };
        if !enrollments::update_enrollment(&mut *tx, &current, seat_limit).await? {
            return match seat_limit {
                Some(capacity) => Err(RuleViolation::CourseFull { capacity }.into()),
                None => Err(AppError::NotFound),
            };
        }
        recompute_gpa_in(&mut tx, &current.student_id).await?;
        tx.commit().await?;

        debug!("enrollment {} updated to {}", current.id, current.status);
        Ok(current)
    }

    pub async fn approve(&self, id: &str) -> Result<Enrollment, AppError> {
        let mut tx = db::begin_write(&self.db).await?;

        let current = enrollments::find_enrollment_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound)?;
        check_transition(current.status, EnrollmentStatus::Approved)?;
        if current.status == EnrollmentStatus::Approved {
            return Ok(current);
        }
        let phase = self.calendar.classify(current.term.parse()?, today());
        check_term_state(phase, EnrollmentStatus::Approved, current.grade)?;

        let course = courses::find_course_by_id(&mut *tx, &current.course_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if !enrollments::approve_if_seat_available(&mut *tx, id, course.capacity, Utc::now()).await? {
            return Err(RuleViolation::CourseFull {
                capacity: course.capacity,
            }
            .into());
        }

        let approved = enrollments::find_enrollment_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound)?;
        recompute_gpa_in(&mut tx, &approved.student_id).await?;
        tx.commit().await?;

        info!("enrollment {} approved for course {}", id, course.code);
        Ok(approved)
    }

    pub async fn reject(&self, id: &str) -> Result<Enrollment, AppError> {
        let enrollment = self
            .update(
                id,
                UpdateEnrollmentRequest {
                    status: Some(EnrollmentStatus::Rejected),
                    ..Default::default()
                },
            )
            .await?;
        info!("enrollment {} rejected", id);
        Ok(enrollment)
    }

    /// Student drop: removes the row entirely.
    pub async fn drop_enrollment(&self, id: &str) -> Result<(), AppError> {
        let mut tx = db::begin_write(&self.db).await?;

        let current = enrollments::find_enrollment_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound)?;
        lifecycle::check_drop(current.status, current.grade)?;

        enrollments::delete_enrollment(&mut *tx, id).await?;
        recompute_gpa_in(&mut tx, &current.student_id).await?;
        tx.commit().await?;

        info!("enrollment {} dropped by student {}", id, current.student_id);
        Ok(())
    }

    /// Administrative delete from any status.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut tx = db::begin_write(&self.db).await?;

        let current = enrollments::find_enrollment_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound)?;
        enrollments::delete_enrollment(&mut *tx, id).await?;
        recompute_gpa_in(&mut tx, &current.student_id).await?;
        tx.commit().await?;

        info!("enrollment {} deleted ({})", id, current.status);
        Ok(())
    }

    /// Switching approval off admits waiting students, oldest request first,
    /// while seats remain. Switching it on leaves existing rows alone.
    pub async fn set_course_approval(
        &self,
        course_id: &str,
        requires_approval: bool,
    ) -> Result<ApprovalToggleOutcome, AppError> {
        let mut tx = db::begin_write(&self.db).await?;

        let mut course = courses::find_course_by_id(&mut *tx, course_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let was_required = course.requires_approval;
        courses::set_requires_approval(&mut *tx, course_id, requires_approval).await?;
        course.requires_approval = requires_approval;

        let mut auto_approved = 0;
        let mut still_pending = 0;
        let mut out_of_term = 0;
        if was_required && !requires_approval {
            let today = today();
            let pending = enrollments::fetch_pending_for_course(&mut *tx, course_id).await?;
            let mut touched = BTreeSet::new();
            for enrollment in pending {
                let admissible = match enrollment.term.parse::<Term>() {
                    Ok(term) => check_term_state(
                        self.calendar.classify(term, today),
                        EnrollmentStatus::Approved,
                        enrollment.grade,
                    )
                    .is_ok(),
                    Err(_) => false,
                };
                if !admissible {
                    warn!(
                        "enrollment {} stays pending: term {} no longer admits approval",
                        enrollment.id, enrollment.term
                    );
                    still_pending += 1;
                    out_of_term += 1;
                    continue;
                }

                let now = Utc::now();
                if enrollments::approve_if_seat_available(&mut *tx, &enrollment.id, course.capacity, now)
                    .await?
                {
                    auto_approved += 1;
                    touched.insert(enrollment.student_id);
                } else {
                    still_pending += 1;
                }
            }
            for student_id in touched {
                recompute_gpa_in(&mut tx, &student_id).await?;
            }
        }

        tx.commit().await?;

        info!(
            "course {} requires_approval {} -> {} (auto-approved {}, still pending {}, out of term {})",
            course.code, was_required, requires_approval, auto_approved, still_pending, out_of_term
        );
        Ok(ApprovalToggleOutcome {
            course,
            auto_approved,
            still_pending,
            out_of_term,
        })
    }

    pub async fn recompute_gpa(&self, student_id: &str) -> Result<f64, AppError> {
        let mut conn = self.db.acquire().await?;
        recompute_gpa_in(&mut conn, student_id).await
    }
}

/// Recomputes and stores the student's GPA on the given connection, which
/// is usually an open transaction.
pub(crate) async fn recompute_gpa_in(
    conn: &mut SqliteConnection,
    student_id: &str,
) -> Result<f64, AppError> {
    let rows = enrollments::grade_rows(&mut *conn, student_id).await?;
    let gpa = compute_gpa(rows);
    if !students::update_gpa(&mut *conn, student_id, gpa).await? {
        return Err(AppError::NotFound);
    }
    debug!("student {} gpa recomputed: {:.3}", student_id, gpa);
    Ok(gpa)
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
