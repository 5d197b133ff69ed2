use thiserror::Error;

use super::grading::is_valid_grade;
use super::term::TermPhase;
use crate::models::EnrollmentStatus;

#[derive(Debug, Error, PartialEq)]
pub enum RuleViolation {
    #[error("course is full (capacity {capacity})")]
    CourseFull { capacity: i32 },

    #[error("student has already completed this course")]
    AlreadyCompleted,

    #[error("student is already enrolled in this course for {term}")]
    DuplicateEnrollment { term: String },

    #[error("students cannot enroll in a past term")]
    PastTermSelfEnrollment,

    #[error("grade {0} is outside 0.0..=4.0")]
    InvalidGrade(f64),

    #[error("a {phase:?} term enrollment cannot carry a grade")]
    GradeBeforeTermEnds { phase: TermPhase },

    #[error("a {phase:?} term enrollment cannot be completed")]
    CompletionBeforeTermEnds { phase: TermPhase },

    #[error("a past term enrollment must be Completed or Dropped, not {status}")]
    PastTermNotClosed { status: EnrollmentStatus },

    #[error("a completed enrollment requires a grade")]
    GradeRequired,

    #[error("a {status} enrollment cannot carry a grade")]
    GradeNotAllowed { status: EnrollmentStatus },

    #[error("cannot move enrollment from {from} to {to}")]
    IllegalTransition {
        from: EnrollmentStatus,
        to: EnrollmentStatus,
    },

    #[error("only approved, ungraded enrollments can be dropped (status {status}, graded {graded})")]
    DropNotAllowed {
        status: EnrollmentStatus,
        graded: bool,
    },
}

/// Who is creating the enrollment. Students enroll themselves into the
/// current or a future term; administrators may also record history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentOrigin {
    SelfService,
    Administrative,
}

impl EnrollmentStatus {
    pub fn can_transition_to(self, next: EnrollmentStatus) -> bool {
        use EnrollmentStatus::*;
        self == next
            || matches!(
                (self, next),
                (Pending, Approved) | (Pending, Rejected) | (Approved, Completed) | (Approved, Dropped)
            )
    }

    /// Statuses that hold a seat in the course.
    pub fn occupies_seat(self) -> bool {
        matches!(self, EnrollmentStatus::Approved | EnrollmentStatus::Completed)
    }
}

pub fn check_transition(
    from: EnrollmentStatus,
    to: EnrollmentStatus,
) -> Result<(), RuleViolation> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(RuleViolation::IllegalTransition { from, to })
    }
}

/// Legality of a (status, grade) pair for a term in the given phase.
pub fn check_term_state(
    phase: TermPhase,
    status: EnrollmentStatus,
    grade: Option<f64>,
) -> Result<(), RuleViolation> {
    if let Some(g) = grade {
        if !is_valid_grade(g) {
            return Err(RuleViolation::InvalidGrade(g));
        }
    }

    match phase {
        TermPhase::Current | TermPhase::Future => {
            if grade.is_some() {
                return Err(RuleViolation::GradeBeforeTermEnds { phase });
            }
            if status == EnrollmentStatus::Completed {
                return Err(RuleViolation::CompletionBeforeTermEnds { phase });
            }
        }
        TermPhase::Past => {
            if !matches!(status, EnrollmentStatus::Completed | EnrollmentStatus::Dropped) {
                return Err(RuleViolation::PastTermNotClosed { status });
            }
        }
    }

    match (status, grade) {
        (EnrollmentStatus::Completed, None) => Err(RuleViolation::GradeRequired),
        (EnrollmentStatus::Completed | EnrollmentStatus::Dropped, _) | (_, None) => Ok(()),
        (status, Some(_)) => Err(RuleViolation::GradeNotAllowed { status }),
    }
}

/// Initial status and grade for a new enrollment.
pub fn plan_new_enrollment(
    origin: EnrollmentOrigin,
    phase: TermPhase,
    requires_approval: bool,
    requested_status: Option<EnrollmentStatus>,
    requested_grade: Option<f64>,
    default_grade: f64,
) -> Result<(EnrollmentStatus, Option<f64>), RuleViolation> {
    let open_status = if requires_approval {
        EnrollmentStatus::Pending
    } else {
        EnrollmentStatus::Approved
    };

    let (status, grade) = match (origin, phase) {
        (EnrollmentOrigin::SelfService, TermPhase::Past) => {
            return Err(RuleViolation::PastTermSelfEnrollment);
        }
        (EnrollmentOrigin::SelfService, _) => (open_status, None),
        (EnrollmentOrigin::Administrative, TermPhase::Past) => {
            match requested_status.unwrap_or(EnrollmentStatus::Completed) {
                EnrollmentStatus::Completed => (
                    EnrollmentStatus::Completed,
                    Some(requested_grade.unwrap_or(default_grade)),
                ),
                status => (status, requested_grade),
            }
        }
        (EnrollmentOrigin::Administrative, _) => {
            (requested_status.unwrap_or(open_status), requested_grade)
        }
    };

    check_term_state(phase, status, grade)?;
    Ok((status, grade))
}

pub fn check_drop(status: EnrollmentStatus, grade: Option<f64>) -> Result<(), RuleViolation> {
    if status == EnrollmentStatus::Approved && grade.is_none() {
        Ok(())
    } else {
        Err(RuleViolation::DropNotAllowed {
            status,
            graded: grade.is_some(),
        })
    }
}
