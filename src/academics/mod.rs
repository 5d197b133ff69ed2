pub mod grading;
pub mod lifecycle;
pub mod term;

pub use grading::{DEFAULT_COMPLETION_GRADE, compute_gpa, letter_grade};
pub use lifecycle::{EnrollmentOrigin, RuleViolation};
pub use term::{Season, Term, TermCalendar, TermParseError, TermPhase};
