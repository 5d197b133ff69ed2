use crate::models::EnrollmentStatus;

pub const MIN_GRADE: f64 = 0.0;
pub const MAX_GRADE: f64 = 4.0;

/// Applied when an enrollment is completed without an explicit grade.
pub const DEFAULT_COMPLETION_GRADE: f64 = 3.5;

const LETTER_BANDS: [(f64, &str); 10] = [
    (3.85, "A"),
    (3.5, "A-"),
    (3.15, "B+"),
    (2.85, "B"),
    (2.5, "B-"),
    (2.15, "C+"),
    (1.85, "C"),
    (1.5, "C-"),
    (1.15, "D+"),
    (0.85, "D"),
];

pub fn is_valid_grade(grade: f64) -> bool {
    grade.is_finite() && (MIN_GRADE..=MAX_GRADE).contains(&grade)
}

pub fn letter_grade(grade: f64) -> &'static str {
    LETTER_BANDS
        .iter()
        .find(|(floor, _)| grade >= *floor)
        .map(|(_, letter)| *letter)
        .unwrap_or("F")
}

/// Simple mean over graded enrollments that were not dropped; 0.0 when
/// nothing qualifies. Not credit weighted.
pub fn compute_gpa<I>(rows: I) -> f64
where
    I: IntoIterator<Item = (EnrollmentStatus, Option<f64>)>,
{
    let (sum, count) = rows
        .into_iter()
        .filter(|(status, _)| *status != EnrollmentStatus::Dropped)
        .filter_map(|(_, grade)| grade)
        .fold((0.0_f64, 0_u32), |(sum, count), grade| (sum + grade, count + 1));

    if count == 0 { 0.0 } else { sum / f64::from(count) }
}
