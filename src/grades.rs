//! Letter-grade to grade-point conversion.

/// The grading scale, in display order (descending points, A+ ahead of A).
/// Every piece of GPA math in the crate goes through this table.
pub const GRADE_SCALE: [(&str, f64); 13] = [
    ("A+", 4.0),
    ("A", 4.0),
    ("A-", 3.7),
    ("B+", 3.3),
    ("B", 3.0),
    ("B-", 2.7),
    ("C+", 2.3),
    ("C", 2.0),
    ("C-", 1.7),
    ("D+", 1.3),
    ("D", 1.0),
    ("D-", 0.7),
    ("F", 0.0),
];

/// Grade points for a letter grade. Total over all inputs: anything
/// outside the scale (including the empty string) is worth 0.0.
pub fn points_for(grade: &str) -> f64 {
    GRADE_SCALE
        .iter()
        .find(|(g, _)| *g == grade)
        .map(|(_, points)| *points)
        .unwrap_or(0.0)
}

/// Position of a grade in the display scale; off-scale grades sort last.
pub(crate) fn scale_index(grade: &str) -> usize {
    GRADE_SCALE
        .iter()
        .position(|(g, _)| *g == grade)
        .unwrap_or(GRADE_SCALE.len())
}
