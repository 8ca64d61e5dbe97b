//! Credit-weighted GPA aggregation over course snapshots.
//!
//! Everything in this module is a pure function over the course list the
//! caller fetched: no I/O, no caching, no failure modes. Empty input,
//! zero credits, and unknown grades all resolve to defined defaults so
//! display layers never need error handling around these numbers.

use serde::Serialize;

use crate::grades::{points_for, scale_index};
use crate::models::Course;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GpaResult {
    pub value: f64,
    pub credits_counted: i64,
    pub courses_counted: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SemesterGpa {
    pub semester: String,
    pub gpa: GpaResult,
    /// Credit hours of the whole group, graded or not.
    pub credit_hours: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearGpa {
    pub year: String,
    pub gpa: GpaResult,
    pub credit_hours: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeCount {
    pub grade: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    SummaCumLaude,
    MagnaCumLaude,
    GoodStanding,
    Satisfactory,
    NeedsImprovement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StandingInfo {
    pub tier: Standing,
    pub label: &'static str,
}

impl Standing {
    /// Band lower bounds are inclusive: exactly 3.8 is Summa, exactly
    /// 3.5 is Magna.
    pub fn from_gpa(value: f64) -> Self {
        if value >= 3.8 {
            Self::SummaCumLaude
        } else if value >= 3.5 {
            Self::MagnaCumLaude
        } else if value >= 3.0 {
            Self::GoodStanding
        } else if value >= 2.0 {
            Self::Satisfactory
        } else {
            Self::NeedsImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SummaCumLaude => "Summa Cum Laude",
            Self::MagnaCumLaude => "Magna Cum Laude",
            Self::GoodStanding => "Good Standing",
            Self::Satisfactory => "Satisfactory",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }
}

pub fn classify_gpa(value: f64) -> StandingInfo {
    let tier = Standing::from_gpa(value);
    StandingInfo {
        tier,
        label: tier.label(),
    }
}

fn is_graded(course: &Course) -> bool {
    course
        .current_grade
        .as_deref()
        .is_some_and(|grade| !grade.is_empty())
}

fn weighted_gpa<'a, I>(courses: I) -> GpaResult
where
    I: IntoIterator<Item = &'a Course>,
{
    let mut total_points = 0.0;
    let mut total_credits: i64 = 0;
    let mut counted = 0usize;

    for course in courses.into_iter().filter(|c| is_graded(c)) {
        let grade = course.current_grade.as_deref().unwrap_or("");
        total_points += points_for(grade) * f64::from(course.credit_hours);
        total_credits += i64::from(course.credit_hours);
        counted += 1;
    }

    // Graded courses with no credit hours still must not divide by zero.
    let value = if total_credits > 0 {
        total_points / total_credits as f64
    } else {
        0.0
    };

    GpaResult {
        value,
        credits_counted: total_credits.max(0),
        courses_counted: counted,
    }
}

/// Weighted GPA over the graded subset of `courses`. "No graded courses"
/// is a valid zero result, not an error.
pub fn compute_gpa(courses: &[Course]) -> GpaResult {
    weighted_gpa(courses)
}

/// Group courses preserving first-seen key order.
fn group_by<F>(courses: &[Course], key: F) -> Vec<(String, Vec<&Course>)>
where
    F: Fn(&Course) -> String,
{
    let mut groups: Vec<(String, Vec<&Course>)> = Vec::new();
    for course in courses {
        let label = key(course);
        match groups.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, members)) => members.push(course),
            None => groups.push((label, vec![course])),
        }
    }
    groups
}

fn semester_label(course: &Course) -> String {
    if course.semester.is_empty() {
        "Unknown".to_string()
    } else {
        course.semester.clone()
    }
}

fn year_label(course: &Course) -> String {
    course
        .semester
        .split_whitespace()
        .nth(1)
        .unwrap_or("Unknown")
        .to_string()
}

/// Per-semester rollup. Grouping is a case-sensitive exact match on the
/// raw semester label; all courses count toward the group's credit
/// hours, graded ones toward its GPA.
pub fn gpa_by_semester(courses: &[Course]) -> Vec<SemesterGpa> {
    group_by(courses, semester_label)
        .into_iter()
        .map(|(semester, members)| SemesterGpa {
            gpa: weighted_gpa(members.iter().copied()),
            credit_hours: members.iter().map(|c| i64::from(c.credit_hours)).sum(),
            semester,
        })
        .collect()
}

/// Per-academic-year rollup, keyed by the second whitespace-delimited
/// token of the semester label ("Fall 2024" -> "2024"). Labels without a
/// second token group under "Unknown".
pub fn gpa_by_year(courses: &[Course]) -> Vec<YearGpa> {
    group_by(courses, year_label)
        .into_iter()
        .map(|(year, members)| YearGpa {
            gpa: weighted_gpa(members.iter().copied()),
            credit_hours: members.iter().map(|c| i64::from(c.credit_hours)).sum(),
            year,
        })
        .collect()
}

/// Counts of each non-empty grade across the input, sorted for display:
/// descending grade points, equal-point grades in scale order (A+ ahead
/// of A), off-scale grades after their point peers and alphabetical
/// among themselves.
pub fn grade_distribution(courses: &[Course]) -> Vec<GradeCount> {
    let mut counts: Vec<GradeCount> = Vec::new();
    for course in courses {
        let Some(grade) = course.current_grade.as_deref().filter(|g| !g.is_empty()) else {
            continue;
        };
        match counts.iter_mut().find(|entry| entry.grade == grade) {
            Some(entry) => entry.count += 1,
            None => counts.push(GradeCount {
                grade: grade.to_string(),
                count: 1,
            }),
        }
    }

    counts.sort_by(|a, b| {
        points_for(&b.grade)
            .total_cmp(&points_for(&a.grade))
            .then_with(|| scale_index(&a.grade).cmp(&scale_index(&b.grade)))
            .then_with(|| a.grade.cmp(&b.grade))
    });
    counts
}
