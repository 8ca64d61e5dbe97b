//! Derived progress ratios over assignment and credit snapshots.
//!
//! Pure and total, like the GPA aggregator: callers fetch, these
//! functions only count and compare.

use chrono::{Duration, NaiveDate};

use crate::models::{Assignment, AssignmentStatus};

/// Degree credit target used for progress display.
pub const CREDIT_GOAL: i64 = 120;

pub const UPCOMING_WINDOW_DAYS: i64 = 7;
pub const UPCOMING_LIMIT: usize = 5;

/// Percentage of assignments marked completed, rounded to the nearest
/// integer. Empty input is 0, not NaN.
pub fn completion_rate(assignments: &[Assignment]) -> u32 {
    let completed = assignments
        .iter()
        .filter(|a| a.status == AssignmentStatus::Completed)
        .count();
    let pending = assignments
        .iter()
        .filter(|a| a.status == AssignmentStatus::Pending)
        .count();
    let total = completed + pending;
    if total == 0 {
        return 0;
    }
    (completed as f64 / total as f64 * 100.0).round() as u32
}

/// Percentage of `total_credits` toward `goal`, capped at 100.
pub fn credit_progress(total_credits: i64, goal: i64) -> f64 {
    if goal <= 0 {
        return 0.0;
    }
    (total_credits as f64 / goal as f64 * 100.0).min(100.0)
}

/// Pending assignments due strictly before `today`. Date-only: an
/// assignment due today is never overdue, whatever the wall clock says.
pub fn overdue_count(assignments: &[Assignment], today: NaiveDate) -> usize {
    assignments
        .iter()
        .filter(|a| a.status == AssignmentStatus::Pending && a.due_date < today)
        .count()
}

/// Pending assignments due in `[today, today + window_days]` inclusive,
/// ascending by due date, truncated to `limit`.
pub fn upcoming<'a>(
    assignments: &'a [Assignment],
    today: NaiveDate,
    window_days: i64,
    limit: usize,
) -> Vec<&'a Assignment> {
    let horizon = today + Duration::days(window_days);
    let mut due_soon: Vec<&Assignment> = assignments
        .iter()
        .filter(|a| {
            a.status == AssignmentStatus::Pending
                && a.due_date >= today
                && a.due_date <= horizon
        })
        .collect();
    due_soon.sort_by_key(|a| a.due_date);
    due_soon.truncate(limit);
    due_soon
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    fn assignment(due: NaiveDate, status: AssignmentStatus) -> Assignment {
        Assignment {
            id: "a".to_string(),
            course_id: "c".to_string(),
            title: "Problem set".to_string(),
            description: String::new(),
            due_date: due,
            priority: Priority::Medium,
            status,
            grade: None,
            points_earned: None,
            points_total: None,
            is_archived: false,
            updated_at: String::new(),
            sync_state: "synced".to_string(),
            last_synced_at: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn completion_rate_of_empty_input_is_zero() {
        assert_eq!(completion_rate(&[]), 0);
    }

    #[test]
    fn completion_rate_rounds_to_nearest_integer() {
        let today = date(2024, 6, 15);
        let assignments = vec![
            assignment(today, AssignmentStatus::Completed),
            assignment(today, AssignmentStatus::Pending),
            assignment(today, AssignmentStatus::Pending),
        ];
        // 1/3 -> 33
        assert_eq!(completion_rate(&assignments), 33);

        let assignments = vec![
            assignment(today, AssignmentStatus::Completed),
            assignment(today, AssignmentStatus::Completed),
            assignment(today, AssignmentStatus::Pending),
        ];
        // 2/3 -> 67
        assert_eq!(completion_rate(&assignments), 67);
    }

    #[test]
    fn credit_progress_caps_at_one_hundred() {
        assert_eq!(credit_progress(60, CREDIT_GOAL), 50.0);
        assert_eq!(credit_progress(150, CREDIT_GOAL), 100.0);
        assert_eq!(credit_progress(0, CREDIT_GOAL), 0.0);
    }

    #[test]
    fn due_today_is_not_overdue() {
        // The caller's clock may read 23:00; date-only comparison keeps a
        // same-day assignment out of the overdue count.
        let today = date(2024, 6, 15);
        let assignments = vec![
            assignment(date(2024, 6, 15), AssignmentStatus::Pending),
            assignment(date(2024, 6, 14), AssignmentStatus::Pending),
            assignment(date(2024, 6, 1), AssignmentStatus::Completed),
        ];
        assert_eq!(overdue_count(&assignments, today), 1);
    }

    #[test]
    fn upcoming_window_is_inclusive_sorted_and_capped() {
        let today = date(2024, 6, 15);
        let assignments = vec![
            assignment(date(2024, 6, 22), AssignmentStatus::Pending),
            assignment(date(2024, 6, 15), AssignmentStatus::Pending),
            assignment(date(2024, 6, 23), AssignmentStatus::Pending),
            assignment(date(2024, 6, 18), AssignmentStatus::Completed),
            assignment(date(2024, 6, 14), AssignmentStatus::Pending),
            assignment(date(2024, 6, 17), AssignmentStatus::Pending),
        ];
        let due_soon = upcoming(&assignments, today, UPCOMING_WINDOW_DAYS, UPCOMING_LIMIT);
        let dates: Vec<NaiveDate> = due_soon.iter().map(|a| a.due_date).collect();
        // Both window edges in, completed and past/beyond-window out.
        assert_eq!(
            dates,
            vec![date(2024, 6, 15), date(2024, 6, 17), date(2024, 6, 22)]
        );
    }

    #[test]
    fn upcoming_respects_the_limit() {
        let today = date(2024, 6, 15);
        let assignments: Vec<Assignment> = (0..8)
            .map(|i| assignment(today + Duration::days(i % 7), AssignmentStatus::Pending))
            .collect();
        assert_eq!(upcoming(&assignments, today, 7, 5).len(), 5);
        assert_eq!(upcoming(&assignments, today, 7, 3).len(), 3);
    }
}
