use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// The two assignment states. The only transition is a bidirectional
/// toggle; a completed assignment can always be reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AssignmentStatus {
    #[default]
    Pending,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assignment {
    pub id: String,
    /// References a course by id. Integrity is not enforced here;
    /// dangling references surface as "Unknown Course" downstream.
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub status: AssignmentStatus,
    pub grade: Option<String>,
    pub points_earned: Option<f64>,
    pub points_total: Option<f64>,
    pub is_archived: bool,
    pub updated_at: String,
    pub sync_state: String,
    pub last_synced_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssignmentRequest {
    pub course_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: AssignmentStatus,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub points_earned: Option<f64>,
    #[serde(default)]
    pub points_total: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAssignmentRequest {
    pub course_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub status: Option<AssignmentStatus>,
    pub grade: Option<String>,
    pub points_earned: Option<f64>,
    pub points_total: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetAssignmentStatusRequest {
    pub status: AssignmentStatus,
}
