use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub code: String,
    pub credit_hours: i32,
    pub instructor: String,
    pub semester: String,
    /// None (or empty on input) means the course is not graded yet.
    pub current_grade: Option<String>,
    pub color: String,
    pub is_archived: bool,
    pub updated_at: String,
    pub sync_state: String,
    pub last_synced_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseRequest {
    pub name: String,
    pub code: String,
    pub credit_hours: i32,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub current_grade: Option<String>,
    #[serde(default = "default_course_color")]
    pub color: String,
}

fn default_course_color() -> String {
    "#4f46e5".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCourseRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub credit_hours: Option<i32>,
    pub instructor: Option<String>,
    pub semester: Option<String>,
    /// Some("") clears the grade back to ungraded.
    pub current_grade: Option<String>,
    pub color: Option<String>,
}
