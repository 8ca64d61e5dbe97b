use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub major: String,
    /// Class-year label, e.g. "Freshman" or "Junior".
    pub year: String,
    pub gpa: f64,
    pub phone: String,
    pub enrollment_date: NaiveDate,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudentRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub gpa: f64,
    #[serde(default)]
    pub phone: String,
    /// Defaults to today when omitted.
    #[serde(default)]
    pub enrollment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub major: Option<String>,
    pub year: Option<String>,
    pub gpa: Option<f64>,
    pub phone: Option<String>,
    pub enrollment_date: Option<NaiveDate>,
}
