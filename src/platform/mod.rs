pub mod dto;

use std::env;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use serde_json::Value;

use crate::error::AppError;
use crate::models::{Assignment, AssignmentStatus, Course, Priority};

pub const COURSES_TABLE: &str = "course_c";
pub const ASSIGNMENTS_TABLE: &str = "assignment_c";

const COURSE_FIELDS: [&str; 11] = [
    "Id",
    "ModifiedOn",
    "course_id_c",
    "name_c",
    "code_c",
    "credit_hours_c",
    "instructor_c",
    "semester_c",
    "current_grade_c",
    "color_c",
    "is_archived_c",
];

const ASSIGNMENT_FIELDS: [&str; 13] = [
    "Id",
    "ModifiedOn",
    "assignment_id_c",
    "course_id_c",
    "title_c",
    "description_c",
    "due_date_c",
    "priority_c",
    "status_c",
    "grade_c",
    "points_earned_c",
    "points_total_c",
    "is_archived_c",
];

#[derive(Clone, Debug)]
pub struct PlatformConfig {
    pub api_base: String,
    pub api_key: String,
    pub project_id: String,
}

impl PlatformConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let api_base = env::var("PLATFORM_API_BASE")
            .map_err(|_| AppError::BadRequest("PLATFORM_API_BASE is not set".to_string()))?;
        let api_key = env::var("PLATFORM_API_KEY")
            .map_err(|_| AppError::BadRequest("PLATFORM_API_KEY is not set".to_string()))?;
        let project_id = env::var("PLATFORM_PROJECT_ID")
            .map_err(|_| AppError::BadRequest("PLATFORM_PROJECT_ID is not set".to_string()))?;

        Ok(Self {
            api_base,
            api_key,
            project_id,
        })
    }
}

/// Boundary to the hosted records platform. Everything behind it is
/// vendor territory; callers only see already-shaped models.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    async fn fetch_courses(&self) -> Result<Vec<Course>, AppError>;
    async fn fetch_assignments(&self) -> Result<Vec<Assignment>, AppError>;
    async fn push_course(&self, course: &Course) -> Result<(), AppError>;
    async fn push_assignment(&self, assignment: &Assignment) -> Result<(), AppError>;
}

pub struct HttpPlatformClient {
    client: Client,
    config: PlatformConfig,
}

impl HttpPlatformClient {
    pub fn new(config: PlatformConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Platform(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/v1/projects/{}/tables/{}",
            self.config.api_base, self.config.project_id, table
        )
    }

    async fn query_records(
        &self,
        table: &str,
        fields: &[&str],
        filter: Option<Vec<dto::WhereCondition>>,
        page_size: u32,
    ) -> Result<Vec<dto::Record>, AppError> {
        let url = format!("{}/query", self.table_url(table));

        let request_body = dto::QueryRecordsRequest {
            fields: fields.iter().map(|f| dto::FieldSpec::named(f)).collect(),
            r#where: filter,
            order_by: None,
            paging_info: dto::PagingInfo {
                limit: page_size,
                offset: 0,
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AppError::Platform(format!("Query request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Platform(format!(
                "Platform API error {}: {}",
                status, body
            )));
        }

        let parsed: dto::QueryRecordsResponse = response
            .json()
            .await
            .map_err(|e| AppError::Platform(format!("Failed to parse platform response: {}", e)))?;

        if !parsed.success {
            return Err(AppError::Platform(
                parsed
                    .message
                    .unwrap_or_else(|| "Query rejected by platform".to_string()),
            ));
        }

        Ok(parsed.data)
    }

    /// Locate a platform record by the `_c` field mirroring a local id.
    async fn find_record_id_by_field(
        &self,
        table: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<String>, AppError> {
        let filter = vec![dto::WhereCondition {
            field_name: field.to_string(),
            operator: "EqualTo".to_string(),
            values: vec![Value::from(value)],
        }];

        let records = self.query_records(table, &["Id", field], Some(filter), 1).await?;
        Ok(records.first().and_then(|r| r.id()))
    }

    async fn mutate_records(
        &self,
        table: &str,
        records: Vec<Value>,
        update: bool,
    ) -> Result<(), AppError> {
        let url = format!("{}/records", self.table_url(table));
        let request_body = dto::MutateRecordsRequest { records };

        let request = if update {
            self.client.patch(&url)
        } else {
            self.client.post(&url)
        };

        let response = request
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AppError::Platform(format!("Mutation request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Platform(format!(
                "Platform API error {}: {}",
                status, body
            )));
        }

        let parsed: dto::MutateRecordsResponse = response
            .json()
            .await
            .map_err(|e| AppError::Platform(format!("Failed to parse platform response: {}", e)))?;

        if !parsed.success {
            return Err(AppError::Platform(
                parsed
                    .message
                    .unwrap_or_else(|| "Mutation rejected by platform".to_string()),
            ));
        }
        if let Some(failed) = parsed.results.iter().find(|r| !r.success) {
            return Err(AppError::Platform(
                failed
                    .message
                    .clone()
                    .unwrap_or_else(|| "Record mutation failed".to_string()),
            ));
        }

        Ok(())
    }

    fn parse_course_from_record(&self, record: &dto::Record) -> Result<Course, AppError> {
        // Prefer the mirrored local id so pulled rows line up with ours.
        let id = record
            .text("course_id_c")
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .or_else(|| record.id())
            .ok_or_else(|| AppError::Platform("Record has no usable id".to_string()))?;

        let name = record
            .text("name_c")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Platform("Missing field: name_c".to_string()))?
            .to_string();

        Ok(Course {
            id,
            name,
            code: record.text("code_c").unwrap_or_default().to_string(),
            credit_hours: record.number("credit_hours_c").unwrap_or(0.0) as i32,
            instructor: record.text("instructor_c").unwrap_or_default().to_string(),
            semester: record.text("semester_c").unwrap_or_default().to_string(),
            current_grade: record
                .text("current_grade_c")
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            color: record
                .text("color_c")
                .filter(|v| !v.is_empty())
                .unwrap_or("#4f46e5")
                .to_string(),
            is_archived: record.boolean("is_archived_c").unwrap_or(false),
            updated_at: record_modified_at(record),
            sync_state: "synced".to_string(),
            last_synced_at: Some(Utc::now().to_rfc3339()),
        })
    }

    fn parse_assignment_from_record(&self, record: &dto::Record) -> Result<Assignment, AppError> {
        let id = record
            .text("assignment_id_c")
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .or_else(|| record.id())
            .ok_or_else(|| AppError::Platform("Record has no usable id".to_string()))?;

        let title = record
            .text("title_c")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Platform("Missing field: title_c".to_string()))?
            .to_string();

        let due_date = record
            .text("due_date_c")
            .and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
            .unwrap_or_else(|| Utc::now().date_naive());

        let priority = match record.text("priority_c") {
            Some("low") => Priority::Low,
            Some("high") => Priority::High,
            _ => Priority::Medium,
        };

        let status = match record.text("status_c") {
            Some("completed") => AssignmentStatus::Completed,
            _ => AssignmentStatus::Pending,
        };

        Ok(Assignment {
            id,
            course_id: record.text("course_id_c").unwrap_or_default().to_string(),
            title,
            description: record.text("description_c").unwrap_or_default().to_string(),
            due_date,
            priority,
            status,
            grade: record
                .text("grade_c")
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            points_earned: record.number("points_earned_c"),
            points_total: record.number("points_total_c"),
            is_archived: record.boolean("is_archived_c").unwrap_or(false),
            updated_at: record_modified_at(record),
            sync_state: "synced".to_string(),
            last_synced_at: Some(Utc::now().to_rfc3339()),
        })
    }
}

/// The platform's own modification stamp drives conflict detection on
/// pull; fall back to now for records that never carried one.
fn record_modified_at(record: &dto::Record) -> String {
    record
        .text("ModifiedOn")
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Utc::now().to_rfc3339())
}

fn platform_id_value(id: String) -> Value {
    // Platform ids are numeric; keep the string form if they ever are not.
    id.parse::<i64>().map(Value::from).unwrap_or(Value::from(id))
}

#[async_trait]
impl PlatformClient for HttpPlatformClient {
    async fn fetch_courses(&self) -> Result<Vec<Course>, AppError> {
        let records = self
            .query_records(COURSES_TABLE, &COURSE_FIELDS, None, 100)
            .await?;

        let mut courses = Vec::new();
        for record in records {
            match self.parse_course_from_record(&record) {
                Ok(course) => courses.push(course),
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse course record {:?}: {}",
                        record.id(),
                        e
                    );
                }
            }
        }
        Ok(courses)
    }

    async fn fetch_assignments(&self) -> Result<Vec<Assignment>, AppError> {
        let records = self
            .query_records(ASSIGNMENTS_TABLE, &ASSIGNMENT_FIELDS, None, 100)
            .await?;

        let mut assignments = Vec::new();
        for record in records {
            match self.parse_assignment_from_record(&record) {
                Ok(assignment) => assignments.push(assignment),
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse assignment record {:?}: {}",
                        record.id(),
                        e
                    );
                }
            }
        }
        Ok(assignments)
    }

    async fn push_course(&self, course: &Course) -> Result<(), AppError> {
        // Locate the platform record via the course_id_c mirror first.
        let existing_id = self
            .find_record_id_by_field(COURSES_TABLE, "course_id_c", &course.id)
            .await?;

        let mut record = serde_json::json!({
            "name_c": course.name,
            "code_c": course.code,
            "credit_hours_c": course.credit_hours,
            "instructor_c": course.instructor,
            "semester_c": course.semester,
            "current_grade_c": course.current_grade.clone().unwrap_or_default(),
            "color_c": course.color,
            "is_archived_c": course.is_archived,
            "course_id_c": course.id,
        });

        match existing_id {
            Some(id) => {
                record["Id"] = platform_id_value(id);
                self.mutate_records(COURSES_TABLE, vec![record], true).await
            }
            None => self.mutate_records(COURSES_TABLE, vec![record], false).await,
        }
    }

    async fn push_assignment(&self, assignment: &Assignment) -> Result<(), AppError> {
        let existing_id = self
            .find_record_id_by_field(ASSIGNMENTS_TABLE, "assignment_id_c", &assignment.id)
            .await?;

        let mut record = serde_json::json!({
            "title_c": assignment.title,
            "description_c": assignment.description,
            "due_date_c": assignment.due_date.format("%Y-%m-%d").to_string(),
            "priority_c": assignment.priority,
            "status_c": assignment.status,
            "grade_c": assignment.grade.clone().unwrap_or_default(),
            "points_earned_c": assignment.points_earned,
            "points_total_c": assignment.points_total,
            "is_archived_c": assignment.is_archived,
            "course_id_c": assignment.course_id,
            "assignment_id_c": assignment.id,
        });

        match existing_id {
            Some(id) => {
                record["Id"] = platform_id_value(id);
                self.mutate_records(ASSIGNMENTS_TABLE, vec![record], true).await
            }
            None => {
                self.mutate_records(ASSIGNMENTS_TABLE, vec![record], false)
                    .await
            }
        }
    }
}

pub struct NoopPlatformClient;

#[async_trait]
impl PlatformClient for NoopPlatformClient {
    async fn fetch_courses(&self) -> Result<Vec<Course>, AppError> {
        Ok(Vec::new())
    }

    async fn fetch_assignments(&self) -> Result<Vec<Assignment>, AppError> {
        Ok(Vec::new())
    }

    async fn push_course(&self, _course: &Course) -> Result<(), AppError> {
        Ok(())
    }

    async fn push_assignment(&self, _assignment: &Assignment) -> Result<(), AppError> {
        Ok(())
    }
}
