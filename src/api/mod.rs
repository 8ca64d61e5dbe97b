use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::{patch, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::db::repository;
use crate::error::AppError;
use crate::gpa::{self, GpaResult, GradeCount, SemesterGpa, StandingInfo, YearGpa};
use crate::grades::GRADE_SCALE;
use crate::metrics;
use crate::models::*;
use crate::services::{SyncService, SyncStats};
use crate::state::AppState;

#[derive(Deserialize)]
struct AssignmentQueryParams {
    course_id: Option<String>,
    status: Option<AssignmentStatus>,
    #[serde(default)]
    include_archived: bool,
}

#[derive(Deserialize)]
struct StudentQueryParams {
    q: Option<String>,
}

#[derive(Serialize)]
struct UpcomingAssignment {
    #[serde(flatten)]
    assignment: Assignment,
    course_name: String,
}

#[derive(Serialize)]
struct DashboardResponse {
    gpa: GpaResult,
    standing: StandingInfo,
    course_count: usize,
    total_credits: i64,
    pending_count: usize,
    completed_count: usize,
    overdue_count: usize,
    completion_rate: u32,
    credit_progress: f64,
    upcoming: Vec<UpcomingAssignment>,
}

#[derive(Serialize)]
struct ScaleEntry {
    grade: &'static str,
    points: f64,
}

#[derive(Serialize)]
struct GpaReportResponse {
    gpa: GpaResult,
    standing: StandingInfo,
    by_semester: Vec<SemesterGpa>,
    by_year: Vec<YearGpa>,
    grade_distribution: Vec<GradeCount>,
    course_count: usize,
    graded_course_count: usize,
    total_credits: i64,
    completed_credits: i64,
    credit_progress: f64,
    scale: Vec<ScaleEntry>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(get_course).patch(update_course).delete(delete_course),
        )
        .route("/assignments", get(list_assignments).post(create_assignment))
        .route(
            "/assignments/{id}",
            get(get_assignment)
                .patch(update_assignment)
                .delete(delete_assignment),
        )
        .route("/assignments/{id}/status", patch(set_assignment_status))
        .route("/assignments/{id}/unarchive", patch(unarchive_assignment))
        .route("/students", get(list_students).post(create_student))
        .route(
            "/students/{id}",
            get(get_student).patch(update_student).delete(delete_student),
        )
        .route("/teachers", get(list_teachers).post(create_teacher))
        .route(
            "/teachers/{id}",
            get(get_teacher).patch(update_teacher).delete(delete_teacher),
        )
        .route("/departments", get(list_departments).post(create_department))
        .route(
            "/departments/{id}",
            get(get_department)
                .patch(update_department)
                .delete(delete_department),
        )
        .route("/dashboard", get(dashboard))
        .route("/gpa", get(gpa_report))
        .route("/sync", post(sync_now))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

fn validate_credit_hours(credit_hours: i32) -> Result<(), AppError> {
    if credit_hours <= 0 {
        return Err(AppError::BadRequest(
            "credit_hours must be positive".to_string(),
        ));
    }
    Ok(())
}

fn validate_points(earned: Option<f64>, total: Option<f64>) -> Result<(), AppError> {
    if let (Some(earned), Some(total)) = (earned, total) {
        if earned > total {
            return Err(AppError::BadRequest(
                "points_earned must not exceed points_total".to_string(),
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Courses

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    let courses = repository::fetch_courses(&state.db).await?;
    Ok(Json(courses))
}

async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<NewCourseRequest>,
) -> Result<Json<Course>, AppError> {
    validate_credit_hours(req.credit_hours)?;
    let course = repository::insert_course(&state.db, req).await?;
    Ok(Json(course))
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Course>, AppError> {
    let course = repository::find_course_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(course))
}

async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    if let Some(credit_hours) = req.credit_hours {
        validate_credit_hours(credit_hours)?;
    }
    let course = repository::update_course(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(course))
}

async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let ok = repository::archive_course(&state.db, &id).await?;
    if ok {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// ---------------------------------------------------------------------------
// Assignments

async fn list_assignments(
    State(state): State<AppState>,
    Query(params): Query<AssignmentQueryParams>,
) -> Result<Json<Vec<Assignment>>, AppError> {
    let mut assignments = if params.include_archived {
        repository::fetch_all_assignments(&state.db).await?
    } else {
        repository::fetch_assignments(&state.db).await?
    };

    if let Some(course_id) = params.course_id {
        assignments.retain(|a| a.course_id == course_id);
    }
    if let Some(status) = params.status {
        assignments.retain(|a| a.status == status);
    }

    Ok(Json(assignments))
}

async fn create_assignment(
    State(state): State<AppState>,
    Json(req): Json<NewAssignmentRequest>,
) -> Result<Json<Assignment>, AppError> {
    validate_points(req.points_earned, req.points_total)?;
    let assignment = repository::insert_assignment(&state.db, req).await?;
    Ok(Json(assignment))
}

async fn get_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Assignment>, AppError> {
    let assignment = repository::find_assignment_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(assignment))
}

async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAssignmentRequest>,
) -> Result<Json<Assignment>, AppError> {
    // The invariant holds over the merged record, not just the patch.
    let current = repository::find_assignment_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    validate_points(
        req.points_earned.or(current.points_earned),
        req.points_total.or(current.points_total),
    )?;

    let assignment = repository::update_assignment(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(assignment))
}

async fn set_assignment_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetAssignmentStatusRequest>,
) -> Result<Json<Assignment>, AppError> {
    let assignment = repository::set_assignment_status(&state.db, &id, req.status)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(assignment))
}

async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let ok = repository::archive_assignment(&state.db, &id).await?;
    if ok {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn unarchive_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let ok = repository::unarchive_assignment(&state.db, &id).await?;
    if ok {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// ---------------------------------------------------------------------------
// Students

async fn list_students(
    State(state): State<AppState>,
    Query(params): Query<StudentQueryParams>,
) -> Result<Json<Vec<Student>>, AppError> {
    let mut students = repository::fetch_students(&state.db).await?;

    if let Some(q) = params.q.filter(|q| !q.is_empty()) {
        let needle = q.to_lowercase();
        students.retain(|s| {
            s.name.to_lowercase().contains(&needle)
                || s.email.to_lowercase().contains(&needle)
                || s.major.to_lowercase().contains(&needle)
        });
    }

    Ok(Json(students))
}

async fn create_student(
    State(state): State<AppState>,
    Json(req): Json<NewStudentRequest>,
) -> Result<Json<Student>, AppError> {
    let student = repository::insert_student(&state.db, req).await?;
    Ok(Json(student))
}

async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Student>, AppError> {
    let student = repository::find_student_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(student))
}

async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStudentRequest>,
) -> Result<Json<Student>, AppError> {
    let student = repository::update_student(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(student))
}

async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let ok = repository::delete_student(&state.db, &id).await?;
    if ok {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// ---------------------------------------------------------------------------
// Teachers

async fn list_teachers(State(state): State<AppState>) -> Result<Json<Vec<Teacher>>, AppError> {
    let teachers = repository::fetch_teachers(&state.db).await?;
    Ok(Json(teachers))
}

async fn create_teacher(
    State(state): State<AppState>,
    Json(req): Json<NewTeacherRequest>,
) -> Result<Json<Teacher>, AppError> {
    let teacher = repository::insert_teacher(&state.db, req).await?;
    Ok(Json(teacher))
}

async fn get_teacher(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Teacher>, AppError> {
    let teacher = repository::find_teacher_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(teacher))
}

async fn update_teacher(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTeacherRequest>,
) -> Result<Json<Teacher>, AppError> {
    let teacher = repository::update_teacher(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(teacher))
}

async fn delete_teacher(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let ok = repository::delete_teacher(&state.db, &id).await?;
    if ok {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// ---------------------------------------------------------------------------
// Departments

async fn list_departments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Department>>, AppError> {
    let departments = repository::fetch_departments(&state.db).await?;
    Ok(Json(departments))
}

async fn create_department(
    State(state): State<AppState>,
    Json(req): Json<NewDepartmentRequest>,
) -> Result<Json<Department>, AppError> {
    let department = repository::insert_department(&state.db, req).await?;
    Ok(Json(department))
}

async fn get_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Department>, AppError> {
    let department = repository::find_department_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(department))
}

async fn update_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateDepartmentRequest>,
) -> Result<Json<Department>, AppError> {
    let department = repository::update_department(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(department))
}

async fn delete_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let ok = repository::delete_department(&state.db, &id).await?;
    if ok {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// ---------------------------------------------------------------------------
// Aggregates

async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>, AppError> {
    // The two fetches have no ordering dependency; aggregation runs over
    // the completed snapshots only.
    let (courses, assignments) = tokio::try_join!(
        repository::fetch_courses(&state.db),
        repository::fetch_assignments(&state.db),
    )?;

    let today = Local::now().date_naive();
    let gpa = gpa::compute_gpa(&courses);
    let total_credits: i64 = courses.iter().map(|c| i64::from(c.credit_hours)).sum();
    let pending_count = assignments
        .iter()
        .filter(|a| a.status == AssignmentStatus::Pending)
        .count();
    let completed_count = assignments
        .iter()
        .filter(|a| a.status == AssignmentStatus::Completed)
        .count();

    let upcoming = metrics::upcoming(
        &assignments,
        today,
        metrics::UPCOMING_WINDOW_DAYS,
        metrics::UPCOMING_LIMIT,
    )
    .into_iter()
    .map(|assignment| UpcomingAssignment {
        course_name: courses
            .iter()
            .find(|c| c.id == assignment.course_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "Unknown Course".to_string()),
        assignment: assignment.clone(),
    })
    .collect();

    Ok(Json(DashboardResponse {
        standing: gpa::classify_gpa(gpa.value),
        gpa,
        course_count: courses.len(),
        total_credits,
        pending_count,
        completed_count,
        overdue_count: metrics::overdue_count(&assignments, today),
        completion_rate: metrics::completion_rate(&assignments),
        credit_progress: metrics::credit_progress(total_credits, metrics::CREDIT_GOAL),
        upcoming,
    }))
}

async fn gpa_report(State(state): State<AppState>) -> Result<Json<GpaReportResponse>, AppError> {
    let courses = repository::fetch_courses(&state.db).await?;

    let gpa = gpa::compute_gpa(&courses);
    let total_credits: i64 = courses.iter().map(|c| i64::from(c.credit_hours)).sum();

    Ok(Json(GpaReportResponse {
        standing: gpa::classify_gpa(gpa.value),
        by_semester: gpa::gpa_by_semester(&courses),
        by_year: gpa::gpa_by_year(&courses),
        grade_distribution: gpa::grade_distribution(&courses),
        course_count: courses.len(),
        graded_course_count: gpa.courses_counted,
        total_credits,
        completed_credits: gpa.credits_counted,
        credit_progress: metrics::credit_progress(gpa.credits_counted, metrics::CREDIT_GOAL),
        scale: GRADE_SCALE
            .iter()
            .map(|(grade, points)| ScaleEntry {
                grade,
                points: *points,
            })
            .collect(),
        gpa,
    }))
}

async fn sync_now(State(state): State<AppState>) -> Result<Json<SyncStats>, AppError> {
    let service = SyncService::new(state.db.clone(), state.platform.clone());
    let stats = service.sync_all().await?;
    Ok(Json(stats))
}
