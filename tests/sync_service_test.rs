use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use studysync_backend::db::repository;
use studysync_backend::error::AppError;
use studysync_backend::models::{Assignment, Course, NewCourseRequest};
use studysync_backend::platform::PlatformClient;
use studysync_backend::services::SyncService;

/// In-process platform double: serves a scripted remote state and
/// records every push. Pushed records become visible to later fetches
/// the way they would on the real platform, shaped as a pull returns
/// them (synced, stamped).
#[derive(Default)]
struct ScriptedPlatformClient {
    remote_courses: Mutex<Vec<Course>>,
    remote_assignments: Mutex<Vec<Assignment>>,
    pushed_courses: Mutex<Vec<Course>>,
    pushed_assignments: Mutex<Vec<Assignment>>,
}

#[async_trait]
impl PlatformClient for ScriptedPlatformClient {
    async fn fetch_courses(&self) -> Result<Vec<Course>, AppError> {
        Ok(self.remote_courses.lock().unwrap().clone())
    }

    async fn fetch_assignments(&self) -> Result<Vec<Assignment>, AppError> {
        Ok(self.remote_assignments.lock().unwrap().clone())
    }

    async fn push_course(&self, course: &Course) -> Result<(), AppError> {
        self.pushed_courses.lock().unwrap().push(course.clone());

        let mut upserted = course.clone();
        upserted.sync_state = "synced".to_string();
        upserted.last_synced_at = Some(Utc::now().to_rfc3339());
        let mut remote = self.remote_courses.lock().unwrap();
        remote.retain(|c| c.id != course.id);
        remote.push(upserted);
        Ok(())
    }

    async fn push_assignment(&self, assignment: &Assignment) -> Result<(), AppError> {
        self.pushed_assignments
            .lock()
            .unwrap()
            .push(assignment.clone());

        let mut upserted = assignment.clone();
        upserted.sync_state = "synced".to_string();
        upserted.last_synced_at = Some(Utc::now().to_rfc3339());
        let mut remote = self.remote_assignments.lock().unwrap();
        remote.retain(|a| a.id != assignment.id);
        remote.push(upserted);
        Ok(())
    }
}

async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create test db");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

fn remote_course(id: &str, name: &str, updated_at: chrono::DateTime<Utc>) -> Course {
    Course {
        id: id.to_string(),
        name: name.to_string(),
        code: "CS 101".to_string(),
        credit_hours: 3,
        instructor: String::new(),
        semester: "Fall 2024".to_string(),
        current_grade: None,
        color: "#4f46e5".to_string(),
        is_archived: false,
        updated_at: updated_at.to_rfc3339(),
        sync_state: "synced".to_string(),
        last_synced_at: Some(updated_at.to_rfc3339()),
    }
}

#[tokio::test]
async fn pending_local_rows_are_pushed_and_marked_synced() {
    let pool = setup_test_db().await;
    let platform = Arc::new(ScriptedPlatformClient::default());

    let course = repository::insert_course(
        &pool,
        NewCourseRequest {
            name: "Operating Systems".to_string(),
            code: "CS 350".to_string(),
            credit_hours: 3,
            instructor: String::new(),
            semester: "Fall 2024".to_string(),
            current_grade: None,
            color: "#4f46e5".to_string(),
        },
    )
    .await
    .expect("Failed to insert course");
    assert_eq!(course.sync_state, "pending");

    let service = SyncService::new(pool.clone(), platform.clone());
    let stats = service.sync_all().await.expect("sync failed");

    assert_eq!(stats.courses_pushed, 1);
    assert_eq!(stats.assignments_pushed, 0);
    assert_eq!(platform.pushed_courses.lock().unwrap().len(), 1);

    let synced = repository::find_course_by_id(&pool, &course.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(synced.sync_state, "synced");
    assert!(synced.last_synced_at.is_some());
}

#[tokio::test]
async fn remote_courses_are_pulled_into_the_local_store() {
    let pool = setup_test_db().await;
    let platform = Arc::new(ScriptedPlatformClient::default());
    platform
        .remote_courses
        .lock()
        .unwrap()
        .push(remote_course("remote-1", "Networks", Utc::now()));

    let service = SyncService::new(pool.clone(), platform.clone());
    let stats = service.sync_all().await.expect("sync failed");

    assert_eq!(stats.courses_pulled, 1);
    let pulled = repository::find_course_by_id(&pool, "remote-1")
        .await
        .unwrap()
        .expect("remote course not pulled");
    assert_eq!(pulled.name, "Networks");
    assert_eq!(pulled.sync_state, "synced");
}

#[tokio::test]
async fn newer_local_rows_are_not_overwritten() {
    let pool = setup_test_db().await;
    let platform = Arc::new(ScriptedPlatformClient::default());

    let now = Utc::now();
    let local = remote_course("shared", "Local Title", now);
    repository::upsert_course(&pool, &local)
        .await
        .expect("Failed to seed local course");

    // Remote copy is an hour stale.
    platform
        .remote_courses
        .lock()
        .unwrap()
        .push(remote_course("shared", "Stale Remote Title", now - Duration::hours(1)));

    let service = SyncService::new(pool.clone(), platform.clone());
    let stats = service.sync_all().await.expect("sync failed");

    assert_eq!(stats.courses_skipped, 1);
    assert_eq!(stats.courses_pulled, 0);
    let kept = repository::find_course_by_id(&pool, "shared")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.name, "Local Title");
}

#[tokio::test]
async fn synced_rows_missing_remotely_are_archived() {
    let pool = setup_test_db().await;
    let platform = Arc::new(ScriptedPlatformClient::default());

    let local = remote_course("gone", "Dropped Remotely", Utc::now());
    repository::upsert_course(&pool, &local)
        .await
        .expect("Failed to seed local course");

    let service = SyncService::new(pool.clone(), platform.clone());
    service.sync_all().await.expect("sync failed");

    let archived = repository::find_course_by_id(&pool, "gone")
        .await
        .unwrap()
        .unwrap();
    assert!(archived.is_archived);
    assert!(repository::fetch_courses(&pool).await.unwrap().is_empty());
}
