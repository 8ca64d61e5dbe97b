use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::repository;
use crate::{error::AppError, platform::PlatformClient};

pub struct SyncService {
    db: SqlitePool,
    platform: Arc<dyn PlatformClient>,
}

#[derive(Debug, Serialize)]
pub struct SyncStats {
    pub courses_pushed: usize,
    pub courses_pulled: usize,
    pub courses_skipped: usize,
    pub assignments_pushed: usize,
    pub assignments_pulled: usize,
    pub assignments_skipped: usize,
}

impl SyncService {
    pub fn new(db: SqlitePool, platform: Arc<dyn PlatformClient>) -> Self {
        Self { db, platform }
    }

    pub async fn sync_all(&self) -> Result<SyncStats, AppError> {
        info!("Starting sync...");
        let mut stats = SyncStats {
            courses_pushed: 0,
            courses_pulled: 0,
            courses_skipped: 0,
            assignments_pushed: 0,
            assignments_pulled: 0,
            assignments_skipped: 0,
        };

        info!("Step 1: Pushing local changes to the platform");
        let (pushed_courses, pushed_assignments) = self.push_local_changes().await?;
        stats.courses_pushed = pushed_courses;
        stats.assignments_pushed = pushed_assignments;
        info!(
            "Pushed {} courses, {} assignments",
            pushed_courses, pushed_assignments
        );

        info!("Step 2: Syncing courses from the platform");
        let (pulled_courses, skipped_courses) = self.sync_courses_from_platform().await?;
        stats.courses_pulled = pulled_courses;
        stats.courses_skipped = skipped_courses;
        info!(
            "Pulled {} courses, skipped {} (local pending)",
            pulled_courses, skipped_courses
        );

        info!("Step 3: Syncing assignments from the platform");
        let (pulled_assignments, skipped_assignments) = self.sync_assignments_from_platform().await?;
        stats.assignments_pulled = pulled_assignments;
        stats.assignments_skipped = skipped_assignments;
        info!(
            "Pulled {} assignments, skipped {} (local pending)",
            pulled_assignments, skipped_assignments
        );

        info!("Sync completed successfully: {:?}", stats);
        Ok(stats)
    }

    async fn sync_courses_from_platform(&self) -> Result<(usize, usize), AppError> {
        let remote_courses = self.platform.fetch_courses().await?;
        let remote_ids: Vec<String> = remote_courses.iter().map(|c| c.id.clone()).collect();

        let mut pulled = 0;
        let mut skipped = 0;

        let local_courses_map: HashMap<String, crate::models::Course> =
            repository::fetch_all_courses(&self.db)
                .await?
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect();

        // Upsert from the platform with conflict detection
        for course in remote_courses {
            if let Some(existing) = local_courses_map.get(&course.id) {
                if existing.sync_state == "pending" {
                    warn!("Skipping course (local pending): {}", course.name);
                    skipped += 1;
                    continue;
                }
                // Avoid overwriting recent local changes
                if let (Some(local_updated), Some(remote_updated)) = (
                    parse_timestamp(&existing.updated_at),
                    parse_timestamp(&course.updated_at),
                ) {
                    if local_updated > remote_updated {
                        warn!(
                            "Skipping course (local newer): {} local={:?} remote={:?}",
                            course.name, local_updated, remote_updated
                        );
                        skipped += 1;
                        continue;
                    }
                }
            }

            repository::upsert_course(&self.db, &course).await?;
            pulled += 1;
        }

        // Archive courses that no longer exist on the platform
        for (id, course) in &local_courses_map {
            if !remote_ids.contains(id) && course.sync_state == "synced" && !course.is_archived {
                repository::archive_course(&self.db, id).await?;
            }
        }

        Ok((pulled, skipped))
    }

    async fn sync_assignments_from_platform(&self) -> Result<(usize, usize), AppError> {
        let remote_assignments = self.platform.fetch_assignments().await?;
        let remote_ids: Vec<String> = remote_assignments.iter().map(|a| a.id.clone()).collect();

        let mut pulled = 0;
        let mut skipped = 0;

        let local_assignments_map: HashMap<String, crate::models::Assignment> =
            repository::fetch_all_assignments(&self.db)
                .await?
                .into_iter()
                .map(|a| (a.id.clone(), a))
                .collect();

        for assignment in remote_assignments {
            if let Some(existing) = local_assignments_map.get(&assignment.id) {
                if existing.sync_state == "pending" {
                    warn!("Skipping assignment (local pending): {}", assignment.title);
                    skipped += 1;
                    continue;
                }
                if let (Some(local_updated), Some(remote_updated)) = (
                    parse_timestamp(&existing.updated_at),
                    parse_timestamp(&assignment.updated_at),
                ) {
                    if local_updated > remote_updated {
                        warn!("Skipping assignment (local newer): {}", assignment.title);
                        skipped += 1;
                        continue;
                    }
                }
            }

            repository::upsert_assignment(&self.db, &assignment).await?;
            pulled += 1;
        }

        for (id, assignment) in &local_assignments_map {
            if !remote_ids.contains(id)
                && assignment.sync_state == "synced"
                && !assignment.is_archived
            {
                repository::archive_assignment(&self.db, id).await?;
            }
        }

        Ok((pulled, skipped))
    }

    async fn push_local_changes(&self) -> Result<(usize, usize), AppError> {
        // Archived rows push too, so deletions propagate.
        let courses = repository::fetch_all_courses(&self.db).await?;
        let mut course_count = 0;

        for course in courses {
            if course.sync_state != "synced" {
                self.platform.push_course(&course).await?;
                let now = chrono::Utc::now().to_rfc3339();
                sqlx::query(
                    "UPDATE courses SET sync_state = 'synced', last_synced_at = ? WHERE id = ?",
                )
                .bind(&now)
                .bind(&course.id)
                .execute(&self.db)
                .await
                .map_err(AppError::Database)?;
                course_count += 1;
            }
        }

        let assignments = repository::fetch_all_assignments(&self.db).await?;
        let mut assignment_count = 0;

        for assignment in assignments {
            if assignment.sync_state != "synced" {
                self.platform.push_assignment(&assignment).await?;
                let now = chrono::Utc::now().to_rfc3339();
                sqlx::query(
                    "UPDATE assignments SET sync_state = 'synced', last_synced_at = ? WHERE id = ?",
                )
                .bind(&now)
                .bind(&assignment.id)
                .execute(&self.db)
                .await
                .map_err(AppError::Database)?;
                assignment_count += 1;
            }
        }

        Ok((course_count, assignment_count))
    }
}

/// Parse RFC3339 timestamp to comparable format
fn parse_timestamp(ts: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&chrono::Utc))
}
