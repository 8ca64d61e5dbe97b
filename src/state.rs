use std::sync::Arc;

use sqlx::SqlitePool;

use crate::platform::PlatformClient;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub platform: Arc<dyn PlatformClient>,
}
