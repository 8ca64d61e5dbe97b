use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studysync_backend::api::router;
use studysync_backend::platform::{
    HttpPlatformClient, NoopPlatformClient, PlatformClient, PlatformConfig,
};
use studysync_backend::services::SyncScheduler;
use studysync_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "studysync_backend=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://studysync.db".to_string());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let platform: Arc<dyn PlatformClient> = match PlatformConfig::new_from_env() {
        Ok(config) => Arc::new(HttpPlatformClient::new(config)?),
        Err(err) => {
            warn!("platform sync disabled: {}", err);
            Arc::new(NoopPlatformClient)
        }
    };

    let sync_interval_secs = std::env::var("SYNC_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(300);
    let scheduler = SyncScheduler::new(pool.clone(), platform.clone(), sync_interval_secs);
    tokio::spawn(scheduler.start());

    let state = AppState {
        db: pool.clone(),
        platform,
    };

    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
