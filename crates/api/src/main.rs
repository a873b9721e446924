use std::sync::Arc;

use drivebridge_api::{build_router, state::AppState};
use drivebridge_config::{Settings, StorageBackend};
use drivebridge_db::{
    OptionStore, connect,
    indexes::ensure_indexes,
    store::{MemoryOptionStore, MongoOptionStore},
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "drivebridge_api=debug,drivebridge_services=debug,drivebridge_db=debug,tower_http=debug"
                .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config
    let settings = Settings::load()?;
    info!("Starting drivebridge API on {}:{}", settings.app.host, settings.app.port);
    info!(
        redirect_uri = %settings.drive.redirect_uri,
        timeout_secs = settings.drive.request_timeout_secs,
        "Google Drive config"
    );

    let store: Arc<dyn OptionStore> = match settings.database.backend {
        StorageBackend::Mongodb => {
            let db = connect(&settings).await?;
            ensure_indexes(&db).await?;
            Arc::new(MongoOptionStore::new(&db))
        }
        StorageBackend::Memory => {
            warn!("Using the in-memory option store, credentials and tokens are lost on restart");
            Arc::new(MemoryOptionStore::new())
        }
    };

    // Build app state
    let app_state = AppState::new(settings.clone(), store)?;

    // Build router
    let app = build_router(app_state);

    // Start server
    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
