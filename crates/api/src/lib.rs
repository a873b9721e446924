pub mod error;
pub mod extractors;
pub mod render;
pub mod routes;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
};
use state::AppState;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .settings
        .app
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any);

    let upload_limit = state.settings.drive.max_upload_bytes + MULTIPART_OVERHEAD;

    // Drive routes
    let drive_routes = Router::new()
        .route("/save-credentials", post(routes::drive::save_credentials))
        .route("/auth", post(routes::drive::start_auth))
        .route(
            "/callback",
            get(routes::drive::callback).post(routes::drive::callback),
        )
        .route("/files", get(routes::drive::list_files))
        .route(
            "/upload",
            post(routes::drive::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/download", get(routes::drive::download))
        .route("/create-folder", post(routes::drive::create_folder))
        .route("/status", get(routes::drive::status))
        .route("/disconnect", post(routes::drive::disconnect));

    // Compose API
    let api = Router::new().nest("/v1/drive", drive_routes);

    // Health check
    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
