//! Axum server for the record API.

use std::sync::Arc;

use axum::http::Method;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::cache::RecordCache;
use crate::config::ServerConfig;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The cache service in front of the record backend. Constructed once
    /// at startup and shared; handlers never build their own.
    pub records: Arc<RecordCache>,
    /// Records per page when a request doesn't ask for a length.
    pub page_length: u32,
}

/// Build the axum router with all API routes.
pub fn build_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(super::routes::health::get_health))
        .route(
            "/api/records",
            get(super::routes::records::get_records).post(super::routes::records::create_record),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

/// Start the API server.
pub async fn start_server(
    config: &ServerConfig,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = build_router(state);
    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Record API server listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
