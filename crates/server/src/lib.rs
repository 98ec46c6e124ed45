//! HTTP surface for docqa.
//!
//! Routes:
//! - `POST /auth/token`: form login, returns a bearer token
//! - `POST /documents/upload`: multipart `file` upload, ingested into the index
//! - `GET /documents`: registry of ingested documents
//! - `POST /rag/ask?question=...`: retrieval-augmented answer
//! - `GET /health`: liveness probe

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

pub use auth::{Claims, TokenIssuer, TokenResponse};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use docqa_core::{AppConfig, AppError, AppResult};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Largest accepted request body.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let protected = Router::new()
        .route("/documents", get(routes::list_documents))
        .route("/documents/upload", post(routes::upload_document))
        .route("/rag/ask", post(routes::ask))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            routes::require_token,
        ));

    Router::new()
        .route("/health", get(routes::health))
        .route("/auth/token", post(routes::issue_token))
        .merge(protected)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on the configured address until Ctrl-C.
pub async fn serve(config: &AppConfig) -> AppResult<()> {
    let state = AppState::from_config(config)?;
    let app = router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Other(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Other(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
