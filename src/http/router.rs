//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        // Analysis pipeline and history
        .route("/analyses", post(handlers::run_analysis))
        .route("/analyses", get(handlers::list_analyses))
        .route("/analyses/current", get(handlers::get_current_analysis))
        .route("/analyses/{id}", get(handlers::get_analysis))
        .route("/analyses/{id}", delete(handlers::delete_analysis))
        .route("/analyses/{id}/selection", post(handlers::toggle_selection))
        .route("/analyses/{id}/revisit", post(handlers::request_revisit))
        // Comparison and export
        .route("/compare", get(handlers::get_compare))
        .route("/history/export.csv", get(handlers::export_history))
        .route("/revisit", get(handlers::poll_revisit))
        // Points of interest
        .route("/pois", get(handlers::list_pois))
        .route("/pois", post(handlers::create_poi))
        .route("/pois/{id}", delete(handlers::delete_poi))
        // Map overlay
        .route("/overlay-url", get(handlers::get_overlay_url));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        // Geometry payloads are small; keep the limit tight.
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
