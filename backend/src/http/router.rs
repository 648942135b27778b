//! Router configuration for the HTTP API.
//!
//! Sets up all routes and middleware (CORS, compression, tracing).

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
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
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/prediction", get(handlers::get_prediction))
        .route(
            "/cycles",
            get(handlers::list_cycles).post(handlers::create_cycle),
        )
        .route("/calendar", get(handlers::get_calendar));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
