use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Watch event ingestion
        .route("/events", post(handlers::ingest_event))
        // Break state machine
        .route("/users/:id/playback/ended", post(handlers::playback_ended))
        .route("/users/:id/break/elapsed", post(handlers::break_elapsed))
        .route("/users/:id/break", get(handlers::get_break_state))
        // Daily statistics
        .route("/users/:id/stats", get(handlers::get_daily_stats))
        // Feed
        .route("/users/:id/feed", get(handlers::get_feed))
        // Parental configuration
        .route(
            "/users/:id/parental-controls",
            get(handlers::get_parental_controls),
        )
        .route(
            "/users/:id/parental-controls",
            put(handlers::put_parental_controls),
        )
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
