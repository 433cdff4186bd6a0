//! API Module
//!
//! HTTP surface of the evaluation service: submission, progress streaming
//! and job inspection.

pub mod error;
pub mod evaluate;
pub mod health;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    // JSON escaping can grow the body past the raw document size
    let body_limit = state.limits.max_document_bytes.saturating_mul(2);

    Router::new()
        .route("/health", get(health::health_check))
        // Evaluation endpoints
        .route("/api/evaluate", post(evaluate::submit_evaluation))
        .route("/api/evaluate/stream", get(evaluate::stream_evaluation))
        .route("/api/evaluate/{id}", get(evaluate::get_evaluation))
        .route("/api/jobs", get(evaluate::list_jobs))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
