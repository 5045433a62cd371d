//! API Route Configuration

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{self, AppState};

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/track", get(handlers::track).post(handlers::track))
        .route("/health", get(handlers::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
