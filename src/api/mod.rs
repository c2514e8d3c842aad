//! HTTP API module
//!
//! Input events from the deck host and writes from the configuration surface
//! arrive here.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/input/:device/:event", post(input_handler))
        .route("/settings", get(settings_handler))
        .route("/settings/duration", put(duration_handler))
        .route("/settings/command", put(command_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
