use axum::Router;
use axum::routing::{any, get};
use std::sync::Arc;

use crate::handlers::{chat_handler, health_handler, metrics_handler};
use crate::state::AppState;

// Serverless-era path, still served for existing front-ends
pub const LEGACY_CHAT_PATH: &str = "/.netlify/functions/chat";

//creating the router with routes
pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/chat", any(chat_handler))
        .route(LEGACY_CHAT_PATH, any(chat_handler))
        .with_state(state)
}
