//! Route definitions for web server.

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::api;
use crate::core::QueueService;

/// Largest accepted request body.
const BODY_LIMIT_BYTES: usize = 16 * 1024;

/// Create the full app router.
pub fn create_app_router(service: Arc<QueueService>) -> Router {
    Router::new()
        // Queue. A known path with the wrong method gets the same 418 as an unknown path.
        .route("/registerUser", post(api::register_user).fallback(route_not_found))
        .route("/serveUser", post(api::serve_user).fallback(route_not_found))
        .route("/listUsers", get(api::list_users).fallback(route_not_found))
        .route("/tickets/:reference", get(api::get_ticket).fallback(route_not_found))
        .route("/stats", get(api::queue_stats).fallback(route_not_found))
        .route("/health", get(health_check).fallback(route_not_found))
        .fallback(route_not_found)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

async fn route_not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::IM_A_TEAPOT,
        Json(json!({ "Message": "Route not found" })),
    )
}
