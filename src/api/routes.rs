//! REST API routes configuration

use crate::api::handlers::{self, ApiState};
use crate::api::websocket::ws_handler;
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Fallback handler returning a JSON 404
async fn fallback_handler(uri: axum::http::Uri) -> impl IntoResponse {
    let body = serde_json::json!({ "error": format!("Not Found: {}", uri.path()) });

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap_or_else(|_| StatusCode::NOT_FOUND.into_response())
}

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    // Configure CORS for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // WebSocket for real-time updates
        .route("/ws", get(ws_handler))
        // Participants
        .route("/api/participants", post(handlers::register_participant))
        .route(
            "/api/participants/{identity}",
            get(handlers::get_participant),
        )
        .route("/api/directory", get(handlers::get_directory))
        // Transactions
        .route("/api/transactions", post(handlers::submit_transaction))
        .route("/api/transactions/pending", get(handlers::get_pending))
        .route(
            "/api/properties/{property}/history",
            get(handlers::get_property_history),
        )
        // Mining
        .route("/api/mine", post(handlers::mine))
        // Chain
        .route("/api/chain", get(handlers::get_chain))
        .route("/api/chain/blocks/{index}", get(handlers::get_block))
        .route("/api/chain/validate", get(handlers::validate_chain))
        .route("/api/stats", get(handlers::get_stats))
        .fallback(fallback_handler)
        // Add state and middleware
        .with_state(state)
        .layer(cors)
}
