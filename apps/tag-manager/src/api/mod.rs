// API layer module (adapters for controllers)
// Follows Hexagonal Architecture - API is an adapter

pub mod errors;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use crate::infrastructure::DriverHandle;
use handlers::{reports, status, tags};

/// Shared handler state: the only way into the game loop
#[derive(Debug, Clone)]
pub struct AppState {
    pub driver: DriverHandle,
}

impl AppState {
    pub fn new(driver: DriverHandle) -> Self {
        Self { driver }
    }
}

/// Builds the router without middleware layers
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(status::health_check))
        // Inbound traffic
        .route("/api/reports", post(reports::submit_report))
        .route("/api/mail", post(reports::submit_mail))
        .route("/api/tags", post(tags::request_tag))
        .route("/api/untags", post(tags::request_untag))
        // Field state
        .route("/api/status", get(status::get_status))
        .route("/api/tagged", get(status::get_tagged))
        .route("/api/agents/:name", get(status::get_agent))
        .route("/api/zones", get(status::get_zones))
        .route("/api/posts", get(status::get_posts))
        .with_state(state)
}
