use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::aggregator::Aggregator;

pub mod handlers;
pub mod models;

/// Shared, read-only handler state. Holds no per-request data.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub default_max_results: u32,
    pub max_aggregate_results: u32,
}

pub fn create_router(state: AppState, static_dir: &str) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/search", get(handlers::search_handler))
        .with_state(state)
        // Static file serving for the frontend
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
}
