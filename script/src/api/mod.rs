//! HTTP prover service used by the web front-end.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use state::AppState;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/requestProof", post(handlers::request_proof))
        .route("/waitProof", post(handlers::wait_proof))
        .route("/prove", post(handlers::prove))
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
