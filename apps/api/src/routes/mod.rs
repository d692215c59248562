pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Match API
        .route("/api/v1/jobs/:job_id/match", get(handlers::handle_match))
        .route(
            "/api/v1/jobs/match/batch",
            post(handlers::handle_batch_match),
        )
        .with_state(state)
}
