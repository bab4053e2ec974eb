pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::session::handlers as session_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Consent gate
        .route("/api/v1/consent", post(session_handlers::handle_consent))
        // Generation API
        .route("/api/v1/tasks", get(handlers::handle_list_tasks))
        .route("/api/v1/generate", post(handlers::handle_generate))
        .route(
            "/api/v1/generate/upload",
            post(handlers::handle_generate_upload),
        )
        .with_state(state)
}
