pub mod health;
pub mod models;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::document::handlers as document_handlers;
use crate::state::AppState;
use crate::workflow::handlers;

/// Résumé PDFs can exceed axum's 2 MB default.
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/models", get(models::handle_list_models))
        // Session API
        .route("/api/v1/session", get(handlers::handle_get_session))
        .route("/api/v1/session/inputs", put(handlers::handle_update_inputs))
        .route(
            "/api/v1/session/resume",
            post(document_handlers::handle_upload_resume),
        )
        .route("/api/v1/session/analyze", post(handlers::handle_analyze))
        .route("/api/v1/session/optimize", post(handlers::handle_optimize))
        .route("/api/v1/session/reset", post(handlers::handle_new_analysis))
        .route("/api/v1/session/error", delete(handlers::handle_dismiss_error))
        .route("/api/v1/session/export", get(handlers::handle_export))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
