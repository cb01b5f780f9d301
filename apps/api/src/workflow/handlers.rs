//! Axum route handlers for the session API.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tokio::time::Instant;

use crate::errors::AppError;
use crate::state::AppState;
use crate::workflow::export::{render_export, EXPORT_FILE_NAME};
use crate::workflow::machine::{InputsUpdate, SessionView};
use crate::workflow::service;

#[derive(Debug, Default, Deserialize)]
pub struct OptimizeRequest {
    #[serde(default)]
    pub confirmed: bool,
}

/// GET /api/v1/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(service::snapshot(&state).await)
}

/// PUT /api/v1/session/inputs
///
/// Updates the job and résumé fields. Only allowed on the input step.
pub async fn handle_update_inputs(
    State(state): State<AppState>,
    Json(update): Json<InputsUpdate>,
) -> Result<Json<SessionView>, AppError> {
    let mut session = state.session.lock().await;
    session.update_inputs(update)?;
    Ok(Json(session.view(Instant::now())))
}

/// POST /api/v1/session/analyze
///
/// Runs the analysis prompt. Responds once the model has answered.
pub async fn handle_analyze(State(state): State<AppState>) -> Result<Json<SessionView>, AppError> {
    Ok(Json(service::start_analysis(&state).await?))
}

/// POST /api/v1/session/optimize
///
/// Runs the STAR optimization prompt. The body must carry `"confirmed": true`.
pub async fn handle_optimize(
    State(state): State<AppState>,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(
        service::start_optimization(&state, request.confirmed).await?,
    ))
}

/// POST /api/v1/session/reset
pub async fn handle_new_analysis(
    State(state): State<AppState>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(service::new_analysis(&state).await?))
}

/// DELETE /api/v1/session/error
pub async fn handle_dismiss_error(State(state): State<AppState>) -> StatusCode {
    state.session.lock().await.dismiss_error();
    StatusCode::NO_CONTENT
}

/// GET /api/v1/session/export
///
/// Downloads the optimized résumé as `ATS_Optimized_Resume.txt`.
pub async fn handle_export(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let session = state.session.lock().await;
    let resume = session
        .optimized()
        .ok_or_else(|| AppError::NotFound("No optimized resume to export".to_string()))?;

    let disposition = format!("attachment; filename=\"{EXPORT_FILE_NAME}\"");
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        render_export(resume),
    ))
}
