use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::document::Upload;
use crate::errors::AppError;
use crate::state::AppState;
use crate::workflow::machine::SessionView;
use crate::workflow::service;

/// Multipart field carrying the résumé file.
const RESUME_FIELD: &str = "resume";

/// POST /api/v1/session/resume
///
/// Accepts a single PDF in the `resume` field and replaces the session's résumé text.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SessionView>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        let upload = Upload {
            file_name,
            content_type,
            data,
        };
        return Ok(Json(service::upload_resume(&state, upload).await?));
    }

    Err(AppError::Validation(format!(
        "Multipart field '{RESUME_FIELD}' is required"
    )))
}
