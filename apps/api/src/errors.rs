use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::document::DocumentError;
use crate::llm_client::InferenceError;
use crate::workflow::machine::TransitionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every message is user-facing; the same text lands in the session banner.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::MissingInputs | TransitionError::NotConfirmed => {
                AppError::Validation(err.to_string())
            }
            TransitionError::UploadInProgress | TransitionError::InvalidStep { .. } => {
                AppError::Conflict(err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Inference(e) => {
                tracing::error!("Inference error: {e}");
                let (status, code) = match e {
                    InferenceError::ModelNotFound { .. } => (StatusCode::BAD_GATEWAY, "MODEL_NOT_FOUND"),
                    InferenceError::TransportUnreachable { .. } => {
                        (StatusCode::SERVICE_UNAVAILABLE, "TRANSPORT_UNREACHABLE")
                    }
                    InferenceError::Protocol { .. } => (StatusCode::BAD_GATEWAY, "PROTOCOL_ERROR"),
                    InferenceError::MalformedResponse { .. } => {
                        (StatusCode::BAD_GATEWAY, "MALFORMED_RESPONSE")
                    }
                };
                (status, code, e.to_string())
            }
            AppError::Document(e) => {
                let (status, code) = match e {
                    DocumentError::Format { .. } => {
                        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "DOCUMENT_FORMAT_ERROR")
                    }
                    DocumentError::Extraction { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_ERROR")
                    }
                };
                (status, code, e.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
