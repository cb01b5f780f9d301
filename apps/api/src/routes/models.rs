use axum::{extract::State, Json};
use serde::Serialize;

use crate::models::catalog::{ModelOption, MODEL_CATALOG};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ModelListResponse {
    pub models: &'static [ModelOption],
    pub default_model: String,
}

/// GET /api/v1/models
pub async fn handle_list_models(State(state): State<AppState>) -> Json<ModelListResponse> {
    Json(ModelListResponse {
        models: MODEL_CATALOG,
        default_model: state.config.default_model.clone(),
    })
}
