//! Objection Response Handler

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;

use crate::AppState;
use crate::services::llm::{
    ObjectionRequest, SCRIPT_SCHEMA_HEADER, SCRIPT_SCHEMA_VERSION, StructuredScript,
};
use crate::utils::{ApiError, ApiResult};

/// Generate a response script for a sales objection
/// POST /api/get-response
#[utoipa::path(
    post,
    path = "/api/get-response",
    request_body = ObjectionRequest,
    responses(
        (status = 200, description = "Structured response script (schema version 1)", body = StructuredScript),
        (status = 400, description = "Objection text missing or body unreadable"),
        (status = 500, description = "Model call failed or returned an unusable reply"),
    ),
    tag = "Objections"
)]
pub async fn get_response(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ObjectionRequest>, JsonRejection>,
) -> ApiResult<([(&'static str, &'static str); 1], Json<StructuredScript>)> {
    let Json(req) = payload.map_err(|e| ApiError::invalid_body(&e.body_text()))?;

    let script = state.objection_service.respond(req).await?;

    Ok(([(SCRIPT_SCHEMA_HEADER, SCRIPT_SCHEMA_VERSION)], Json(script)))
}
