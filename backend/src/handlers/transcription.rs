//! Audio Transcription Handler

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use std::sync::Arc;

use crate::AppState;
use crate::services::llm::{TranscribeAudioForm, TranscriptionResponse};
use crate::utils::{ApiError, ApiResult};

const AUDIO_FIELD: &str = "audio";

/// Transcribe an uploaded audio file
/// POST /api/transcribe-audio
#[utoipa::path(
    post,
    path = "/api/transcribe-audio",
    request_body(content = TranscribeAudioForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Transcribed text", body = TranscriptionResponse),
        (status = 400, description = "Audio field missing or file type not recognized"),
        (status = 500, description = "Model call failed"),
    ),
    tag = "Transcription"
)]
pub async fn transcribe_audio(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<TranscriptionResponse>> {
    let mut multipart = multipart.map_err(|e| ApiError::invalid_body(&e.body_text()))?;

    let mut audio = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| ApiError::invalid_body(&e.body_text()))? {
        if field.name() == Some(AUDIO_FIELD) {
            audio = Some(field.bytes().await.map_err(|e| ApiError::invalid_body(&e.body_text()))?);
            break;
        }
    }

    let transcription = state.objection_service.transcribe(audio).await?;
    Ok(Json(TranscriptionResponse { transcription }))
}
