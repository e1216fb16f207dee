//! Audio Transcription Scenario

use serde::Serialize;
use utoipa::ToSchema;

pub const TRANSCRIPTION_INSTRUCTION: &str = "Transcreva este áudio em português do Brasil. \
     Responda somente com o texto falado, sem comentários, rótulos ou formatação.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TranscriptionResponse {
    pub transcription: String,
}

/// Multipart form accepted by the transcription endpoint (docs only)
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct TranscribeAudioForm {
    #[schema(value_type = String, format = Binary)]
    pub audio: Vec<u8>,
}
