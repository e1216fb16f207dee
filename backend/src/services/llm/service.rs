//! Objection Service
//!
//! Orchestrates both endpoints: validation, prompt building, the model
//! call and reply parsing. The model call is the only await point that
//! leaves the process.

use axum::body::Bytes;
use rust_i18n::t;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use validator::Validate;

use super::client::LLMClient;
use super::models::LLMError;
use super::sanitizer::parse_structured_script;
use super::scenarios::objection::{ObjectionRequest, StructuredScript, build_objection_prompt};
use super::scenarios::transcription::TRANSCRIPTION_INSTRUCTION;
use crate::services::knowledge::KnowledgeStore;
use crate::services::media::detect_mime;
use crate::utils::{ApiError, ApiResult, get_locale};

#[derive(Clone)]
pub struct ObjectionService {
    client: Arc<dyn LLMClient>,
    knowledge: Arc<KnowledgeStore>,
    deadline: Duration,
}

impl ObjectionService {
    pub fn new(
        client: Arc<dyn LLMClient>,
        knowledge: Arc<KnowledgeStore>,
        deadline: Duration,
    ) -> Self {
        Self { client, knowledge, deadline }
    }

    /// Bound a model call by the request deadline
    async fn within_deadline<T>(
        &self,
        call: impl Future<Output = Result<T, LLMError>>,
    ) -> Result<T, LLMError> {
        tokio::time::timeout(self.deadline, call)
            .await
            .unwrap_or_else(|_| Err(LLMError::Timeout(self.deadline.as_secs())))
    }

    /// Generate a structured script for an objection
    pub async fn respond(&self, req: ObjectionRequest) -> ApiResult<StructuredScript> {
        if req.validate().is_err() {
            let locale = get_locale();
            return Err(ApiError::validation_error(t!(
                "validation.objection_required",
                locale = &locale
            )));
        }

        let input = req.to_input();
        tracing::info!(
            objection_len = input.objection.len(),
            profile = input.profile.as_tag(),
            "Objection received"
        );

        let prompt = build_objection_prompt(&input, &self.knowledge);

        let t0 = Instant::now();
        tracing::debug!(prompt_len = prompt.len(), "Dispatching objection prompt to model");
        let reply = self.within_deadline(self.client.generate_text(&prompt)).await.map_err(|e| {
            tracing::error!(retryable = e.is_retryable(), "Model call failed: {}", e);
            ApiError::from(e)
        })?;

        let script = parse_structured_script(&reply)?;
        tracing::info!(
            objection_type = %script.objection_type,
            steps = script.script_steps.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Objection script generated"
        );

        Ok(script)
    }

    /// Transcribe an uploaded audio payload
    pub async fn transcribe(&self, audio: Option<Bytes>) -> ApiResult<String> {
        let audio = match audio {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => {
                let locale = get_locale();
                return Err(ApiError::validation_error(t!(
                    "validation.audio_required",
                    locale = &locale
                )));
            },
        };

        let mime_type = detect_mime(&audio).ok_or(ApiError::UnsupportedMedia)?;
        tracing::info!(bytes = audio.len(), mime_type, "Audio received for transcription");

        let t0 = Instant::now();
        let text = self
            .within_deadline(self.client.generate_from_media(
                TRANSCRIPTION_INSTRUCTION,
                &audio,
                mime_type,
            ))
            .await
            .map_err(|e| {
                tracing::error!(retryable = e.is_retryable(), "Transcription call failed: {}", e);
                ApiError::from(e)
            })?;

        let transcription = text.trim().to_string();
        tracing::info!(
            chars = transcription.chars().count(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Audio transcribed"
        );

        Ok(transcription)
    }
}
