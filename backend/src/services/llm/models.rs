//! LLM error type and Gemini wire types

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("LLM request timed out after {0}s")]
    Timeout(u64),

    #[error("LLM rate limited")]
    RateLimited,

    #[error("LLM API error: {0}")]
    ApiError(String),

    #[error("LLM network error: {0}")]
    Network(String),

    #[error("LLM returned no text")]
    EmptyResponse,

    #[error("Failed to parse LLM envelope: {0}")]
    ParseError(String),
}

impl LLMError {
    /// Whether a caller could reasonably try again later. Nothing in this
    /// service retries; the flag only enriches logs.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LLMError::Timeout(_) | LLMError::RateLimited | LLMError::Network(_) | LLMError::ApiError(_)
        )
    }
}

// ============================================================================
// generateContent
// ============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content {
    pub role: &'static str,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum Part {
    Text { text: String },
    File { file_data: FileData },
}

#[derive(Debug, Serialize)]
pub(crate) struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

impl GenerateContentRequest {
    pub fn user(parts: Vec<Part>) -> Self {
        Self { contents: vec![Content { role: "user", parts }] }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponsePart {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it has any
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

// ============================================================================
// Files API
// ============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct UploadStartRequest {
    pub file: UploadMetadata,
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadMetadata {
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub file: UploadedFile,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UploadedFile {
    /// Resource name, e.g. `files/abc123`
    pub name: String,
    pub uri: String,
    #[serde(rename = "mimeType", default)]
    pub mime_type: Option<String>,
}

// ============================================================================
// Provider error envelope
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}
