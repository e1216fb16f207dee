use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_i18n::t;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use super::i18n::get_locale;
use crate::services::llm::LLMError;

/// API Error returned by every handler
///
/// Variants carrying provider or model details keep them for logging only;
/// the response body always uses a fixed localized message for those.
#[derive(Error, Debug)]
pub enum ApiError {
    // Validation errors 4xxx
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unsupported media type")]
    UnsupportedMedia,

    // System errors 5xxx
    #[error("Model response is not valid JSON: {0}")]
    ResponseFormat(String),

    #[error("External model call failed: {0}")]
    ExternalCall(#[from] LLMError),

    // Generic wrapper for other errors - auto-convert from anyhow::Error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// Helper to create validation error
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// Helper for a request body that could not be read at all
    pub fn invalid_body(reason: &str) -> Self {
        let locale = get_locale();
        Self::ValidationError(
            t!("validation.invalid_body", locale = &locale, reason = reason).to_string(),
        )
    }

    /// Helper to create response format error
    pub fn response_format(message: impl Into<String>) -> Self {
        Self::ResponseFormat(message.into())
    }

    pub fn error_code(&self) -> i32 {
        match self {
            // Validation errors 4xxx
            Self::ValidationError(_) => 4001,
            Self::UnsupportedMedia => 4002,

            // System errors 5xxx
            Self::Other(_) => 5001,
            Self::ResponseFormat(_) => 5002,
            Self::ExternalCall(_) => 5003,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.error_code() {
            4001..=4999 => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    pub error: String,
    pub code: i32,
}

impl ApiError {
    /// Get localized error message based on current locale
    pub fn localized_message(&self) -> String {
        let locale = get_locale();
        match self {
            Self::ValidationError(details) => {
                t!("validation.failed", locale = &locale, details = details).to_string()
            },
            Self::UnsupportedMedia => t!("media.unsupported", locale = &locale).to_string(),
            Self::ResponseFormat(_) => t!("llm.response_format", locale = &locale).to_string(),
            Self::ExternalCall(_) => t!("llm.external_call", locale = &locale).to_string(),
            Self::Other(_) => t!("internal.error", locale = &locale).to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "Request failed: {}", self);
        } else {
            tracing::debug!(code = self.error_code(), "Request rejected: {}", self);
        }

        let response = ApiErrorResponse { error: self.localized_message(), code: self.error_code() };

        (status, Json(response)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
