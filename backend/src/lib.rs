//! Objection Coach backend
//!
//! Receives a sales objection (text or audio), asks a generative model for a
//! structured response script and relays it to the client application.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod utils;

#[cfg(test)]
mod tests;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::config::ServerConfig;
use crate::services::{KnowledgeStore, LLMClient, ObjectionService};

rust_i18n::i18n!("locales", fallback = "pt");

/// Shared, read-only state handed to every handler
pub struct AppState {
    pub objection_service: ObjectionService,
}

impl AppState {
    /// `deadline` bounds the model work of each request
    pub fn new(
        client: Arc<dyn LLMClient>,
        knowledge: Arc<KnowledgeStore>,
        deadline: Duration,
    ) -> Self {
        Self { objection_service: ObjectionService::new(client, knowledge, deadline) }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::objection::get_response,
        handlers::transcription::transcribe_audio,
    ),
    components(schemas(
        services::llm::ObjectionRequest,
        services::llm::StructuredScript,
        services::llm::ToneKeywords,
        services::llm::TranscriptionResponse,
        services::llm::TranscribeAudioForm,
        utils::error::ApiErrorResponse,
    )),
    tags(
        (name = "Objections", description = "Objection response scripts"),
        (name = "Transcription", description = "Audio transcription"),
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the HTTP router with all routes and layers
pub fn build_router(state: Arc<AppState>, server: &ServerConfig) -> Router {
    Router::new()
        .route("/api/get-response", post(handlers::objection::get_response))
        .route(
            "/api/transcribe-audio",
            post(handlers::transcription::transcribe_audio)
                .layer(DefaultBodyLimit::max(server.max_upload_bytes)),
        )
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::locale_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
