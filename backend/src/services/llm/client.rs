//! External model client
//!
//! `LLMClient` is the seam the service depends on; `GeminiClient` talks to
//! the Gemini REST API. Every call is a single attempt bounded by the
//! configured HTTP timeout.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;

use super::models::{
    ErrorEnvelope, FileData, GenerateContentRequest, GenerateContentResponse, LLMError, Part,
    UploadMetadata, UploadResponse, UploadStartRequest, UploadedFile,
};
use crate::config::GeminiConfig;

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Send a text prompt and return the model's raw reply.
    async fn generate_text(&self, prompt: &str) -> Result<String, LLMError>;

    /// Send an instruction together with a media payload.
    async fn generate_from_media(
        &self,
        instruction: &str,
        media: &[u8],
        mime_type: &str,
    ) -> Result<String, LLMError>;
}

#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    api_base: String,
    model: String,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, LLMError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LLMError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    async fn generate(&self, parts: Vec<Part>) -> Result<String, LLMError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.api_base, self.model);
        let request = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&GenerateContentRequest::user(parts));

        let response = self.send(request).await?;
        let body: GenerateContentResponse =
            response.json().await.map_err(|e| LLMError::ParseError(e.to_string()))?;

        body.text().ok_or(LLMError::EmptyResponse)
    }

    /// Resumable upload: open a session, then send the bytes and finalize.
    async fn upload(&self, media: &[u8], mime_type: &str) -> Result<UploadedFile, LLMError> {
        let start = self
            .http
            .post(format!("{}/upload/v1beta/files", self.api_base))
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", media.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&UploadStartRequest {
                file: UploadMetadata { display_name: format!("audio-{}", uuid::Uuid::new_v4()) },
            });

        let response = self.send(start).await?;
        let upload_url = response
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| LLMError::ParseError("upload session URL missing".into()))?;

        let finalize = self
            .http
            .post(upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(media.to_vec());

        let response = self.send(finalize).await?;
        let uploaded: UploadResponse =
            response.json().await.map_err(|e| LLMError::ParseError(e.to_string()))?;

        tracing::debug!(
            "Uploaded media as {} ({:?})",
            uploaded.file.name,
            uploaded.file.mime_type
        );
        Ok(uploaded.file)
    }

    /// Upload, generate, then delete the upload whatever the outcome
    async fn generate_with_upload(
        &self,
        instruction: String,
        media: Vec<u8>,
        mime_type: String,
    ) -> Result<String, LLMError> {
        let file = self.upload(&media, &mime_type).await?;

        let result = self
            .generate(vec![
                Part::Text { text: instruction },
                Part::File { file_data: FileData { mime_type, file_uri: file.uri.clone() } },
            ])
            .await;

        if let Err(e) = self.delete(&file).await {
            tracing::warn!("Failed to delete uploaded media {}: {}", file.name, e);
        }

        result
    }

    async fn delete(&self, file: &UploadedFile) -> Result<(), LLMError> {
        let request = self
            .http
            .delete(format!("{}/v1beta/{}", self.api_base, file.name))
            .header(API_KEY_HEADER, &self.api_key);
        self.send(request).await.map(|_| ())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, LLMError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                LLMError::Timeout(self.timeout_secs)
            } else {
                LLMError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LLMError::RateLimited);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        Err(LLMError::ApiError(format!("HTTP {}: {}", status.as_u16(), message)))
    }
}

#[async_trait]
impl LLMClient for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, LLMError> {
        self.generate(vec![Part::Text { text: prompt.to_string() }]).await
    }

    async fn generate_from_media(
        &self,
        instruction: &str,
        media: &[u8],
        mime_type: &str,
    ) -> Result<String, LLMError> {
        // Detached so a caller that stops waiting cannot skip the delete
        let client = self.clone();
        let task = tokio::spawn({
            let (instruction, media, mime_type) =
                (instruction.to_string(), media.to_vec(), mime_type.to_string());
            async move { client.generate_with_upload(instruction, media, mime_type).await }
        });

        task.await.map_err(|e| LLMError::ApiError(format!("media task aborted: {}", e)))?
    }
}
