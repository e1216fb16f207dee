// Common test utilities and helpers

use async_trait::async_trait;
use axum::Router;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::ServerConfig;
use crate::services::llm::LLMError;
use crate::services::{KnowledgeStore, LLMClient, ObjectionService};
use crate::{AppState, build_router};

pub const TEST_PLAYBOOK: &str = "PLAYBOOK: valide, ressignifique, prove.";
pub const TEST_CASES: &str = "CASO: cliente economizou R$ 12 mil no primeiro ano.";

/// Reply the mock model gives, whatever the input
pub enum MockReply {
    Text(String),
    Fail(String),
}

/// `LLMClient` double that counts calls and records what it was sent
pub struct MockLLMClient {
    reply: MockReply,
    delay: Duration,
    text_calls: AtomicUsize,
    media_calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
    last_mime: Mutex<Option<String>>,
}

impl MockLLMClient {
    pub fn replying(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(MockReply::Text(text.into())))
    }

    pub fn failing(message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(MockReply::Fail(message.into())))
    }

    /// Answers `text` only after `delay`
    pub fn slow(delay: Duration, text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self { delay, ..Self::new(MockReply::Text(text.into())) })
    }

    fn new(reply: MockReply) -> Self {
        Self {
            reply,
            delay: Duration::ZERO,
            text_calls: AtomicUsize::new(0),
            media_calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
            last_mime: Mutex::new(None),
        }
    }

    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }

    pub fn media_calls(&self) -> usize {
        self.media_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.text_calls() + self.media_calls()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }

    pub fn last_mime(&self) -> Option<String> {
        self.last_mime.lock().unwrap().clone()
    }

    async fn answer(&self) -> Result<String, LLMError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Fail(message) => Err(LLMError::ApiError(message.clone())),
        }
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, LLMError> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        self.answer().await
    }

    async fn generate_from_media(
        &self,
        instruction: &str,
        _media: &[u8],
        mime_type: &str,
    ) -> Result<String, LLMError> {
        self.media_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(instruction.to_string());
        *self.last_mime.lock().unwrap() = Some(mime_type.to_string());
        self.answer().await
    }
}

pub fn test_knowledge() -> Arc<KnowledgeStore> {
    Arc::new(KnowledgeStore::new(TEST_PLAYBOOK, TEST_CASES))
}

fn default_deadline() -> Duration {
    Duration::from_secs(ServerConfig::default().request_timeout_secs)
}

pub fn create_test_service(client: Arc<dyn LLMClient>) -> ObjectionService {
    create_test_service_with_deadline(client, default_deadline())
}

pub fn create_test_service_with_deadline(
    client: Arc<dyn LLMClient>,
    deadline: Duration,
) -> ObjectionService {
    ObjectionService::new(client, test_knowledge(), deadline)
}

pub fn create_test_router(client: Arc<MockLLMClient>) -> Router {
    create_test_router_with_deadline(client, default_deadline())
}

pub fn create_test_router_with_deadline(client: Arc<MockLLMClient>, deadline: Duration) -> Router {
    let state = Arc::new(AppState::new(client, test_knowledge(), deadline));
    build_router(state, &ServerConfig::default())
}

/// Reply used by the end-to-end objection scenario
pub const FENCED_SCRIPT_REPLY: &str = "```json\n{\"tipo_objecao\":\"Preço\",\"roteiro\":[\"a\"],\"tom_palavras_chave\":{\"tom\":\"x\",\"palavras_chave\":[\"y\"]},\"follow_up\":[\"z\"]}\n```";

/// Minimal PCM WAV header, enough for magic-number detection
pub fn wav_bytes() -> Vec<u8> {
    let mut bytes = b"RIFF".to_vec();
    bytes.extend_from_slice(&36u32.to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&[16, 0, 0, 0, 1, 0, 1, 0]);
    bytes.extend_from_slice(&[0x44, 0xAC, 0, 0, 0x88, 0x58, 0x01, 0, 2, 0, 16, 0]);
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes
}

pub const MULTIPART_BOUNDARY: &str = "objection-coach-test-boundary";

/// Build a multipart/form-data body with one file field
pub fn multipart_body(field: &str, payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"upload.bin\"\r\n",
            field
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}
