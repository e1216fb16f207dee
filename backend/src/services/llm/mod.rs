//! LLM Service Module
//!
//! Turns sales objections and recorded audio into model output.
//!
//! # Architecture
//! ```text
//! ┌──────────────────┐
//! │ ObjectionService │  ← validation, prompt, parsing
//! └────────┬─────────┘
//!          │
//!    ┌─────┴─────┐
//!    ▼           ▼
//! ┌──────┐  ┌──────────┐
//! │Gemini│  │ Test     │
//! │Client│  │ doubles  │
//! └──────┘  └──────────┘
//!   LLMClient (trait)
//! ```
//!
//! # Supported Scenarios
//! - Objection response script (`/api/get-response`)
//! - Audio transcription (`/api/transcribe-audio`)

mod client;
mod models;
mod sanitizer;
mod scenarios;
mod service;

pub use client::{GeminiClient, LLMClient};
pub use models::LLMError;
pub use scenarios::objection::*;
pub use scenarios::transcription::*;
pub use service::ObjectionService;
