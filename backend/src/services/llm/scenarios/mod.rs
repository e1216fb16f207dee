//! LLM Scenarios
//!
//! Each scenario owns its request/response types and its instruction text.

pub mod objection;
pub mod transcription;
