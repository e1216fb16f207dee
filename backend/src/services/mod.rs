pub mod knowledge;
pub mod llm;
pub mod media;

pub use knowledge::KnowledgeStore;
pub use llm::{GeminiClient, LLMClient, ObjectionService};
