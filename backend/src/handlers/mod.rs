pub mod objection;
pub mod transcription;
