//! Model reply cleanup and parsing
//!
//! Models often wrap JSON in markdown fences despite being told not to.
//! Fence markers are removed wherever they appear (plain string
//! replacement, not a markdown parse) before the text is parsed.

use serde_json::Value;
use validator::Validate;

use super::scenarios::objection::StructuredScript;
use crate::utils::ApiError;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Trim and strip every fence marker from a raw model reply.
pub fn sanitize_reply(raw: &str) -> String {
    raw.trim().replace(JSON_FENCE, "").replace(FENCE, "").trim().to_string()
}

/// Parse a sanitized reply as a JSON object.
pub fn parse_json_object(raw: &str) -> Result<Value, ApiError> {
    let cleaned = sanitize_reply(raw);
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => {
            tracing::error!(raw_reply = %raw, "Model reply is JSON but not an object");
            Err(ApiError::response_format("reply is not a JSON object"))
        },
        Err(e) => {
            tracing::error!(raw_reply = %raw, "Model reply is not valid JSON: {}", e);
            Err(ApiError::response_format(e.to_string()))
        },
    }
}

/// Parse and schema-check a reply for the objection endpoint.
///
/// Keys outside the script schema are dropped; missing or mistyped keys fail.
pub fn parse_structured_script(raw: &str) -> Result<StructuredScript, ApiError> {
    let value = parse_json_object(raw)?;

    let script: StructuredScript = serde_json::from_value(value).map_err(|e| {
        tracing::error!(raw_reply = %raw, "Model reply does not match the script schema: {}", e);
        ApiError::response_format(format!("schema mismatch: {}", e))
    })?;

    script.validate().map_err(|e| {
        tracing::error!(raw_reply = %raw, "Model reply failed script validation: {}", e);
        ApiError::response_format(format!("validation failed: {}", e))
    })?;

    Ok(script)
}
