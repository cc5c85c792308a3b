//! Parsing of raw generator output ahead of schema validation

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::service::extraction::ExtractionError;

const TIMESTAMP_KEY: &str = "extraction_timestamp";

/// Parse generator output as JSON
///
/// Output wrapped in a single markdown code fence is unwrapped first.
pub fn parse_response(text: &str) -> Result<Value, ExtractionError> {
    let payload = strip_code_fence(text);
    serde_json::from_str(payload).map_err(|e| ExtractionError::MalformedResponse(e.to_string()))
}

/// Insert `now` at `metadata.extraction_timestamp` when the key is absent
///
/// Returns whether a timestamp was inserted. A missing or non-object
/// `metadata` is left for the schema validator to report.
pub fn backfill_extraction_timestamp(raw: &mut Value, now: DateTime<Utc>) -> bool {
    let Some(metadata) = raw.get_mut("metadata").and_then(Value::as_object_mut) else {
        return false;
    };
    if metadata.contains_key(TIMESTAMP_KEY) {
        return false;
    }

    metadata.insert(TIMESTAMP_KEY.to_string(), Value::String(now.to_rfc3339()));
    true
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") on the opening fence line
    match body.split_once('\n') {
        Some((info, content)) if !info.trim_start().starts_with(['{', '[']) => content.trim(),
        _ => body.trim(),
    }
}
