//! Model answer normalization.
//!
//! The model's answer has no structural guarantee: it may be a bare JSON
//! object, JSON wrapped in markdown fencing, or prose. Normalization strips
//! fencing and attempts a strict object parse, nothing more; guessing
//! structure out of prose is deliberately not attempted.

use serde_json::{Map, Value};

use crate::error::ResponseError;

/// Strip leading/trailing markdown code-fence markers, with or without a
/// `json` language tag, leaving any other text untouched.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the language tag line ("json", "JSON", or empty).
    let body = match rest.split_once('\n') {
        Some((tag, body)) if tag.trim().eq_ignore_ascii_case("json") || tag.trim().is_empty() => {
            body
        }
        _ => rest,
    };

    body.trim().strip_suffix("```").map_or(body, str::trim).trim()
}

/// Parse a raw model answer into a loosely-typed key/value object.
///
/// Fails with [`ResponseError::MalformedAnswer`] carrying the original text
/// so the caller can decide whether to fall back.
pub fn normalize(answer: &str) -> Result<Map<String, Value>, ResponseError> {
    let candidate = strip_code_fences(answer);

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(object)) => Ok(object),
        _ => Err(ResponseError::MalformedAnswer {
            raw: answer.to_string(),
        }),
    }
}
