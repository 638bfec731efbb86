//! Field mapping from a loosely-typed model answer onto the canonical record.
//!
//! The mapper is total over any JSON object: unknown keys are ignored,
//! missing fields take their kind default, and a value that cannot be
//! coerced becomes a default plus a warning, never a hard failure.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::ExtractionConfig;
use crate::error::ResponseError;
use crate::record::{FieldValue, InventoryRecord};
use crate::schema::{self, FieldKind, FieldSpec};

/// Map a normalized key/value structure into a canonical record.
///
/// Returns the record together with one warning per field-local coercion
/// failure. Pure: the same input always yields the same record.
pub fn map_record(
    parsed: &Map<String, Value>,
    config: &ExtractionConfig,
) -> (InventoryRecord, Vec<String>) {
    let mut record = InventoryRecord::default();
    let mut warnings = Vec::new();

    for spec in schema::fields() {
        let Some(value) = lookup(parsed, spec) else {
            continue;
        };

        match coerce(spec, value, config) {
            Ok(coerced) => {
                // Registry ids always resolve; set cannot fail here.
                let _ = record.set(spec.id, coerced);
            }
            Err(ResponseError::Validation { field, reason }) => {
                debug!(field = %field, reason = %reason, "field coercion failed, using default");
                warnings.push(format!("{field}: {reason}, using default"));
            }
            Err(_) => unreachable!("coercion only reports validation errors"),
        }
    }

    (record, warnings)
}

/// Find the value for a field under any of its label variants, or under the
/// canonical id itself. JSON null counts as absent: the model is told to use
/// null for unknown fields.
fn lookup<'a>(parsed: &'a Map<String, Value>, spec: &FieldSpec) -> Option<&'a Value> {
    spec.labels
        .iter()
        .copied()
        .chain(std::iter::once(spec.id))
        .find_map(|key| parsed.get(key))
        .filter(|value| !value.is_null())
}

fn coerce(
    spec: &FieldSpec,
    value: &Value,
    config: &ExtractionConfig,
) -> Result<FieldValue, ResponseError> {
    match spec.kind {
        FieldKind::Text => coerce_text(spec, value, config),
        FieldKind::Number => coerce_number(spec, value),
    }
}

fn coerce_text(
    spec: &FieldSpec,
    value: &Value,
    config: &ExtractionConfig,
) -> Result<FieldValue, ResponseError> {
    let text = match value {
        Value::String(s) => s.clone(),
        // Models sometimes answer numeric-looking text fields as numbers.
        Value::Number(n) => n.to_string(),
        other => {
            return Err(ResponseError::Validation {
                field: spec.id.to_string(),
                reason: format!("expected text, got {}", value_kind_name(other)),
            });
        }
    };

    let text = match spec.id {
        "correspondenceAddress" | "shippingAddress" => collapse_whitespace(&text),
        "orderDate" if config.normalize_dates => normalize_date(&text),
        _ => text.trim().to_string(),
    };

    Ok(FieldValue::Text(text))
}

fn coerce_number(spec: &FieldSpec, value: &Value) -> Result<FieldValue, ResponseError> {
    match value {
        Value::Number(n) => Ok(FieldValue::Number(n.as_f64().unwrap_or(0.0))),
        Value::String(s) => parse_number(s).map(FieldValue::Number).ok_or_else(|| {
            ResponseError::Validation {
                field: spec.id.to_string(),
                reason: format!("could not parse {s:?} as a number"),
            }
        }),
        other => Err(ResponseError::Validation {
            field: spec.id.to_string(),
            reason: format!("expected number, got {}", value_kind_name(other)),
        }),
    }
}

/// Parse a number out of free text, stripping currency symbols, thousands
/// separators, percent signs and whitespace first. Returns `None` when the
/// residue is not numeric.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse().ok()
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reformat a date to DD/MM/YYYY when the text is unambiguously parseable;
/// otherwise preserve the extracted text verbatim rather than guess.
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();

    const FORMATS: [&str; 5] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d", "%Y/%m/%d"];

    for format in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.format("%d/%m/%Y").to_string();
        }
    }

    trimmed.to_string()
}

fn value_kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
