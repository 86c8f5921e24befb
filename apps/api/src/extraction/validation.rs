//! Strict conversion of raw model output into a `ResumeRecord`.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::extraction::schema::{FieldKind, FieldSpec};
use crate::models::resume::ResumeRecord;

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("model output is not a JSON object")]
    NotAnObject,

    #[error("field '{field}' has the wrong type: expected {expected}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },
}

/// Builds a record from model output.
///
/// Missing keys and nulls become defaults, unknown keys are ignored, and
/// values of the wrong JSON type fail the whole record. Integers outside the
/// declared range are dropped rather than propagated.
pub fn record_from_model_output(
    fields: &[FieldSpec],
    output: &Value,
) -> Result<ResumeRecord, RecordError> {
    let object = output.as_object().ok_or(RecordError::NotAnObject)?;
    log_unknown_keys(fields, object);

    let mut record = ResumeRecord::default();

    for field in fields {
        let raw = object.get(field.name).filter(|v| !v.is_null());

        let accepted = match field.kind {
            FieldKind::Text => record.set_text(field.name, text_value(field, raw)?),
            FieldKind::Integer { min, max } => {
                record.set_integer(field.name, integer_value(field, raw, min, max)?)
            }
            FieldKind::TextList => record.set_list(field.name, list_value(field, raw)?),
        };

        if !accepted {
            warn!("Schema field '{}' has no slot on ResumeRecord", field.name);
        }
    }

    Ok(record)
}

fn text_value(field: &FieldSpec, raw: Option<&Value>) -> Result<Option<String>, RecordError> {
    match raw {
        None => Ok(None),
        Some(Value::String(s)) => Ok(non_blank(s)),
        Some(_) => Err(mismatch(field, "string")),
    }
}

fn integer_value(
    field: &FieldSpec,
    raw: Option<&Value>,
    min: i64,
    max: Option<i64>,
) -> Result<Option<i64>, RecordError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let number = match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        _ => None,
    };
    let number = number.ok_or_else(|| mismatch(field, "integer"))?;

    let in_range = number >= min && max.map_or(true, |max| number <= max);
    if !in_range {
        warn!(
            "Dropping out-of-range value {} for '{}' (allowed {}..={})",
            number,
            field.name,
            min,
            max.map_or_else(|| "inf".to_string(), |m| m.to_string())
        );
        return Ok(None);
    }

    Ok(Some(number))
}

fn list_value(field: &FieldSpec, raw: Option<&Value>) -> Result<Vec<String>, RecordError> {
    let Some(raw) = raw else {
        return Ok(vec![]);
    };
    let items = raw
        .as_array()
        .ok_or_else(|| mismatch(field, "list of strings"))?;

    items
        .iter()
        .filter(|item| !item.is_null())
        .map(|item| {
            item.as_str()
                .ok_or_else(|| mismatch(field, "list of strings"))
                .map(non_blank)
        })
        .filter_map(Result::transpose)
        .collect()
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn mismatch(field: &FieldSpec, expected: &'static str) -> RecordError {
    RecordError::TypeMismatch {
        field: field.name,
        expected,
    }
}

fn log_unknown_keys(fields: &[FieldSpec], object: &Map<String, Value>) {
    for key in object.keys() {
        if !fields.iter().any(|f| f.name == key.as_str()) {
            debug!("Ignoring unknown key '{key}' in model output");
        }
    }
}
