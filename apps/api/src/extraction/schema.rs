//! The declared shape of a `ResumeRecord`.
//!
//! One table drives three things: the JSON schema sent to the model, strict
//! validation of what comes back, and the CSV column order.

use std::collections::HashSet;

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::models::resume::{FieldValue, ResumeRecord};

pub const FILE_NAME_COLUMN: &str = "file_name";
pub const STATUS_COLUMN: &str = "extraction_status";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer { min: i64, max: Option<i64> },
    TextList,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Per-field extraction instruction, sent to the model as the field description.
    pub hint: &'static str,
}

const fn text(name: &'static str, hint: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Text,
        required: false,
        hint,
    }
}

const fn list(name: &'static str, hint: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::TextList,
        required: true,
        hint,
    }
}

const fn integer(name: &'static str, min: i64, max: Option<i64>, hint: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Integer { min, max },
        required: false,
        hint,
    }
}

pub const LINKS_HINT: &str = "Extract and return all URLs and link-like text found in the resume, \
    including LinkedIn, GitHub, Kaggle, portfolio websites, personal domains, \
    and any visible http/https or www links. Return only valid link strings.";

pub const RESUME_FIELDS: &[FieldSpec] = &[
    text("fullname", "Full name of the candidate."),
    text("email", "Primary email address."),
    text("phone", "Primary phone number as written."),
    text("location", "City, region or country the candidate is based in."),
    FieldSpec {
        name: "summary",
        kind: FieldKind::Text,
        required: true,
        hint: "Two or three sentence professional summary of the candidate.",
    },
    text("current_role", "Most recent or current job title."),
    integer("experience", 0, None, "Total years of professional experience."),
    list("skills", "All skills mentioned, technical and non-technical."),
    list("programming_languages", "Programming languages the candidate uses."),
    list("frameworks_tools", "Frameworks, libraries and tools."),
    list("databases", "Database systems."),
    list("companies", "Employers, most recent first."),
    list("job_titles", "Job titles held, most recent first."),
    list("responsibilities", "Key responsibilities and achievements."),
    text("highest_education", "Highest education level reached, e.g. Bachelor's, Master's, PhD."),
    text("degree", "Name of the highest degree and its field."),
    text("institution", "Institution that awarded the highest degree."),
    integer("graduation_year", 0, None, "Year the highest degree was completed."),
    list("projects", "Project names or one-line descriptions."),
    list("project_domains", "Domains the projects belong to, e.g. fintech, healthcare."),
    list("certifications", "Certifications and licenses."),
    list("links", LINKS_HINT),
    list("keywords", "Keywords an applicant tracking system would match on."),
    text("role_fit", "Short label of the best-fitting role, e.g. Data Analyst, AI Engineer."),
    integer(
        "ats_score",
        0,
        Some(100),
        "Applicant tracking system compatibility score from 0 to 100.",
    ),
];

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("schema declares no fields")]
    Empty,

    #[error("field at position {0} has a blank name")]
    BlankName(usize),

    #[error("field '{0}' is declared more than once")]
    Duplicate(&'static str),

    #[error("field '{0}' is reserved for provenance")]
    Reserved(&'static str),

    #[error("field '{0}' has no extraction hint")]
    MissingHint(&'static str),

    #[error("field '{0}' is not a {1} field on ResumeRecord")]
    RecordMismatch(&'static str, &'static str),

    #[error("field '{name}' must be bounded to [{min}, {max}]")]
    Bounds {
        name: &'static str,
        min: i64,
        max: i64,
    },
}

/// Checks a field table before it is used. Run once at startup.
pub fn validate(fields: &[FieldSpec]) -> Result<(), SchemaError> {
    if fields.is_empty() {
        return Err(SchemaError::Empty);
    }

    let blank = ResumeRecord::default();
    let mut seen = HashSet::new();

    for (idx, field) in fields.iter().enumerate() {
        if field.name.trim().is_empty() {
            return Err(SchemaError::BlankName(idx));
        }
        if field.name == FILE_NAME_COLUMN || field.name == STATUS_COLUMN {
            return Err(SchemaError::Reserved(field.name));
        }
        if !seen.insert(field.name) {
            return Err(SchemaError::Duplicate(field.name));
        }
        if field.hint.trim().is_empty() {
            return Err(SchemaError::MissingHint(field.name));
        }

        let kind_matches = matches!(
            (field.kind, blank.field(field.name)),
            (FieldKind::Text, Some(FieldValue::Text(_)))
                | (FieldKind::Integer { .. }, Some(FieldValue::Integer(_)))
                | (FieldKind::TextList, Some(FieldValue::List(_)))
        );
        if !kind_matches {
            return Err(SchemaError::RecordMismatch(field.name, kind_label(field.kind)));
        }
    }

    if let Some(score) = fields.iter().find(|f| f.name == "ats_score") {
        if score.kind != (FieldKind::Integer { min: 0, max: Some(100) }) {
            return Err(SchemaError::Bounds {
                name: score.name,
                min: 0,
                max: 100,
            });
        }
    }

    Ok(())
}

fn kind_label(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "text",
        FieldKind::Integer { .. } => "integer",
        FieldKind::TextList => "list",
    }
}

/// Renders the field table as a JSON schema object for the model's tool definition.
pub fn to_json_schema(fields: &[FieldSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in fields {
        let mut property = match field.kind {
            FieldKind::Text if field.required => json!({ "type": "string" }),
            FieldKind::Text => json!({ "type": ["string", "null"] }),
            FieldKind::Integer { min, max } => {
                let mut p = json!({ "type": ["integer", "null"], "minimum": min });
                if let Some(max) = max {
                    p["maximum"] = json!(max);
                }
                p
            }
            FieldKind::TextList => json!({ "type": "array", "items": { "type": "string" } }),
        };
        property["description"] = json!(field.hint);
        properties.insert(field.name.to_string(), property);

        if field.required {
            required.push(field.name);
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// CSV column order: schema fields, then provenance.
pub fn csv_headers(fields: &[FieldSpec]) -> Vec<&'static str> {
    fields
        .iter()
        .map(|f| f.name)
        .chain([FILE_NAME_COLUMN, STATUS_COLUMN])
        .collect()
}
