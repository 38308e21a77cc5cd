//! Validation of uploaded inventory documents

mod document;

pub use document::{ApplicationEntry, InstanceDocument};

use serde_json::{Map, Value};

use crate::config::IngestConfig;
use crate::ValidationError;

/// Top-level fields every document must carry, checked in this order
pub const REQUIRED_FIELDS: [&str; 3] = ["instance_id", "instance_name", "applications"];

/// Validator turning raw upload bytes into an [`InstanceDocument`]
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator {
    /// Largest accepted buffer in bytes, 0 for no limit
    max_bytes: usize,
}

impl SchemaValidator {
    /// Create a validator without a size limit
    pub fn new() -> Self {
        Self { max_bytes: 0 }
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        Self::new().with_max_bytes(config.max_file_bytes)
    }

    /// Reject buffers above `limit` bytes (0 disables the check)
    pub fn with_max_bytes(mut self, limit: usize) -> Self {
        self.max_bytes = limit;
        self
    }

    /// Check shape and types, returning the typed document
    ///
    /// The first problem found is reported. Top-level fields are checked in
    /// [`REQUIRED_FIELDS`] order, then each application in list order.
    pub fn validate(&self, raw: &[u8]) -> Result<InstanceDocument, ValidationError> {
        if raw.is_empty() {
            return Err(ValidationError::EmptyInput);
        }
        if self.max_bytes > 0 && raw.len() > self.max_bytes {
            return Err(ValidationError::TooLarge {
                size: raw.len(),
                limit: self.max_bytes,
            });
        }

        let value: Value = serde_json::from_slice(raw).map_err(|e| ValidationError::MalformedJson {
            line: e.line(),
            message: parser_message(&e),
        })?;

        let Value::Object(root) = value else {
            return Err(ValidationError::InvalidType {
                field: "document",
                expected: "object",
            });
        };

        if let Some(missing) = REQUIRED_FIELDS.iter().find(|field| !root.contains_key(**field)) {
            return Err(ValidationError::MissingField(*missing));
        }

        let instance_id = required_string(&root, "instance_id")?;
        let instance_name = required_string(&root, "instance_name")?;

        let Some(Value::Array(entries)) = root.get("applications") else {
            return Err(ValidationError::InvalidType {
                field: "applications",
                expected: "list",
            });
        };
        if entries.is_empty() {
            return Err(ValidationError::EmptyList("applications"));
        }

        let applications = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| application_entry(index, entry))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(InstanceDocument {
            instance_id,
            instance_name,
            script_version: root.get("script_version").and_then(text_of),
            applications,
        })
    }
}

/// Validate with default settings
pub fn validate(raw: &[u8]) -> Result<InstanceDocument, ValidationError> {
    SchemaValidator::new().validate(raw)
}

/// serde_json appends " at line L column C"; the line is reported separately
fn parser_message(error: &serde_json::Error) -> String {
    let full = error.to_string();
    match full.rfind(" at line ") {
        Some(idx) => full[..idx].to_string(),
        None => full,
    }
}

fn required_string(root: &Map<String, Value>, field: &'static str) -> Result<String, ValidationError> {
    match root.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        _ => Err(ValidationError::InvalidType {
            field,
            expected: "non-empty string",
        }),
    }
}

fn application_entry(index: usize, value: &Value) -> Result<ApplicationEntry, ValidationError> {
    let Value::Object(entry) = value else {
        return Err(ValidationError::InvalidApplicationEntry(index));
    };
    if !entry.contains_key("name") {
        return Err(ValidationError::MissingApplicationField { index, field: "name" });
    }

    let text = |key: &str| entry.get(key).and_then(text_of);
    Ok(ApplicationEntry {
        name: text("name"),
        app_type: text("type"),
        status: text("status"),
        image: text("image"),
        ports: entry.get("ports").map(sequence_of).unwrap_or_default(),
        pids: entry.get("pids").map(sequence_of).unwrap_or_default(),
        process_name: text("process_name"),
        container_id: text("container_id"),
    })
}

/// Scalar attribute as text; `null` counts as absent
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Port/pid list as element texts; a lone scalar is a one-element list
fn sequence_of(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(text_of).collect(),
        other => text_of(other).into_iter().collect(),
    }
}
