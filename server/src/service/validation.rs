use jsonschema::Validator;
use serde_json::{Value, json};
use shared_types::FieldViolation;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The payload is not parseable JSON at all.
    #[error("Configuration data is not valid JSON: {0}")]
    MalformedPayload(String),

    #[error("Configuration data does not match required schema")]
    SchemaValidationFailed(Vec<FieldViolation>),

    #[error("Configuration schema failed to compile: {0}")]
    SchemaCompilation(String),
}

/// The one schema every stored payload conforms to.
pub fn config_data_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "max_limit": {"type": "integer", "minimum": 0},
            "enabled": {"type": "boolean"}
        },
        "required": ["max_limit", "enabled"],
        "additionalProperties": false
    })
}

/// Checks payloads against [`config_data_schema`], reporting every violation.
pub struct SchemaValidator {
    validator: Validator,
}

impl SchemaValidator {
    pub fn new() -> Result<Self, ValidationError> {
        let validator = jsonschema::validator_for(&config_data_schema())
            .map_err(|err| ValidationError::SchemaCompilation(err.to_string()))?;
        Ok(Self { validator })
    }

    /// Parses raw JSON text, then validates it.
    pub fn validate_str(&self, raw: &str) -> Result<(), ValidationError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|err| ValidationError::MalformedPayload(err.to_string()))?;
        self.validate(&value)
    }

    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let mut violations: Vec<FieldViolation> = match self.validator.validate(value) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|error| FieldViolation {
                    field: field_path(&error.instance_path.to_string()),
                    error: error.to_string(),
                })
                .collect(),
        };

        // JSON Schema counts 5.0 or 1e20 as integers; the stored shape needs a u64.
        if violations.is_empty()
            && let Some(limit) = value.get("max_limit").filter(|limit| limit.as_u64().is_none())
        {
            violations.push(FieldViolation {
                field: "/max_limit".to_string(),
                error: format!("{limit} is not representable as an unsigned 64-bit integer"),
            });
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::SchemaValidationFailed(violations))
        }
    }
}

fn field_path(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}
