//! Error types for symbol conversion

use serde_json::Value;
use thiserror::Error;

/// Structural violation of the ESRI JSON contract.
///
/// Missing fields never produce this error; only fields that are present with
/// the wrong JSON type do.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// A field held a JSON value of the wrong type
    #[error("field '{key}': expected {expected}, found {found}")]
    UnexpectedType { key: String, expected: &'static str, found: &'static str },
}

impl ConvertError {
    pub fn unexpected(key: &str, expected: &'static str, found: &Value) -> Self {
        ConvertError::UnexpectedType { key: key.to_string(), expected, found: json_type_name(found) }
    }
}

/// Human-readable JSON type of a value.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
