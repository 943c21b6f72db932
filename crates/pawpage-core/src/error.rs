#![forbid(unsafe_code)]

//! Configuration errors.
//!
//! Runtime page behavior never fails: a missing element disables the
//! matching feature. The only errors are a host-supplied configuration that
//! does not parse or does not make sense.

use std::fmt;

/// Invalid page configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The JSON document did not parse, or a selector inside it was invalid.
    Json(String),
    /// The form has no required fields.
    NoRequiredFields,
    /// A required field name is empty.
    EmptyFieldName { index: usize },
    /// A field name cannot be embedded in a `[name="..."]` selector.
    InvalidFieldName { value: String },
    /// A single class token is empty or contains whitespace.
    InvalidClassToken { key: &'static str, value: String },
    /// An attribute name is empty or contains whitespace.
    InvalidAttributeName { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "invalid config json: {msg}"),
            Self::NoRequiredFields => write!(f, "form.requiredFields must not be empty"),
            Self::EmptyFieldName { index } => {
                write!(f, "form.requiredFields[{index}] is empty")
            }
            Self::InvalidFieldName { value } => {
                write!(f, "field name {value:?} may not contain quotes or backslashes")
            }
            Self::InvalidClassToken { key, value } => {
                write!(f, "{key} must be a single class name, got {value:?}")
            }
            Self::InvalidAttributeName { key, value } => {
                write!(f, "{key} must be an attribute name, got {value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
