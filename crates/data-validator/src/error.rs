//! Validation Error Types

use serde::Serialize;
use thiserror::Error;

/// Problems with a single submitted field
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum ValidationError {
    /// Choice outside the options the form offers
    #[error("{field}: {value:?} is not one of {allowed:?}")]
    InvalidChoice {
        field: &'static str,
        value: String,
        allowed: [&'static str; 2],
    },

    /// Numeric field that is not a finite decimal
    #[error("{field}: {value:?} is not a valid number")]
    InvalidNumber { field: &'static str, value: String },

    /// Free text longer than the form accepts
    #[error("{field}: text exceeds {max} characters")]
    TextTooLong { field: &'static str, max: usize },

    /// Field name not part of the schema
    #[error("Unknown field: {field}")]
    UnknownField { field: String },
}

impl ValidationError {
    /// Field the error refers to
    pub fn field(&self) -> &str {
        match self {
            ValidationError::InvalidChoice { field, .. }
            | ValidationError::InvalidNumber { field, .. }
            | ValidationError::TextTooLong { field, .. } => field,
            ValidationError::UnknownField { field } => field,
        }
    }
}
