//! Feature Assembly Error Types

use thiserror::Error;

/// Errors while turning raw operator input into a feature vector
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// Fallback text field could not be read as a number
    #[error("{field} is not a number: {text:?}")]
    MalformedNumericField { field: &'static str, text: String },

    /// Key not present in the schema
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Raw value does not fit the field's kind
    #[error("{field} expects a {expected} value, got {actual}")]
    UnexpectedValue {
        field: &'static str,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Schema consistency errors detected at startup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Predictor expects a different number of columns
    #[error("Schema has {actual} columns but the predictor expects {expected}")]
    ColumnCount { expected: usize, actual: usize },

    /// Same column declared twice
    #[error("Duplicate field in schema: {0}")]
    DuplicateField(&'static str),
}
