//! Submission Validation
//!
//! Constrains operator input at the edge so the feature builder only ever
//! sees values of the right shape.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{ValidationConfig, ValidationReport, Validator};
