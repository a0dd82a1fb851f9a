//! API Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use data_validator::{ValidationError, ValidationReport};
use feature_engine::BuildError;
use inference_engine::InferenceError;
use serde::Serialize;
use thiserror::Error;

/// Generic text shown when the predictor fails
pub const PREDICTION_FAILED_MESSAGE: &str =
    "An error occurred during prediction. The submission was discarded.";

/// Errors that end a submission
#[derive(Debug, Error)]
pub enum ApiError {
    /// Model missing or rejected at startup
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Submitted fields failed edge validation
    #[error("Invalid submission: {0}")]
    InvalidSubmission(ValidationReport),

    /// Feature vector could not be built
    #[error("{0}")]
    Build(#[from] BuildError),

    /// Predictor call failed; details are logged, not returned
    #[error("Prediction failed")]
    PredictionFailed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InvalidSubmission(_) | ApiError::Build(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::PredictionFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::ModelUnavailable(_) => "model_unavailable",
            ApiError::InvalidSubmission(_) => "invalid_submission",
            ApiError::Build(BuildError::MalformedNumericField { .. }) => "malformed_numeric_field",
            ApiError::Build(_) => "invalid_submission",
            ApiError::PredictionFailed => "prediction_failed",
        }
    }

    /// Operator-facing message
    pub fn message(&self) -> String {
        match self {
            ApiError::PredictionFailed => PREDICTION_FAILED_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Per-field problems, in submission order
    pub fn field_errors(&self) -> Vec<String> {
        match self {
            ApiError::InvalidSubmission(report) => {
                report.errors.iter().map(ValidationError::to_string).collect()
            }
            ApiError::Build(e) => vec![e.to_string()],
            _ => Vec::new(),
        }
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::ModelUnavailable(reason) => ApiError::ModelUnavailable(reason),
            _ => ApiError::PredictionFailed,
        }
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.code(),
            message: self.message(),
            fields: self.field_errors(),
        };
        (self.status(), Json(body)).into_response()
    }
}
