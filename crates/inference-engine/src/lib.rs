//! ONNX Inference Engine
//!
//! Loads the externally trained PCOS pipeline once at startup and turns
//! feature vectors into labelled risk predictions.

mod engine;
mod model;
mod predictor;

pub use engine::{InferenceEngine, Label, LabelConfig, PredictionResult};
pub use model::{ModelConfig, ModelHandle, ModelStatus};
pub use predictor::{ClassId, OnnxPredictor, Predictor, RawPrediction};

use feature_engine::SchemaError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors during model loading and inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model file not found: {}", .0.display())]
    ModelNotFound(PathBuf),
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Model does not match the feature schema: {0}")]
    SchemaMismatch(#[from] SchemaError),
    #[error("Invalid label configuration: {0}")]
    InvalidLabelConfig(String),
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("Invalid input shape: expected {expected} columns, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
    #[error("Prediction failed: {0}")]
    PredictionInvocation(String),
}
