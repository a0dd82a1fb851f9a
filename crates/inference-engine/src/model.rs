//! Model Lifecycle
//!
//! The model is loaded once at process start. A load failure never stops
//! the process; it leaves the handle in the unavailable state and every
//! submission is refused.

use crate::engine::{InferenceEngine, LabelConfig};
use crate::predictor::{OnnxPredictor, Predictor};
use crate::InferenceError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the ONNX export of the trained pipeline
    pub path: PathBuf,
    /// Class id that means a positive finding
    pub positive_class: i64,
    /// Class ids in probability column order
    pub classes: Vec<i64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let labels = LabelConfig::default();
        Self {
            path: PathBuf::from("models/pcos_pipeline_v3.onnx"),
            positive_class: labels.positive_class,
            classes: labels.classes,
        }
    }
}

impl ModelConfig {
    pub fn label_config(&self) -> LabelConfig {
        LabelConfig {
            positive_class: self.positive_class,
            classes: self.classes.clone(),
        }
    }
}

/// Whether a model is available to serve submissions
#[derive(Debug)]
pub enum ModelStatus {
    Ready(InferenceEngine),
    Unavailable { reason: String },
}

/// Process-wide handle to the loaded model
#[derive(Debug)]
pub struct ModelHandle {
    path: PathBuf,
    status: ModelStatus,
}

impl ModelHandle {
    /// Load the configured artifact, degrading to the unavailable state on
    /// any failure.
    pub fn load(config: &ModelConfig) -> Self {
        let engine = OnnxPredictor::load(&config.path).and_then(|predictor| {
            InferenceEngine::new(Box::new(predictor), config.label_config())
        });
        Self::from_result(&config.path, engine)
    }

    /// Wrap an already constructed predictor, with the same checks as
    /// [`ModelHandle::load`]
    pub fn from_predictor(
        path: impl AsRef<Path>,
        predictor: Box<dyn Predictor>,
        labels: LabelConfig,
    ) -> Self {
        Self::from_result(path.as_ref(), InferenceEngine::new(predictor, labels))
    }

    /// Handle that refuses every submission
    pub fn unavailable(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            status: ModelStatus::Unavailable {
                reason: reason.into(),
            },
        }
    }

    fn from_result(path: &Path, engine: Result<InferenceEngine, InferenceError>) -> Self {
        let status = match engine {
            Ok(engine) => {
                info!("Model ready: {}", path.display());
                ModelStatus::Ready(engine)
            }
            Err(e) => {
                error!("Model unavailable ({}): {}", path.display(), e);
                ModelStatus::Unavailable {
                    reason: e.to_string(),
                }
            }
        };

        Self {
            path: path.to_path_buf(),
            status,
        }
    }

    /// Engine to serve a submission, or `ModelUnavailable`
    pub fn engine(&self) -> Result<&InferenceEngine, InferenceError> {
        match &self.status {
            ModelStatus::Ready(engine) => Ok(engine),
            ModelStatus::Unavailable { reason } => {
                Err(InferenceError::ModelUnavailable(reason.clone()))
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.status, ModelStatus::Ready(_))
    }

    /// Why the model could not be loaded
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.status {
            ModelStatus::Ready(_) => None,
            ModelStatus::Unavailable { reason } => Some(reason.as_str()),
        }
    }

    pub fn status(&self) -> &ModelStatus {
        &self.status
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::ClassId;
    use feature_engine::FeatureVector;

    struct AlwaysNegative;

    impl Predictor for AlwaysNegative {
        fn predict(&self, _features: &FeatureVector) -> Result<ClassId, InferenceError> {
            Ok(0)
        }
    }

    #[test]
    fn test_missing_artifact_disables_model() {
        let config = ModelConfig {
            path: PathBuf::from("/nonexistent/pcos_pipeline_v3.onnx"),
            ..Default::default()
        };

        let handle = ModelHandle::load(&config);
        assert!(!handle.is_available());
        assert!(handle.unavailable_reason().unwrap().contains("not found"));
        assert!(matches!(handle.engine(), Err(InferenceError::ModelUnavailable(_))));
    }

    #[test]
    fn test_invalid_labels_disable_model() {
        let labels = LabelConfig {
            positive_class: 5,
            classes: vec![0, 1],
        };
        let handle = ModelHandle::from_predictor("stub.onnx", Box::new(AlwaysNegative), labels);
        assert!(!handle.is_available());
        assert!(handle.unavailable_reason().unwrap().contains("positive class 5"));
    }

    #[test]
    fn test_ready_handle() {
        let handle =
            ModelHandle::from_predictor("stub.onnx", Box::new(AlwaysNegative), LabelConfig::default());
        assert!(handle.is_available());
        assert_eq!(handle.path(), Path::new("stub.onnx"));

        let result = handle.engine().unwrap().assess(&FeatureVector::default_row()).unwrap();
        assert!(!result.label.is_positive());
    }

    #[test]
    fn test_default_config() {
        let config = ModelConfig::default();
        assert_eq!(config.path, PathBuf::from("models/pcos_pipeline_v3.onnx"));
        assert_eq!(config.label_config(), LabelConfig::default());
    }
}
