//! Predictor Boundary

use crate::InferenceError;
use feature_engine::{FeatureVector, FEATURE_DIMENSION};
use std::path::Path;
use tracing::{debug, info};
use tract_onnx::prelude::*;
use tract_onnx::tract_hir::infer::Factoid;
use tract_onnx::tract_hir::internal::DimLike;

/// Class identifier as emitted by the trained classifier
pub type ClassId = i64;

/// Label and scores from a single predictor call.
///
/// A scoring failure stays inside `scores` so the label can still be used.
#[derive(Debug)]
pub struct RawPrediction {
    pub class: ClassId,
    pub scores: Result<Option<Vec<f64>>, InferenceError>,
}

/// A trained classifier consuming one positional feature row.
///
/// Scoring is optional: `predict_scores` returning `Ok(None)` means the
/// artifact has no probability output.
pub trait Predictor: Send + Sync {
    /// Predicted class for one row
    fn predict(&self, features: &FeatureVector) -> Result<ClassId, InferenceError>;

    /// Label and scores together. Predictors that produce both from one
    /// model run should override this.
    fn infer(&self, features: &FeatureVector) -> Result<RawPrediction, InferenceError> {
        let class = self.predict(features)?;
        Ok(RawPrediction {
            class,
            scores: self.predict_scores(features),
        })
    }

    /// Per-class probabilities in the artifact's class order
    fn predict_scores(&self, features: &FeatureVector) -> Result<Option<Vec<f64>>, InferenceError> {
        let _ = features;
        Ok(None)
    }

    /// Number of input columns the artifact declares, if known
    fn input_width(&self) -> Option<usize> {
        None
    }

    /// Number of classes in the probability output, if known
    fn class_count(&self) -> Option<usize> {
        None
    }
}

type OnnxPlan = TypedRunnableModel<TypedModel>;

/// Predictor backed by an ONNX export of the trained pipeline.
///
/// Output 0 carries the class label, output 1 (when present) the class
/// probabilities.
pub struct OnnxPredictor {
    plan: OnnxPlan,
    input_width: Option<usize>,
    class_count: Option<usize>,
    has_scores: bool,
}

impl OnnxPredictor {
    /// Load and optimize the model at `path`
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        if !path.is_file() {
            return Err(InferenceError::ModelNotFound(path.to_path_buf()));
        }

        info!("Loading ONNX model from {}", path.display());

        let model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(load_error)?;

        // Width as declared by the artifact, before we pin the input shape.
        // The batch axis is usually symbolic, so only the last axis counts.
        let input_width = model
            .input_fact(0)
            .map_err(load_error)?
            .shape
            .dims()
            .last()
            .and_then(|d| d.concretize())
            .and_then(|d| d.to_usize().ok());

        if let Some(width) = input_width {
            if width != FEATURE_DIMENSION {
                return Err(InferenceError::SchemaMismatch(
                    feature_engine::SchemaError::ColumnCount {
                        expected: width,
                        actual: FEATURE_DIMENSION,
                    },
                ));
            }
        }

        let plan = model
            .with_input_fact(0, f32::fact([1, FEATURE_DIMENSION]).into())
            .map_err(load_error)?
            .into_optimized()
            .map_err(load_error)?
            .into_runnable()
            .map_err(load_error)?;

        let outputs = plan.model().outputs.len();
        let has_scores = outputs > 1;
        let class_count = if has_scores {
            plan.model()
                .output_fact(1)
                .ok()
                .and_then(|fact| fact.shape.as_concrete().and_then(|dims| dims.last().copied()))
        } else {
            None
        };

        info!(
            "Model loaded: inputs={:?}, outputs={}, classes={:?}",
            input_width, outputs, class_count
        );

        Ok(Self {
            plan,
            input_width,
            class_count,
            has_scores,
        })
    }

    fn run(&self, features: &FeatureVector) -> Result<TVec<TValue>, InferenceError> {
        if features.len() != FEATURE_DIMENSION {
            return Err(InferenceError::InvalidInputShape {
                expected: FEATURE_DIMENSION,
                actual: features.len(),
            });
        }

        let row = features.to_f32_row();
        let input = Tensor::from_shape(&[1, FEATURE_DIMENSION], &row).map_err(invocation_error)?;
        self.plan.run(tvec!(input.into())).map_err(invocation_error)
    }

    fn decode_label(outputs: &[TValue]) -> Result<ClassId, InferenceError> {
        let label = outputs[0].cast_to::<i64>().map_err(invocation_error)?;
        let class = label
            .as_slice::<i64>()
            .map_err(invocation_error)?
            .first()
            .copied()
            .ok_or_else(|| InferenceError::PredictionInvocation("empty label output".to_string()))?;

        debug!("Model predicted class {}", class);
        Ok(class)
    }

    fn decode_scores(&self, outputs: &[TValue]) -> Result<Option<Vec<f64>>, InferenceError> {
        if !self.has_scores {
            return Ok(None);
        }

        let scores = outputs[1].cast_to::<f32>().map_err(invocation_error)?;
        let scores = scores
            .as_slice::<f32>()
            .map_err(invocation_error)?
            .iter()
            .map(|&p| p as f64)
            .collect();

        Ok(Some(scores))
    }
}

impl Predictor for OnnxPredictor {
    fn predict(&self, features: &FeatureVector) -> Result<ClassId, InferenceError> {
        let outputs = self.run(features)?;
        Self::decode_label(&outputs)
    }

    fn predict_scores(&self, features: &FeatureVector) -> Result<Option<Vec<f64>>, InferenceError> {
        if !self.has_scores {
            return Ok(None);
        }
        let outputs = self.run(features)?;
        self.decode_scores(&outputs)
    }

    fn infer(&self, features: &FeatureVector) -> Result<RawPrediction, InferenceError> {
        let outputs = self.run(features)?;
        Ok(RawPrediction {
            class: Self::decode_label(&outputs)?,
            scores: self.decode_scores(&outputs),
        })
    }

    fn input_width(&self) -> Option<usize> {
        self.input_width
    }

    fn class_count(&self) -> Option<usize> {
        self.class_count
    }
}

fn load_error(e: TractError) -> InferenceError {
    InferenceError::ModelLoadError(format!("{:#}", e))
}

fn invocation_error(e: TractError) -> InferenceError {
    InferenceError::PredictionInvocation(format!("{:#}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_model_file() {
        let err = OnnxPredictor::load(Path::new("/nonexistent/pcos_pipeline_v3.onnx")).err().unwrap();
        assert!(matches!(err, InferenceError::ModelNotFound(_)));
    }

    #[test]
    fn test_corrupt_model_file() {
        let path = scratch_file("corrupt.onnx", b"this is a pickle, not a protobuf");
        let err = OnnxPredictor::load(&path).err().unwrap();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, InferenceError::ModelLoadError(_)));
    }

    struct LabelOnly;

    impl Predictor for LabelOnly {
        fn predict(&self, _features: &FeatureVector) -> Result<ClassId, InferenceError> {
            Ok(0)
        }
    }

    #[test]
    fn test_scoring_declined_by_default() {
        let features = FeatureVector::default_row();
        assert_eq!(LabelOnly.predict_scores(&features).unwrap(), None);
        assert_eq!(LabelOnly.input_width(), None);
    }
}
