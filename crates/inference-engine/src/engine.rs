//! Inference Engine Implementation

use crate::predictor::{ClassId, Predictor};
use crate::InferenceError;
use feature_engine::{verify_schema, FeatureVector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Risk label shown to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Positive,
    Negative,
}

impl Label {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Positive => "POSITIVE",
            Label::Negative => "NEGATIVE",
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, Label::Positive)
    }
}

/// Meaning of the artifact's class ids.
///
/// Which id is "PCOS" is a property of the trained artifact, so it is
/// configured rather than assumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Class id that means a positive finding
    pub positive_class: ClassId,
    /// Class ids in the order of the probability output columns
    pub classes: Vec<ClassId>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            positive_class: 1,
            classes: vec![0, 1],
        }
    }
}

impl LabelConfig {
    /// Check internal consistency and, when known, the artifact's class count
    pub fn validate(&self, class_count: Option<usize>) -> Result<(), InferenceError> {
        if self.classes.len() < 2 {
            return Err(InferenceError::InvalidLabelConfig(format!(
                "need at least two classes, got {:?}",
                self.classes
            )));
        }

        let unique: HashSet<_> = self.classes.iter().collect();
        if unique.len() != self.classes.len() {
            return Err(InferenceError::InvalidLabelConfig(format!(
                "duplicate class ids in {:?}",
                self.classes
            )));
        }

        if self.score_index().is_none() {
            return Err(InferenceError::InvalidLabelConfig(format!(
                "positive class {} not in {:?}",
                self.positive_class, self.classes
            )));
        }

        match class_count {
            Some(count) if count != self.classes.len() => {
                Err(InferenceError::InvalidLabelConfig(format!(
                    "model scores {} classes but {} are configured",
                    count,
                    self.classes.len()
                )))
            }
            _ => Ok(()),
        }
    }

    /// Probability column holding the positive class
    pub fn score_index(&self) -> Option<usize> {
        self.classes.iter().position(|&c| c == self.positive_class)
    }

    /// Map a predicted class id to a label
    pub fn label_for(&self, class: ClassId) -> Result<Label, InferenceError> {
        if !self.classes.contains(&class) {
            return Err(InferenceError::PredictionInvocation(format!(
                "model returned unknown class {}",
                class
            )));
        }

        Ok(if class == self.positive_class {
            Label::Positive
        } else {
            Label::Negative
        })
    }
}

/// Outcome of one assessment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Risk label
    pub label: Label,
    /// Raw class id returned by the model
    pub class_id: ClassId,
    /// Probability of the positive class, when the model scores
    pub probability: Option<f64>,
    /// Inference latency in milliseconds
    pub latency_ms: u64,
}

/// Loaded predictor plus the meaning of its labels
pub struct InferenceEngine {
    predictor: Box<dyn Predictor>,
    labels: LabelConfig,
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("labels", &self.labels)
            .field("input_width", &self.predictor.input_width())
            .finish()
    }
}

impl InferenceEngine {
    /// Create an engine, checking the predictor against the feature schema
    /// and the label configuration.
    pub fn new(predictor: Box<dyn Predictor>, labels: LabelConfig) -> Result<Self, InferenceError> {
        if let Some(width) = predictor.input_width() {
            verify_schema(width)?;
        }
        labels.validate(predictor.class_count())?;

        info!(
            "Inference engine ready: positive class {} of {:?}",
            labels.positive_class, labels.classes
        );

        Ok(Self { predictor, labels })
    }

    /// Run one feature vector through the predictor, once.
    ///
    /// A failing label prediction fails the whole assessment; a failing or
    /// unsupported score only leaves the probability empty.
    pub fn assess(&self, features: &FeatureVector) -> Result<PredictionResult, InferenceError> {
        let start = std::time::Instant::now();

        let raw = self.predictor.infer(features).map_err(|e| match e {
            InferenceError::PredictionInvocation(_) | InferenceError::InvalidInputShape { .. } => e,
            other => InferenceError::PredictionInvocation(other.to_string()),
        })?;
        let class_id = raw.class;
        let label = self.labels.label_for(class_id)?;
        let probability = self.positive_probability(raw.scores);

        let latency_ms = start.elapsed().as_millis() as u64;
        debug!(
            "Assessment: class={} label={} probability={:?} latency={}ms",
            class_id,
            label.as_str(),
            probability,
            latency_ms
        );

        Ok(PredictionResult {
            label,
            class_id,
            probability,
            latency_ms,
        })
    }

    fn positive_probability(&self, scores: Result<Option<Vec<f64>>, InferenceError>) -> Option<f64> {
        let scores = match scores {
            Ok(Some(scores)) => scores,
            Ok(None) => {
                debug!("Predictor does not provide scores");
                return None;
            }
            Err(e) => {
                warn!("Scoring failed, probability unavailable: {}", e);
                return None;
            }
        };

        let index = self.labels.score_index()?;
        match scores.get(index) {
            Some(p) if p.is_finite() => Some(p.clamp(0.0, 1.0)),
            _ => {
                warn!(
                    "Score output {:?} has no usable column {}, probability unavailable",
                    scores, index
                );
                None
            }
        }
    }

    /// Label configuration in use
    pub fn label_config(&self) -> &LabelConfig {
        &self.labels
    }
}
