//! Assessment report shown to the operator

use chrono::{DateTime, Utc};
use inference_engine::{Label, PredictionResult};
use serde::Serialize;
use uuid::Uuid;

/// Text shown in place of a probability the model cannot provide
pub const PROBABILITY_UNAVAILABLE: &str = "not available";

/// Canned guidance attached to a label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub summary: &'static str,
    pub details: &'static [&'static str],
}

static POSITIVE_RECOMMENDATION: Recommendation = Recommendation {
    summary: "The model predicts a high likelihood of PCOS.",
    details: &[
        "Consult a gynecologist for a pelvic ultrasound.",
        "Review the hormonal profile (FSH, LH, testosterone).",
        "Monitor lifestyle factors (diet and exercise).",
    ],
};

static NEGATIVE_RECOMMENDATION: Recommendation = Recommendation {
    summary: "The model predicts a low likelihood of PCOS.",
    details: &[
        "While the risk is low, please maintain a healthy lifestyle. If symptoms persist, consult a doctor.",
    ],
};

impl Recommendation {
    pub fn for_label(label: Label) -> &'static Recommendation {
        match label {
            Label::Positive => &POSITIVE_RECOMMENDATION,
            Label::Negative => &NEGATIVE_RECOMMENDATION,
        }
    }
}

/// Probability as a one-decimal percentage, or the unavailable marker
pub fn format_probability(probability: Option<f64>) -> String {
    match probability {
        Some(p) => format!("{:.1}%", p * 100.0),
        None => PROBABILITY_UNAVAILABLE.to_string(),
    }
}

/// Result of one submission
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentReport {
    pub submission_id: Uuid,
    pub assessed_at: DateTime<Utc>,
    pub label: Label,
    /// "RESULT: POSITIVE" / "RESULT: NEGATIVE"
    pub headline: String,
    pub probability: Option<f64>,
    pub probability_display: String,
    pub recommendation: &'static Recommendation,
    pub latency_ms: u64,
}

impl AssessmentReport {
    pub fn new(submission_id: Uuid, result: &PredictionResult) -> Self {
        Self {
            submission_id,
            assessed_at: Utc::now(),
            label: result.label,
            headline: format!("RESULT: {}", result.label.as_str()),
            probability: result.probability,
            probability_display: format_probability(result.probability),
            recommendation: Recommendation::for_label(result.label),
            latency_ms: result.latency_ms,
        }
    }
}
