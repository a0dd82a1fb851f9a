//! Metrics Routes

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::AppState;

/// Submission counter, labelled by outcome
pub const SUBMISSIONS_TOTAL: &str = "pcos_submissions_total";

/// Inference latency histogram (seconds)
pub const INFERENCE_SECONDS: &str = "pcos_inference_seconds";

/// Prometheus exposition
pub async fn render(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}

/// Count one finished submission
pub fn record_outcome(outcome: &'static str) {
    metrics::counter!(SUBMISSIONS_TOTAL, "outcome" => outcome).increment(1);
}
