//! Assessment Routes
//!
//! One submission is one validation, one feature build and one predictor
//! call. Any failure discards the whole submission.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::page;
use crate::report::AssessmentReport;
use crate::routes::metrics::{record_outcome, INFERENCE_SECONDS};
use crate::AppState;

/// A JSON field value; numbers are accepted as-is for numeric fields
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldInput {
    Text(String),
    Number(f64),
}

impl FieldInput {
    fn into_text(self) -> String {
        match self {
            FieldInput::Text(text) => text,
            FieldInput::Number(value) => value.to_string(),
        }
    }
}

/// Run one submission end to end
pub fn run_assessment<I>(state: &AppState, submission: I) -> Result<AssessmentReport, ApiError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let submission_id = Uuid::new_v4();
    let span = info_span!("submission", id = %submission_id);
    let _guard = span.enter();

    let outcome = assess(state, submission_id, submission);
    match &outcome {
        Ok(report) => {
            info!(
                "Assessment complete: {} ({})",
                report.headline, report.probability_display
            );
            record_outcome(if report.label.is_positive() { "positive" } else { "negative" });
        }
        Err(ApiError::PredictionFailed) => record_outcome("prediction_failed"),
        Err(ApiError::ModelUnavailable(_)) => {
            warn!("Submission refused: model unavailable");
            record_outcome("model_unavailable");
        }
        Err(e) => {
            info!("Submission rejected: {}", e);
            record_outcome("rejected");
        }
    }
    outcome
}

fn assess<I>(state: &AppState, submission_id: Uuid, submission: I) -> Result<AssessmentReport, ApiError>
where
    I: IntoIterator<Item = (String, String)>,
{
    // Refuse before touching the input when no model is loaded.
    let engine = state.model.engine()?;

    let inputs = state
        .validator
        .validate_submission(submission)
        .map_err(ApiError::InvalidSubmission)?;
    let features = feature_engine::build(&inputs)?;

    let result = engine.assess(&features).map_err(|e| {
        error!("Predictor failed: {}", e);
        ApiError::from(e)
    })?;
    metrics::histogram!(INFERENCE_SECONDS).record(result.latency_ms as f64 / 1000.0);

    Ok(AssessmentReport::new(submission_id, &result))
}

/// Refuse JSON submissions while no model is loaded, before the body is
/// decoded
pub async fn require_model(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    match refusal(&state) {
        Some(err) => err.into_response(),
        None => next.run(request).await,
    }
}

/// Same as [`require_model`], answering with the operator error page
pub async fn require_model_page(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    match refusal(&state) {
        Some(err) => (err.status(), Html(page::render_error(&err))).into_response(),
        None => next.run(request).await,
    }
}

fn refusal(state: &AppState) -> Option<ApiError> {
    let err = state.model.engine().err()?;
    warn!("Submission refused: model unavailable");
    record_outcome("model_unavailable");
    Some(ApiError::from(err))
}

/// Form submission from the operator page
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    Form(submission): Form<HashMap<String, String>>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    run_assessment(&state, submission)
        .map(|report| Html(page::render_result(&report)))
        .map_err(|e| (e.status(), Html(page::render_error(&e))))
}

/// JSON submission
pub async fn submit_json(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<HashMap<String, FieldInput>>,
) -> Result<Json<AssessmentReport>, ApiError> {
    let submission = submission
        .into_iter()
        .map(|(name, value)| (name, value.into_text()));
    run_assessment(&state, submission).map(Json)
}
