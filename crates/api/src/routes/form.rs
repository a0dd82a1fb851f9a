//! Form Routes

use axum::{extract::State, response::Html};
use std::sync::Arc;

use crate::page;
use crate::AppState;

/// Operator form, or the disabled notice
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(page::render_form(state.model.unavailable_reason()))
}
