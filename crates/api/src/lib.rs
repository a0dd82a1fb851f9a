//! PCOS Screening API Server
//!
//! Serves the operator form and the assessment endpoints on top of the
//! model loaded at startup.

use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Json, Router,
};
use data_validator::Validator;
use inference_engine::ModelHandle;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_governor::GovernorLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod error;
pub mod page;
pub mod rate_limit;
pub mod report;
mod routes;

pub use crate::config::AppConfig;
pub use error::ApiError;
pub use report::AssessmentReport;
pub use routes::assess::run_assessment;

use crate::config::LoggingConfig;
use crate::rate_limit::{create_governor_config, RateLimitConfig};

/// Application state shared across handlers.
///
/// Built once at startup and never mutated; the model is not reloaded.
pub struct AppState {
    /// Loaded model, or the reason it is unavailable
    pub model: ModelHandle,
    /// Edge validator for submissions
    pub validator: Validator,
    /// Prometheus handle, when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(model: ModelHandle, validator: Validator) -> Self {
        Self {
            model,
            validator,
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Attach a Prometheus handle for `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: ModelHealth,
}

/// Model component health
#[derive(Debug, Serialize)]
pub struct ModelHealth {
    pub status: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>, rate_limit: &RateLimitConfig) -> Router {
    // The model check wraps the body extractors so a disabled deployment
    // answers 503 whatever was posted.
    let mut submissions = Router::new()
        .route(
            "/assess",
            post(routes::assess::submit_form).layer(middleware::from_fn_with_state(
                state.clone(),
                routes::assess::require_model_page,
            )),
        )
        .route(
            "/api/v1/assess",
            post(routes::assess::submit_json).layer(middleware::from_fn_with_state(
                state.clone(),
                routes::assess::require_model,
            )),
        );

    if let Some(config) = create_governor_config(rate_limit) {
        submissions = submissions.layer(GovernorLayer { config });
    }

    Router::new()
        .route("/", get(routes::form::index))
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/schema", get(routes::schema::get_schema))
        .route("/metrics", get(routes::metrics::render))
        .merge(submissions)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let (status, model_status) = if state.model.is_available() {
        ("healthy", "loaded")
    } else {
        ("degraded", "unavailable")
    };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model: ModelHealth {
            status: model_status.to_string(),
            path: state.model.path().display().to_string(),
            reason: state.model.unavailable_reason().map(str::to_string),
        },
    })
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    }
}

/// Install the Prometheus recorder
pub fn init_metrics() -> Result<PrometheusHandle, metrics_exporter_prometheus::BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Serve the router on an already bound listener
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    rate_limit: &RateLimitConfig,
) -> std::io::Result<()> {
    let app = create_router(state, rate_limit);

    info!("Serving on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await
}

/// Load the model and run the server with the given configuration
pub async fn run_server(config: &AppConfig) -> anyhow::Result<()> {
    let model = ModelHandle::load(&config.model);
    let mut state = AppState::new(model, Validator::new(config.validation.clone()));

    if config.metrics.enabled {
        state = state.with_metrics(init_metrics()?);
    }

    let listener = TcpListener::bind(config.server.bind.as_str()).await?;
    serve(listener, Arc::new(state), &config.server.rate_limit).await?;

    Ok(())
}
