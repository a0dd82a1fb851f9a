//! End-to-end tests over a real socket

use api::{rate_limit::RateLimitConfig, serve, AppState};
use data_validator::Validator;
use feature_engine::FeatureVector;
use inference_engine::{ClassId, InferenceError, LabelConfig, ModelConfig, ModelHandle, Predictor};
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

struct AlwaysPositive;

impl Predictor for AlwaysPositive {
    fn predict(&self, _features: &FeatureVector) -> Result<ClassId, InferenceError> {
        Ok(1)
    }
}

async fn spawn(handle: ModelHandle, rate_limit: RateLimitConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(AppState::new(handle, Validator::default()));

    tokio::spawn(async move {
        serve(listener, state, &rate_limit).await.unwrap();
    });

    addr
}

#[tokio::test]
async fn test_missing_artifact_serves_disabled_mode() {
    let config = ModelConfig {
        path: "/nonexistent/pcos_pipeline_v3.onnx".into(),
        ..Default::default()
    };
    let addr = spawn(ModelHandle::load(&config), RateLimitConfig::disabled()).await;
    let client = reqwest::Client::new();

    let health: Value = client
        .get(format!("http://{}/api/v1/health", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["model"]["status"], "unavailable");
    assert!(health["model"]["reason"].as_str().unwrap().contains("not found"));

    let mut form = HashMap::new();
    form.insert("BMI", "24.0");
    let response = client
        .post(format!("http://{}/assess", addr))
        .form(&form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.text().await.unwrap().contains("Model unavailable"));
}

#[tokio::test]
async fn test_submission_rate_limited_per_ip() {
    let handle = ModelHandle::from_predictor("stub.onnx", Box::new(AlwaysPositive), LabelConfig::default());
    let rate_limit = RateLimitConfig {
        enabled: true,
        per_second: 60,
        burst_size: 2,
    };
    let addr = spawn(handle, rate_limit).await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/api/v1/assess", addr);

    for _ in 0..2 {
        let response = client.post(&url).json(&serde_json::json!({})).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = client.post(&url).json(&serde_json::json!({})).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // Read-only routes are not limited.
    let response = client
        .get(format!("http://{}/api/v1/schema", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
