use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::analysis::{AnalysisResult, PatientSubmission};
use crate::error::RequestError;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/analyze";

/// Anything that can turn a submission into analysis results.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(
        &self,
        submission: &PatientSubmission,
    ) -> Result<Vec<AnalysisResult>, RequestError>;
}

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

#[derive(Clone)]
pub struct AnalysisClient {
    client: Client,
    endpoint: String,
}

impl AnalysisClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Ask the service's `/health` route for its status string.
    pub async fn health(&self) -> Result<String> {
        let url = reqwest::Url::parse(&self.endpoint)?.join("/health")?;

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("Health check failed: {}", response.status()));
        }

        let health: HealthResponse = response.json().await?;
        Ok(health.status)
    }
}

#[async_trait]
impl Analyzer for AnalysisClient {
    async fn analyze(
        &self,
        submission: &PatientSubmission,
    ) -> Result<Vec<AnalysisResult>, RequestError> {
        tracing::info!(endpoint = %self.endpoint, "submitting patient data");

        // .json() sets Content-Type: application/json
        let response = self
            .client
            .post(&self.endpoint)
            .json(submission)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RequestError::Status(response.status()));
        }

        let body = response.text().await?;
        let results: Vec<AnalysisResult> = serde_json::from_str(&body)?;

        tracing::info!(results = results.len(), "analysis received");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    async fn echo_analyze(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
        let content_type = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let text = body["text"].clone();
        Json(json!([
            {
                "agent_type": "patient_info",
                "response": {"content": {"type": "text", "text": text}}
            },
            {
                "agent_type": "diagnostic",
                "response": {"content": {"text": content_type}}
            }
        ]))
    }

    async fn spawn_service(app: Router) -> String {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn analyze_posts_json_and_parses_array() {
        let base = spawn_service(Router::new().route("/analyze", post(echo_analyze))).await;
        let client = AnalysisClient::new(&format!("{base}/analyze"));

        let submission = PatientSubmission {
            text: "Patient Name: Bo\nAge: 30".to_string(),
        };
        let results = client.analyze(&submission).await.expect("analyze");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text(), "Patient Name: Bo\nAge: 30");
        assert_eq!(results[1].text(), "application/json");
    }

    #[tokio::test]
    async fn analyze_reports_non_success_status() {
        let app = Router::new().route(
            "/analyze",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "All agent services are unavailable") }),
        );
        let base = spawn_service(app).await;
        let client = AnalysisClient::new(&format!("{base}/analyze"));

        let err = client
            .analyze(&PatientSubmission { text: String::new() })
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::Status(s) if s.as_u16() == 503));
    }

    #[tokio::test]
    async fn analyze_reports_malformed_body() {
        let app = Router::new().route("/analyze", post(|| async { Json(json!({"detail": "oops"})) }));
        let base = spawn_service(app).await;
        let client = AnalysisClient::new(&format!("{base}/analyze"));

        let err = client
            .analyze(&PatientSubmission { text: String::new() })
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::Decode(_)));
    }

    #[tokio::test]
    async fn analyze_reports_unreachable_service() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let client = AnalysisClient::new(&format!("http://{addr}/analyze"));
        let err = client
            .analyze(&PatientSubmission { text: String::new() })
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::Network(_)));
    }

    #[tokio::test]
    async fn health_reads_status() {
        let app = Router::new().route("/health", get(|| async { Json(json!({"status": "healthy"})) }));
        let base = spawn_service(app).await;
        let client = AnalysisClient::new(&format!("{base}/analyze"));

        assert_eq!(client.health().await.expect("health"), "healthy");
    }
}
