//! HTTP client for the strategic analysis backend.

use crate::analyzer::Analyzer;
use crate::models::{AnalysisRequest, AnalysisResponse};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

const ANALYZE_PATH: &str = "/api/strategic/analyze";
const HEALTH_PATH: &str = "/api/health";

/// Configuration for the backend client.
#[derive(Debug, Clone)]
pub struct HttpAnalyzerConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Extra attempts after a transport failure or 5xx.
    pub retries: usize,
    /// Base delay between attempts; grows linearly.
    pub backoff_ms: u64,
}

impl Default for HttpAnalyzerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_seconds: 30,
            retries: 2,
            backoff_ms: 500,
        }
    }
}

impl From<&crate::config::BackendConfig> for HttpAnalyzerConfig {
    fn from(config: &crate::config::BackendConfig) -> Self {
        Self {
            base_url: config.url.clone(),
            timeout_seconds: config.timeout_seconds,
            retries: config.retries,
            backoff_ms: config.backoff_ms,
        }
    }
}

/// Health report returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Outcome of a single attempt, split by whether another try makes sense.
enum AttemptError {
    Retryable(anyhow::Error),
    Fatal(anyhow::Error),
}

/// Analyzer backed by the remote analysis service.
pub struct HttpAnalyzer {
    config: HttpAnalyzerConfig,
    http_client: reqwest::Client,
}

impl HttpAnalyzer {
    pub fn new(config: HttpAnalyzerConfig) -> Result<Self> {
        info!("Using analysis backend at {}", config.base_url);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Query the backend health endpoint.
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.url(HEALTH_PATH);
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.describe_transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Backend health error {}: {}", status, body));
        }

        response
            .json()
            .await
            .context("Failed to parse backend health response")
    }

    async fn attempt(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, AttemptError> {
        let url = self.url(ANALYZE_PATH);

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AttemptError::Retryable(self.describe_transport_error(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = anyhow::anyhow!("Analysis backend error {}: {}", status, body);
            return Err(if is_retryable_status(status) {
                AttemptError::Retryable(err)
            } else {
                AttemptError::Fatal(err)
            });
        }

        response
            .json()
            .await
            .context("Failed to parse analysis response")
            .map_err(AttemptError::Fatal)
    }

    /// Delay before retry number `attempt` (1-based); grows linearly.
    fn backoff_delay(&self, attempt: usize) -> Duration {
        Duration::from_millis(self.config.backoff_ms * attempt as u64)
    }

    fn describe_transport_error(&self, e: reqwest::Error) -> anyhow::Error {
        if e.is_timeout() {
            anyhow::anyhow!(
                "Request timed out after {}s. Try a more specific question.",
                self.config.timeout_seconds
            )
        } else if e.is_connect() {
            anyhow::anyhow!(
                "Cannot connect to analysis backend at {}. Is it running?",
                self.config.base_url
            )
        } else {
            anyhow::anyhow!("Failed to send request: {}", e)
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT
}

#[async_trait]
impl Analyzer for HttpAnalyzer {
    fn name(&self) -> &str {
        "backend"
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse> {
        let mut attempt = 0;

        loop {
            debug!("POST {} (attempt {})", self.url(ANALYZE_PATH), attempt + 1);

            match self.attempt(request).await {
                Ok(response) => return Ok(response),
                Err(AttemptError::Fatal(e)) => return Err(e),
                Err(AttemptError::Retryable(e)) if attempt < self.config.retries => {
                    attempt += 1;
                    let delay = self.backoff_delay(attempt);
                    warn!("{} (retrying in {}ms)", e, delay.as_millis());
                    tokio::time::sleep(delay).await;
                }
                Err(AttemptError::Retryable(e)) => return Err(e),
            }
        }
    }
}
