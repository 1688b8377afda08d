//! HTTP adapter for the prediction service
//!
//! Talks JSON over HTTP to the service's three endpoints:
//!
//! - `GET /` reachability probe
//! - `POST /predict` prediction for one application
//! - `GET /model-info` model metadata
//!
//! # Error Handling
//!
//! Failures are mapped to `PortError` variants:
//! - Timeouts -> `PortError::Timeout`
//! - Connection refused / DNS -> `PortError::Connection`
//! - Non-2xx status -> `PortError::Remote`, carrying the body's `error` field
//! - Undecodable body -> `PortError::Transformation`

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};

use core_kernel::{
    AdapterHealth, CorrelationId, DomainPort, HealthCheckResult, HealthCheckable,
    OperationMetadata, PortError,
};

use crate::coercion::CoercedApplication;
use crate::ports::PredictionPort;
use crate::prediction::{ModelInfo, PredictionResponse, ServiceStatus};

/// Header carrying the correlation id of each request
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Connection settings for the prediction service
#[derive(Debug, Clone)]
pub struct PredictionServiceConfig {
    /// Base URL, e.g. "http://localhost:5000"
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for PredictionServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Error body returned by the service on failure
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// HTTP implementation of `PredictionPort`
///
/// # Example
///
/// ```rust,ignore
/// use domain_loan::adapters::{HttpPredictionAdapter, PredictionServiceConfig};
///
/// let adapter = HttpPredictionAdapter::new(PredictionServiceConfig::default())?;
/// let status = adapter.probe(None).await?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpPredictionAdapter {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpPredictionAdapter {
    /// Creates an adapter with its own connection pool
    pub fn new(config: PredictionServiceConfig) -> Result<Self, PortError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Internal {
                message: "failed to build HTTP client".to_string(),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            timeout,
            client,
        })
    }

    /// Returns the base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        metadata: Option<&OperationMetadata>,
    ) -> (reqwest::RequestBuilder, CorrelationId) {
        let correlation_id = metadata
            .and_then(|m| m.correlation_id)
            .unwrap_or_else(CorrelationId::new_v7);
        let url = format!("{}{}", self.base_url, path);
        let builder = self
            .client
            .request(method, url)
            .header(REQUEST_ID_HEADER, correlation_id.to_string());
        (builder, correlation_id)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &str,
        builder: reqwest::RequestBuilder,
        correlation_id: CorrelationId,
    ) -> Result<T, PortError> {
        let start = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| self.map_transport_error(operation, e))?;

        let status = response.status();
        tracing::debug!(
            operation,
            %correlation_id,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Prediction service responded"
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error);
            tracing::warn!(
                operation,
                %correlation_id,
                status = status.as_u16(),
                error = message.as_deref().unwrap_or(""),
                "Prediction service returned an error status"
            );
            return Err(PortError::remote(status.as_u16(), message));
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(operation, e))?;
        serde_json::from_str::<T>(&body).map_err(|e| {
            tracing::warn!(operation, %correlation_id, error = %e, "Undecodable response body");
            PortError::transformation(format!("{}: {}", operation, e))
        })
    }

    fn map_transport_error(&self, operation: &str, e: reqwest::Error) -> PortError {
        if e.is_timeout() {
            PortError::Timeout {
                operation: operation.to_string(),
                duration_ms: self.timeout.as_millis() as u64,
            }
        } else if e.is_connect() || e.is_request() {
            PortError::Connection {
                message: format!("{}: could not reach {}", operation, self.base_url),
                source: Some(Box::new(e)),
            }
        } else if e.is_decode() {
            PortError::transformation(format!("{}: {}", operation, e))
        } else {
            PortError::Internal {
                message: format!("{}: {}", operation, e),
                source: Some(Box::new(e)),
            }
        }
    }
}

impl DomainPort for HttpPredictionAdapter {}

#[async_trait]
impl HealthCheckable for HttpPredictionAdapter {
    /// Probes the service root and reports its latency
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let outcome = self.probe(None).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match outcome {
            Ok(status) if status.model_loaded == Some(false) => {
                (AdapterHealth::Degraded, Some("model not loaded".to_string()))
            }
            Ok(status) => (AdapterHealth::Healthy, status.message),
            Err(e) => (AdapterHealth::Unhealthy, Some(e.to_string())),
        };

        HealthCheckResult {
            adapter_id: "http-prediction-adapter".to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl PredictionPort for HttpPredictionAdapter {
    async fn probe(&self, metadata: Option<OperationMetadata>) -> Result<ServiceStatus, PortError> {
        let (builder, correlation_id) = self.request(reqwest::Method::GET, "/", metadata.as_ref());
        let start = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| self.map_transport_error("probe", e))?;

        let status = response.status();
        tracing::debug!(
            %correlation_id,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Probe answered"
        );
        if !status.is_success() {
            return Err(PortError::remote(status.as_u16(), None));
        }

        // Any 2xx means the service is up; the body is informational.
        let body = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str::<ServiceStatus>(&body).unwrap_or_default())
    }

    async fn predict(
        &self,
        application: &CoercedApplication,
        metadata: Option<OperationMetadata>,
    ) -> Result<PredictionResponse, PortError> {
        let (builder, correlation_id) =
            self.request(reqwest::Method::POST, "/predict", metadata.as_ref());
        tracing::info!(%correlation_id, "Requesting prediction");
        self.send("predict", builder.json(application), correlation_id).await
    }

    async fn model_info(&self, metadata: Option<OperationMetadata>) -> Result<ModelInfo, PortError> {
        let (builder, correlation_id) =
            self.request(reqwest::Method::GET, "/model-info", metadata.as_ref());
        self.send("model_info", builder, correlation_id).await
    }
}
