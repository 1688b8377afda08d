//! Prediction service port
//!
//! The `PredictionPort` trait is everything the client needs from the remote
//! prediction service. Two implementations exist:
//!
//! - **HTTP Adapter**: talks JSON to the real service (`adapters::http`)
//! - **Mock Adapter**: scripted in-memory responses for tests
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_loan::ports::PredictionPort;
//! use std::sync::Arc;
//!
//! pub struct Coordinator {
//!     port: Arc<dyn PredictionPort>,
//! }
//!
//! impl Coordinator {
//!     pub async fn send(&self, body: &CoercedApplication) -> Result<PredictionResponse, PortError> {
//!         self.port.predict(body, Some(OperationMetadata::correlated())).await
//!     }
//! }
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, OperationMetadata, PortError};

use crate::coercion::CoercedApplication;
use crate::prediction::{ModelInfo, PredictionResponse, ServiceStatus};

/// Operations offered by the prediction service
///
/// All methods return `Result<T, PortError>` so callers handle the HTTP
/// adapter and the mock the same way.
#[async_trait]
pub trait PredictionPort: DomainPort + HealthCheckable {
    /// Probes the service root (`GET /`)
    ///
    /// Any successful response means the service is reachable.
    async fn probe(&self, metadata: Option<OperationMetadata>) -> Result<ServiceStatus, PortError>;

    /// Requests a prediction (`POST /predict`)
    ///
    /// # Arguments
    ///
    /// * `application` - The coerced request body
    /// * `metadata` - Optional operation metadata for tracing
    async fn predict(
        &self,
        application: &CoercedApplication,
        metadata: Option<OperationMetadata>,
    ) -> Result<PredictionResponse, PortError>;

    /// Fetches model metadata (`GET /model-info`)
    async fn model_info(&self, metadata: Option<OperationMetadata>) -> Result<ModelInfo, PortError>;
}

/// Scripted implementation of PredictionPort for testing
///
/// Predictions are answered from a queue of scripted outcomes. When the queue
/// is empty the mock approves applications with a good credit history and
/// rejects the rest. An optional gate holds `predict` calls until the test
/// releases them, which lets tests complete requests out of order.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use core_kernel::{AdapterHealth, HealthCheckResult};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::{RwLock, Semaphore};

    /// A failure the mock can be scripted to produce
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum MockFailure {
        /// Connection refused
        Unreachable,
        /// Non-success status, with the body's `error` text if any
        Remote { status: u16, message: Option<String> },
        /// The request timed out
        Timeout,
        /// The body could not be decoded
        Malformed,
    }

    impl MockFailure {
        fn to_error(&self, operation: &str) -> PortError {
            match self {
                MockFailure::Unreachable => {
                    PortError::connection(format!("{}: connection refused", operation))
                }
                MockFailure::Remote { status, message } => PortError::remote(*status, message.clone()),
                MockFailure::Timeout => PortError::Timeout {
                    operation: operation.to_string(),
                    duration_ms: 30_000,
                },
                MockFailure::Malformed => {
                    PortError::transformation(format!("{}: missing field `confidence`", operation))
                }
            }
        }
    }

    /// In-memory mock implementation of PredictionPort
    #[derive(Debug)]
    pub struct MockPredictionPort {
        reachable: AtomicBool,
        model_loaded: AtomicBool,
        predictions: RwLock<VecDeque<Result<PredictionResponse, MockFailure>>>,
        model_info: RwLock<Result<ModelInfo, MockFailure>>,
        last_request: RwLock<Option<CoercedApplication>>,
        probe_calls: AtomicUsize,
        predict_calls: AtomicUsize,
        gate: Option<Arc<Semaphore>>,
    }

    impl Default for MockPredictionPort {
        fn default() -> Self {
            Self {
                reachable: AtomicBool::new(true),
                model_loaded: AtomicBool::new(true),
                predictions: RwLock::new(VecDeque::new()),
                model_info: RwLock::new(Ok(ModelInfo {
                    model_type: "RandomForestClassifier".to_string(),
                    features: crate::application::LoanField::ALL
                        .iter()
                        .map(|f| f.wire_name().to_string())
                        .collect(),
                    model_loaded: true,
                    description: None,
                    feature_importance: None,
                })),
                last_request: RwLock::new(None),
                probe_calls: AtomicUsize::new(0),
                predict_calls: AtomicUsize::new(0),
                gate: None,
            }
        }
    }

    impl MockPredictionPort {
        /// Creates a reachable mock with no scripted outcomes
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a mock whose service is down
        pub fn unreachable() -> Self {
            let port = Self::default();
            port.reachable.store(false, Ordering::SeqCst);
            port
        }

        /// Creates a mock that holds every `predict` call until released
        pub fn gated() -> Self {
            Self {
                gate: Some(Arc::new(Semaphore::new(0))),
                ..Self::default()
            }
        }

        /// Lets `n` held `predict` calls proceed
        pub fn release(&self, n: usize) {
            if let Some(gate) = &self.gate {
                gate.add_permits(n);
            }
        }

        /// Brings the service up or down
        pub fn set_reachable(&self, reachable: bool) {
            self.reachable.store(reachable, Ordering::SeqCst);
        }

        /// Reports the model as loaded or missing on probes
        pub fn set_model_loaded(&self, loaded: bool) {
            self.model_loaded.store(loaded, Ordering::SeqCst);
        }

        /// Queues a successful prediction
        pub async fn push_response(&self, response: PredictionResponse) {
            self.predictions.write().await.push_back(Ok(response));
        }

        /// Queues a failed prediction
        pub async fn push_failure(&self, failure: MockFailure) {
            self.predictions.write().await.push_back(Err(failure));
        }

        /// Sets the model-info outcome
        pub async fn set_model_info(&self, outcome: Result<ModelInfo, MockFailure>) {
            *self.model_info.write().await = outcome;
        }

        /// Returns the last request body received
        pub async fn last_request(&self) -> Option<CoercedApplication> {
            self.last_request.read().await.clone()
        }

        /// Number of probes received
        pub fn probe_calls(&self) -> usize {
            self.probe_calls.load(Ordering::SeqCst)
        }

        /// Number of predictions requested
        pub fn predict_calls(&self) -> usize {
            self.predict_calls.load(Ordering::SeqCst)
        }

        fn default_response(application: &CoercedApplication) -> PredictionResponse {
            let approved = application.credit_history == 1;
            let input_data = match serde_json::to_value(application) {
                Ok(serde_json::Value::Object(map)) => map,
                _ => serde_json::Map::new(),
            };
            PredictionResponse {
                prediction: Some(if approved { "Approved" } else { "Rejected" }.to_string()),
                confidence: if approved { 0.85 } else { 0.7 },
                feature_importance: None,
                input_data,
                message: None,
            }
        }
    }

    impl DomainPort for MockPredictionPort {}

    #[async_trait]
    impl HealthCheckable for MockPredictionPort {
        async fn health_check(&self) -> HealthCheckResult {
            let (status, message) = match self.probe(None).await {
                Ok(service) if service.model_loaded == Some(false) => {
                    (AdapterHealth::Degraded, Some("model not loaded".to_string()))
                }
                Ok(_) => (AdapterHealth::Healthy, None),
                Err(e) => (AdapterHealth::Unhealthy, Some(e.to_string())),
            };
            HealthCheckResult {
                adapter_id: "mock-prediction-port".to_string(),
                status,
                latency_ms: 0,
                message,
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl PredictionPort for MockPredictionPort {
        async fn probe(&self, _metadata: Option<OperationMetadata>) -> Result<ServiceStatus, PortError> {
            self.probe_calls.fetch_add(1, Ordering::SeqCst);
            if !self.reachable.load(Ordering::SeqCst) {
                return Err(MockFailure::Unreachable.to_error("probe"));
            }
            Ok(ServiceStatus {
                message: Some("Loan prediction service".to_string()),
                status: Some("running".to_string()),
                model_loaded: Some(self.model_loaded.load(Ordering::SeqCst)),
                version: None,
            })
        }

        async fn predict(
            &self,
            application: &CoercedApplication,
            _metadata: Option<OperationMetadata>,
        ) -> Result<PredictionResponse, PortError> {
            self.predict_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.write().await = Some(application.clone());

            if let Some(gate) = &self.gate {
                let permit = gate
                    .acquire()
                    .await
                    .map_err(|_| PortError::internal("mock gate closed"))?;
                permit.forget();
            }

            if !self.reachable.load(Ordering::SeqCst) {
                return Err(MockFailure::Unreachable.to_error("predict"));
            }

            match self.predictions.write().await.pop_front() {
                Some(Ok(response)) => Ok(response),
                Some(Err(failure)) => Err(failure.to_error("predict")),
                None => Ok(Self::default_response(application)),
            }
        }

        async fn model_info(&self, _metadata: Option<OperationMetadata>) -> Result<ModelInfo, PortError> {
            if !self.reachable.load(Ordering::SeqCst) {
                return Err(MockFailure::Unreachable.to_error("model_info"));
            }
            self.model_info
                .read()
                .await
                .clone()
                .map_err(|failure| failure.to_error("model_info"))
        }
    }
}
