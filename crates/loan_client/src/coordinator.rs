//! Submission Coordinator
//!
//! Owns the submission side of the session: the loading flag, the stored
//! prediction, the per-field errors and the id of the request in flight.
//!
//! # Request ids
//!
//! Every submission is issued a fresh `RequestId`. A completion is applied
//! only if its id is the latest issued one; `reset` issues nothing but
//! forgets the in-flight id, so a late answer to a request sent before the
//! reset is dropped.

use std::sync::Arc;
use std::time::Instant;

use core_kernel::{OperationMetadata, PortError, RequestId, RequestSequence};
use domain_loan::{
    prepare_submission, CoercedApplication, LoanApplication, ModelInfo,
    PredictionPort, PredictionResponse, ValidationErrors,
};

use crate::state::Action;

/// Generic message for a failed prediction
pub const PREDICTION_FAILED: &str = "Prediction failed";

/// Generic message for a failed model-info request
pub const MODEL_INFO_FAILED: &str = "Failed to get model info";

/// Result of asking to submit the current form
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The request should be sent
    Dispatch {
        request: RequestId,
        body: CoercedApplication,
    },
    /// The form has field errors; nothing is sent
    Invalid,
    /// A submission is already in flight; nothing is sent
    Busy,
}

/// Submission state of one session
#[derive(Debug, Clone, Default)]
pub struct SubmissionState {
    response: Option<PredictionResponse>,
    field_errors: ValidationErrors,
    requests: RequestSequence,
    in_flight: Option<RequestId>,
}

impl SubmissionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a submission is in flight
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn response(&self) -> Option<&PredictionResponse> {
        self.response.as_ref()
    }

    pub fn field_errors(&self) -> &ValidationErrors {
        &self.field_errors
    }

    /// Validates and coerces `form`, issuing a request id when it can be sent
    pub fn begin(&mut self, form: &LoanApplication) -> SubmitOutcome {
        if let Some(request) = self.in_flight {
            tracing::debug!(%request, "Submission already in flight");
            return SubmitOutcome::Busy;
        }

        match prepare_submission(form) {
            Ok(body) => {
                self.field_errors = ValidationErrors::new();
                let request = self.requests.next_id();
                self.in_flight = Some(request);
                SubmitOutcome::Dispatch { request, body }
            }
            Err(errors) => {
                tracing::debug!(fields = errors.len(), "Application failed validation");
                self.field_errors = errors;
                SubmitOutcome::Invalid
            }
        }
    }

    /// Applies a successful completion, returning false if it was stale
    pub fn succeed(&mut self, request: RequestId, response: PredictionResponse) -> bool {
        if !self.accept(request) {
            return false;
        }
        self.response = Some(response);
        true
    }

    /// Applies a failed completion, returning false if it was stale
    ///
    /// A previous successful result is kept.
    pub fn fail(&mut self, request: RequestId) -> bool {
        self.accept(request)
    }

    /// Clears the result and field errors and forgets the request in flight
    pub fn reset(&mut self) {
        if let Some(request) = self.in_flight.take() {
            tracing::debug!(%request, "Abandoning in-flight submission");
        }
        self.response = None;
        self.field_errors = ValidationErrors::new();
    }

    /// Drops the error shown for a field once the applicant edits it
    pub fn clear_field_error(&mut self, field: domain_loan::LoanField) {
        self.field_errors.clear(field);
    }

    fn accept(&mut self, request: RequestId) -> bool {
        if self.in_flight != Some(request) || !self.requests.is_latest(request) {
            tracing::debug!(%request, latest = %self.requests.latest(), "Discarding stale completion");
            return false;
        }
        self.in_flight = None;
        true
    }
}

/// Turns a prediction failure into the message shown to the applicant
///
/// The service's own `error` text wins; anything else becomes the generic
/// message.
pub fn submission_failure_message(error: &PortError) -> String {
    error
        .remote_message()
        .map(str::to_string)
        .unwrap_or_else(|| PREDICTION_FAILED.to_string())
}

/// Turns a model-info failure into a message
pub fn model_info_failure_message(error: &PortError) -> String {
    error
        .remote_message()
        .map(str::to_string)
        .unwrap_or_else(|| MODEL_INFO_FAILED.to_string())
}

/// Sends one prediction request and turns its outcome into an action
pub async fn predict_action(
    port: Arc<dyn PredictionPort>,
    request: RequestId,
    body: CoercedApplication,
) -> Action {
    let metadata = OperationMetadata::correlated().with_context("request", request.to_string());
    let start = Instant::now();
    match port.predict(&body, Some(metadata)).await {
        Ok(response) => {
            tracing::info!(
                %request,
                prediction = response.prediction.as_deref().unwrap_or(""),
                approved = response.is_approved(),
                confidence = response.confidence,
                latency_ms = start.elapsed().as_millis() as u64,
                "Prediction received"
            );
            Action::SubmitSucceeded { request, response }
        }
        Err(e) => {
            tracing::warn!(%request, error = %e, "Prediction failed");
            Action::SubmitFailed {
                request,
                message: submission_failure_message(&e),
            }
        }
    }
}

/// Fetches model metadata, normalizing failures to a message
pub async fn fetch_model_info(port: &dyn PredictionPort) -> Result<ModelInfo, String> {
    port.model_info(Some(OperationMetadata::correlated()))
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Model info request failed");
            model_info_failure_message(&e)
        })
}
