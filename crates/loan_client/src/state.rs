//! Session state and its reducer
//!
//! All state of one session lives in `AppState`. The only way to change it is
//! `reduce`, which takes the current snapshot and one `Action` and returns the
//! next snapshot plus, at most, one `Effect` for the shell to run. Effects
//! are remote calls; their outcomes come back as actions.

use core_kernel::RequestId;
use domain_loan::{CoercedApplication, FieldValue, LoanApplication, LoanField, PredictionResponse};

use crate::connectivity::{ConnectivityMonitor, ConnectivityState};
use crate::coordinator::{SubmissionState, SubmitOutcome};

/// Everything that can happen to a session
#[derive(Debug, Clone)]
pub enum Action {
    /// The applicant edited a field
    FieldChanged { field: LoanField, value: FieldValue },
    /// The applicant asked to submit the form
    SubmitRequested,
    SubmitSucceeded {
        request: RequestId,
        response: PredictionResponse,
    },
    SubmitFailed { request: RequestId, message: String },
    /// Back to an empty form
    Reset,
    /// The session started; run the first probe
    SessionStarted,
    HealthCheckSucceeded { probe: RequestId },
    HealthCheckFailed { probe: RequestId, message: String },
    /// Probe the service again after a failure
    RetryRequested,
    /// Close the error banner
    DismissError,
}

/// A remote call the shell must start
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Predict {
        request: RequestId,
        body: CoercedApplication,
    },
    Probe { probe: RequestId },
}

/// Snapshot of one session
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub form: LoanApplication,
    pub submission: SubmissionState,
    pub connectivity: ConnectivityMonitor,
    /// Error banner; overlays whichever view is shown
    pub banner: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connectivity_state(&self) -> ConnectivityState {
        self.connectivity.state()
    }

    pub fn is_loading(&self) -> bool {
        self.submission.is_loading()
    }
}

/// Applies one action to a snapshot
pub fn reduce(mut state: AppState, action: Action) -> (AppState, Option<Effect>) {
    let effect = match action {
        Action::FieldChanged { field, value } => {
            state.form.set(field, value);
            state.submission.clear_field_error(field);
            None
        }
        Action::SubmitRequested => match state.submission.begin(&state.form) {
            SubmitOutcome::Dispatch { request, body } => {
                state.banner = None;
                Some(Effect::Predict { request, body })
            }
            SubmitOutcome::Invalid | SubmitOutcome::Busy => None,
        },
        Action::SubmitSucceeded { request, response } => {
            if state.submission.succeed(request, response) {
                state.banner = None;
            }
            None
        }
        Action::SubmitFailed { request, message } => {
            if state.submission.fail(request) {
                state.banner = Some(message);
            }
            None
        }
        Action::Reset => {
            state.submission.reset();
            state.form = LoanApplication::new();
            state.banner = None;
            None
        }
        Action::SessionStarted => match state.connectivity.start() {
            Ok(probe) => Some(Effect::Probe { probe }),
            Err(e) => {
                tracing::warn!(error = %e, "Session already started");
                None
            }
        },
        Action::HealthCheckSucceeded { probe } => {
            state.connectivity.complete(probe, true);
            None
        }
        Action::HealthCheckFailed { probe, message } => {
            if state.connectivity.complete(probe, false) {
                state.banner = Some(message);
            }
            None
        }
        Action::RetryRequested => match state.connectivity.retry() {
            Ok(probe) => {
                state.banner = None;
                Some(Effect::Probe { probe })
            }
            Err(e) => {
                tracing::warn!(error = %e, "Retry ignored");
                None
            }
        },
        Action::DismissError => {
            state.banner = None;
            None
        }
    };
    (state, effect)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(state: AppState, actions: Vec<Action>) -> (AppState, Vec<Effect>) {
        let mut effects = Vec::new();
        let mut state = state;
        for action in actions {
            let (next, effect) = reduce(state, action);
            state = next;
            effects.extend(effect);
        }
        (state, effects)
    }

    fn fill(state: AppState) -> AppState {
        let values = [
            (LoanField::Gender, "Male"),
            (LoanField::Married, "Yes"),
            (LoanField::Dependents, "1"),
            (LoanField::Education, "Graduate"),
            (LoanField::SelfEmployed, "No"),
            (LoanField::ApplicantIncome, "4583"),
            (LoanField::CoapplicantIncome, "1508"),
            (LoanField::LoanAmount, "128"),
            (LoanField::LoanAmountTerm, "360"),
            (LoanField::CreditHistory, "1"),
            (LoanField::PropertyArea, "Rural"),
        ];
        let actions = values
            .iter()
            .map(|(field, value)| Action::FieldChanged {
                field: *field,
                value: FieldValue::from(*value),
            })
            .collect();
        apply(state, actions).0
    }

    fn response() -> PredictionResponse {
        serde_json::from_str(r#"{"prediction":"Rejected","confidence":0.64}"#).unwrap()
    }

    #[test]
    fn test_session_start_issues_probe() {
        let (state, effects) = apply(AppState::new(), vec![Action::SessionStarted]);
        assert_eq!(state.connectivity_state(), ConnectivityState::Checking);
        assert!(matches!(effects.as_slice(), [Effect::Probe { .. }]));

        let (_, effects) = apply(state, vec![Action::SessionStarted]);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_invalid_submit_sets_field_errors_without_effect() {
        let (state, effects) = apply(AppState::new(), vec![Action::SubmitRequested]);
        assert!(effects.is_empty());
        assert_eq!(state.submission.field_errors().len(), 11);
        assert!(!state.is_loading());
    }

    #[test]
    fn test_editing_a_field_clears_its_error() {
        let (state, _) = apply(
            AppState::new(),
            vec![
                Action::SubmitRequested,
                Action::FieldChanged {
                    field: LoanField::Gender,
                    value: FieldValue::from("Female"),
                },
            ],
        );
        assert!(!state.submission.field_errors().contains(LoanField::Gender));
        assert_eq!(state.submission.field_errors().len(), 10);
    }

    #[test]
    fn test_submit_cycle() {
        let (state, effects) = apply(fill(AppState::new()), vec![Action::SubmitRequested]);
        let request = match effects.as_slice() {
            [Effect::Predict { request, body }] => {
                assert_eq!(body.coapplicant_income, 1508);
                *request
            }
            other => panic!("Expected one Predict effect, got {:?}", other),
        };
        assert!(state.is_loading());

        let (state, _) = apply(state, vec![Action::SubmitSucceeded { request, response: response() }]);
        assert!(!state.is_loading());
        assert!(state.submission.response().is_some());
        assert!(state.banner.is_none());
    }

    #[test]
    fn test_failure_sets_banner_and_keeps_form() {
        let (state, effects) = apply(fill(AppState::new()), vec![Action::SubmitRequested]);
        let request = match &effects[0] {
            Effect::Predict { request, .. } => *request,
            other => panic!("Expected Predict, got {:?}", other),
        };

        let (state, _) = apply(
            state,
            vec![Action::SubmitFailed {
                request,
                message: "model not loaded".to_string(),
            }],
        );
        assert_eq!(state.banner.as_deref(), Some("model not loaded"));
        assert_eq!(state.form.text(LoanField::PropertyArea), "Rural");
        assert!(!state.is_loading());

        let (state, _) = apply(state, vec![Action::DismissError]);
        assert!(state.banner.is_none());
    }

    #[test]
    fn test_reset_discards_late_completion() {
        let (state, effects) = apply(fill(AppState::new()), vec![Action::SubmitRequested]);
        let request = match &effects[0] {
            Effect::Predict { request, .. } => *request,
            other => panic!("Expected Predict, got {:?}", other),
        };

        let (state, _) = apply(
            state,
            vec![
                Action::Reset,
                Action::SubmitSucceeded { request, response: response() },
            ],
        );
        assert!(state.submission.response().is_none());
        assert!(state.form.is_empty());
        assert!(!state.is_loading());
    }

    #[test]
    fn test_probe_failure_then_retry() {
        let (state, effects) = apply(AppState::new(), vec![Action::SessionStarted]);
        let probe = match &effects[0] {
            Effect::Probe { probe } => *probe,
            other => panic!("Expected Probe, got {:?}", other),
        };

        let (state, _) = apply(
            state,
            vec![Action::HealthCheckFailed {
                probe,
                message: "down".to_string(),
            }],
        );
        assert_eq!(state.connectivity_state(), ConnectivityState::Disconnected);
        assert_eq!(state.banner.as_deref(), Some("down"));

        let (state, effects) = apply(state, vec![Action::RetryRequested]);
        assert_eq!(state.connectivity_state(), ConnectivityState::Checking);
        assert!(state.banner.is_none());
        let retry = match &effects[0] {
            Effect::Probe { probe } => *probe,
            other => panic!("Expected Probe, got {:?}", other),
        };
        assert!(retry > probe);

        let (state, _) = apply(state, vec![Action::HealthCheckSucceeded { probe: retry }]);
        assert_eq!(state.connectivity_state(), ConnectivityState::Connected);
    }

    #[test]
    fn test_retry_while_connected_is_ignored() {
        let (state, effects) = apply(AppState::new(), vec![Action::SessionStarted]);
        let probe = match &effects[0] {
            Effect::Probe { probe } => *probe,
            other => panic!("Expected Probe, got {:?}", other),
        };
        let (state, effects) = apply(
            state,
            vec![Action::HealthCheckSucceeded { probe }, Action::RetryRequested],
        );
        assert!(effects.is_empty());
        assert_eq!(state.connectivity_state(), ConnectivityState::Connected);
    }
}
