//! Application Shell
//!
//! The shell owns the session state and is driven from a single task. User
//! input arrives through `dispatch`; remote calls run as spawned tasks whose
//! outcomes come back over an unbounded channel and are applied through the
//! same reducer, one at a time.

use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::Instrument;

use core_kernel::SessionId;
use domain_loan::{
    LoanApplication, PredictionPort, ResultPresenter, ResultSummary, ValidationErrors,
};

use crate::connectivity::{check_health, ConnectivityState, SERVICE_DOWN_MESSAGE};
use crate::coordinator::{predict_action, PREDICTION_FAILED};
use crate::error::ClientError;
use crate::state::{reduce, Action, AppState, Effect};

/// Which main view is on screen
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// The service is down: setup guidance and a retry control
    ConnectionError,
    /// A prediction is available
    Result(Box<ResultSummary>),
    /// The input form
    Form {
        form: LoanApplication,
        errors: ValidationErrors,
        loading: bool,
    },
}

/// Everything shown at one moment
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub status: ConnectivityState,
    /// Dismissible banner drawn over the view
    pub banner: Option<String>,
    pub view: View,
}

impl Screen {
    /// Selects the view for a snapshot
    ///
    /// Disconnected beats everything; a stored prediction beats the form.
    pub fn of(state: &AppState, presenter: &ResultPresenter) -> Self {
        let view = if state.connectivity_state() == ConnectivityState::Disconnected {
            View::ConnectionError
        } else if let Some(response) = state.submission.response() {
            View::Result(Box::new(presenter.present(response)))
        } else {
            View::Form {
                form: state.form.clone(),
                errors: state.submission.field_errors().clone(),
                loading: state.is_loading(),
            }
        };

        Screen {
            status: state.connectivity_state(),
            banner: state.banner.clone(),
            view,
        }
    }
}

/// Sends a fallback action if a task ends without reporting its outcome
///
/// Keeps the loading flag and the connectivity state from sticking when a
/// remote-call task panics or is dropped by the runtime.
pub struct CompletionGuard {
    fallback: Option<Action>,
    actions: UnboundedSender<Action>,
}

impl CompletionGuard {
    pub fn new(fallback: Action, actions: UnboundedSender<Action>) -> Self {
        Self {
            fallback: Some(fallback),
            actions,
        }
    }

    /// Sends the outcome; the fallback is discarded
    pub fn report(mut self, action: Action) {
        self.fallback = None;
        if self.actions.send(action).is_err() {
            tracing::debug!("Shell closed before completion arrived");
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(fallback) = self.fallback.take() {
            tracing::warn!(?fallback, "Remote call ended without reporting");
            let _ = self.actions.send(fallback);
        }
    }
}

/// The session driver
pub struct Shell {
    session: SessionId,
    state: AppState,
    port: Arc<dyn PredictionPort>,
    presenter: ResultPresenter,
    completions_tx: UnboundedSender<Action>,
    completions_rx: UnboundedReceiver<Action>,
    pending: usize,
}

impl Shell {
    /// Creates a shell; nothing is sent until `start`
    pub fn new(port: Arc<dyn PredictionPort>, presenter: ResultPresenter) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            session: SessionId::new_v7(),
            state: AppState::new(),
            port,
            presenter,
            completions_tx,
            completions_rx,
            pending: 0,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Number of remote calls whose outcome has not been applied yet
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Runs the one-shot startup probe
    pub fn start(&mut self) {
        tracing::info!(session = %self.session, "Session started");
        self.dispatch(Action::SessionStarted);
    }

    /// Applies an action and starts the effect it produced, if any
    pub fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        let (next, effect) = reduce(state, action);
        self.state = next;
        if let Some(effect) = effect {
            self.spawn(effect);
        }
    }

    /// Probes the service again; only allowed while disconnected
    pub fn retry(&mut self) -> Result<(), ClientError> {
        let status = self.state.connectivity_state();
        if status != ConnectivityState::Disconnected {
            return Err(ClientError::IllegalAction(format!("retry while {}", status)));
        }
        self.dispatch(Action::RetryRequested);
        Ok(())
    }

    /// Waits for the next remote outcome and applies it
    ///
    /// Returns false if nothing is pending.
    pub async fn apply_next(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        match self.completions_rx.recv().await {
            Some(action) => {
                self.pending -= 1;
                self.dispatch(action);
                true
            }
            None => false,
        }
    }

    /// Applies outcomes until no remote call is pending
    pub async fn settle(&mut self) {
        while self.apply_next().await {}
    }

    /// The current screen
    pub fn screen(&self) -> Screen {
        Screen::of(&self.state, &self.presenter)
    }

    fn spawn(&mut self, effect: Effect) {
        self.pending += 1;
        let port = Arc::clone(&self.port);
        let tx = self.completions_tx.clone();

        match effect {
            Effect::Predict { request, body } => {
                let guard = CompletionGuard::new(
                    Action::SubmitFailed {
                        request,
                        message: PREDICTION_FAILED.to_string(),
                    },
                    tx,
                );
                let span = tracing::info_span!("predict", session = %self.session, %request);
                tokio::spawn(
                    async move {
                        let action = predict_action(port, request, body).await;
                        guard.report(action);
                    }
                    .instrument(span),
                );
            }
            Effect::Probe { probe } => {
                let guard = CompletionGuard::new(
                    Action::HealthCheckFailed {
                        probe,
                        message: SERVICE_DOWN_MESSAGE.to_string(),
                    },
                    tx,
                );
                let span = tracing::info_span!("probe", session = %self.session, %probe);
                tokio::spawn(
                    async move {
                        let action = check_health(port, probe).await;
                        guard.report(action);
                    }
                    .instrument(span),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::RequestSequence;
    use domain_loan::ports::mock::MockPredictionPort;
    use domain_loan::{FieldValue, LoanField};

    #[test]
    fn test_guard_sends_fallback_when_dropped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let request = RequestSequence::new().next_id();
        drop(CompletionGuard::new(
            Action::SubmitFailed {
                request,
                message: PREDICTION_FAILED.to_string(),
            },
            tx,
        ));

        match rx.try_recv() {
            Ok(Action::SubmitFailed { request: reported, message }) => {
                assert_eq!(reported, request);
                assert_eq!(message, PREDICTION_FAILED);
            }
            other => panic!("Expected SubmitFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_guard_reports_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        CompletionGuard::new(Action::Reset, tx).report(Action::DismissError);

        assert!(matches!(rx.try_recv(), Ok(Action::DismissError)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_view_priority() {
        let presenter = ResultPresenter::default();
        let mut state = AppState::new();
        assert!(matches!(Screen::of(&state, &presenter).view, View::Form { .. }));

        let probe = state.connectivity.start().unwrap();
        state.connectivity.complete(probe, false);
        state.banner = Some("down".to_string());
        let screen = Screen::of(&state, &presenter);
        assert_eq!(screen.view, View::ConnectionError);
        assert_eq!(screen.status, ConnectivityState::Disconnected);
        assert_eq!(screen.banner.as_deref(), Some("down"));
    }

    #[tokio::test]
    async fn test_start_probes_once() {
        let port = Arc::new(MockPredictionPort::new());
        let mut shell = Shell::new(port.clone(), ResultPresenter::default());
        assert_eq!(shell.screen().status, ConnectivityState::Checking);

        shell.start();
        shell.settle().await;
        assert_eq!(shell.screen().status, ConnectivityState::Connected);
        assert_eq!(port.probe_calls(), 1);
        assert_eq!(shell.pending(), 0);
    }

    #[tokio::test]
    async fn test_field_edits_show_in_form_view() {
        let port = Arc::new(MockPredictionPort::new());
        let mut shell = Shell::new(port, ResultPresenter::default());
        shell.dispatch(Action::FieldChanged {
            field: LoanField::LoanAmount,
            value: FieldValue::from("150"),
        });

        match shell.screen().view {
            View::Form { form, loading, .. } => {
                assert_eq!(form.text(LoanField::LoanAmount), "150");
                assert!(!loading);
            }
            other => panic!("Expected form view, got {:?}", other),
        }
    }
}
