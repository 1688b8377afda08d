//! Session tests for loan_client
//!
//! Drives a full `Shell` against the scripted mock port and against the
//! HTTP adapter talking to the in-process stub service.

use serde_json::json;
use std::sync::Arc;

use core_kernel::{AdapterHealth, HealthCheckable};
use domain_loan::adapters::{HttpPredictionAdapter, PredictionServiceConfig};
use domain_loan::ports::mock::{MockFailure, MockPredictionPort};
use domain_loan::{LoanApplication, LoanField, PredictionPort, ResultPresenter, Verdict, REQUIRED_MESSAGE};
use loan_client::render::render_health;
use loan_client::{Action, ClientError, ConnectivityState, Shell, PREDICTION_FAILED, SERVICE_DOWN_MESSAGE};
use test_utils::{
    assert_banner, assert_field_error, expect_connection_error, expect_form, expect_result,
    ApplicationFixtures, PredictionResponseBuilder, ResponseFixtures, StubReply, StubService,
};

async fn connected_shell(port: Arc<dyn PredictionPort>) -> Shell {
    let mut shell = Shell::new(port, ResultPresenter::default());
    shell.start();
    shell.settle().await;
    shell
}

fn fill(shell: &mut Shell, application: &LoanApplication) {
    for (field, value) in application.fields() {
        shell.dispatch(Action::FieldChanged { field, value });
    }
}

// ============================================================================
// Scenarios against the mock port
// ============================================================================

mod scenarios {
    use super::*;

    #[tokio::test]
    async fn test_empty_form_reports_every_field_without_calling_service() {
        let port = Arc::new(MockPredictionPort::new());
        let mut shell = connected_shell(port.clone()).await;

        shell.dispatch(Action::SubmitRequested);
        shell.settle().await;

        let screen = shell.screen();
        let errors = expect_form(&screen);
        assert_eq!(errors.len(), 11);
        for field in LoanField::ALL {
            assert_field_error(errors, field, REQUIRED_MESSAGE);
        }
        assert_eq!(port.predict_calls(), 0);
        assert!(!shell.state().is_loading());
    }

    #[tokio::test]
    async fn test_approved_prediction_is_presented() {
        let port = Arc::new(MockPredictionPort::new());
        port.push_response(ResponseFixtures::approved()).await;
        let mut shell = connected_shell(port.clone()).await;

        fill(&mut shell, &ApplicationFixtures::approvable());
        shell.dispatch(Action::SubmitRequested);
        assert!(shell.state().is_loading());
        shell.settle().await;

        let screen = shell.screen();
        let summary = expect_result(&screen);
        assert_eq!(summary.verdict, Verdict::Approved);
        assert_eq!(summary.headline, "Loan Approved");
        assert_eq!(summary.confidence.to_string(), "91.0%");
        assert!(summary.factors.is_none());
        assert_banner(&screen, None);
        assert!(!shell.state().is_loading());

        let sent = port.last_request().await.unwrap();
        assert_eq!(sent.loan_amount, 146);
        assert_eq!(sent.credit_history, 1);
    }

    #[tokio::test]
    async fn test_startup_probe_failure_then_retry() {
        let port = Arc::new(MockPredictionPort::unreachable());
        let mut shell = connected_shell(port.clone()).await;

        let screen = shell.screen();
        expect_connection_error(&screen);
        assert_eq!(screen.status, ConnectivityState::Disconnected);
        assert_banner(&screen, Some(SERVICE_DOWN_MESSAGE));

        port.set_reachable(true);
        shell.retry().unwrap();
        assert_eq!(shell.screen().status, ConnectivityState::Checking);
        shell.settle().await;

        let screen = shell.screen();
        expect_form(&screen);
        assert_eq!(screen.status, ConnectivityState::Connected);
        assert_banner(&screen, None);
        assert_eq!(port.probe_calls(), 2);
    }

    #[tokio::test]
    async fn test_retry_is_rejected_while_connected() {
        let port = Arc::new(MockPredictionPort::new());
        let mut shell = connected_shell(port.clone()).await;

        assert!(matches!(shell.retry(), Err(ClientError::IllegalAction(_))));
        assert_eq!(port.probe_calls(), 1);
    }

    #[tokio::test]
    async fn test_service_error_message_is_shown_and_form_kept() {
        let port = Arc::new(MockPredictionPort::new());
        port.push_failure(MockFailure::Remote {
            status: 400,
            message: Some("model not loaded".to_string()),
        })
        .await;
        let mut shell = connected_shell(port).await;

        fill(&mut shell, &ApplicationFixtures::approvable());
        shell.dispatch(Action::SubmitRequested);
        shell.settle().await;

        let screen = shell.screen();
        assert_banner(&screen, Some("model not loaded"));
        expect_form(&screen);
        assert_eq!(shell.state().form.text(LoanField::ApplicantIncome), "5849");

        shell.dispatch(Action::DismissError);
        let screen = shell.screen();
        assert_banner(&screen, None);
        expect_form(&screen);
    }

    #[tokio::test]
    async fn test_transport_and_decode_failures_are_generic() {
        for failure in [MockFailure::Unreachable, MockFailure::Timeout, MockFailure::Malformed] {
            let port = Arc::new(MockPredictionPort::new());
            port.push_failure(failure).await;
            let mut shell = connected_shell(port).await;

            fill(&mut shell, &ApplicationFixtures::approvable());
            shell.dispatch(Action::SubmitRequested);
            shell.settle().await;

            assert_banner(&shell.screen(), Some(PREDICTION_FAILED));
        }
    }

    #[tokio::test]
    async fn test_failure_after_success_keeps_previous_result() {
        let port = Arc::new(MockPredictionPort::new());
        port.push_response(ResponseFixtures::approved()).await;
        port.push_failure(MockFailure::Remote { status: 500, message: None }).await;
        let mut shell = connected_shell(port).await;

        fill(&mut shell, &ApplicationFixtures::approvable());
        shell.dispatch(Action::SubmitRequested);
        shell.settle().await;
        shell.dispatch(Action::SubmitRequested);
        shell.settle().await;

        let screen = shell.screen();
        assert_banner(&screen, Some(PREDICTION_FAILED));
        assert_eq!(expect_result(&screen).headline, "Loan Approved");
    }

    #[tokio::test]
    async fn test_reset_returns_to_empty_form() {
        let port = Arc::new(MockPredictionPort::new());
        let mut shell = connected_shell(port).await;

        fill(&mut shell, &ApplicationFixtures::poor_credit());
        shell.dispatch(Action::SubmitRequested);
        shell.settle().await;
        assert_eq!(expect_result(&shell.screen()).verdict, Verdict::Rejected);

        shell.dispatch(Action::Reset);
        let screen = shell.screen();
        assert!(expect_form(&screen).is_empty());
        assert!(shell.state().form.is_empty());
        assert_eq!(screen.status, ConnectivityState::Connected);
    }

    #[tokio::test]
    async fn test_factors_are_limited_to_five_in_order() {
        let port = Arc::new(MockPredictionPort::new());
        port.push_response(ResponseFixtures::rejected_with_factors()).await;
        let mut shell = connected_shell(port).await;

        fill(&mut shell, &ApplicationFixtures::poor_credit());
        shell.dispatch(Action::SubmitRequested);
        shell.settle().await;

        let screen = shell.screen();
        let summary = expect_result(&screen);
        let labels: Vec<&str> = summary
            .factors
            .as_ref()
            .unwrap()
            .iter()
            .map(|f| f.label.as_str())
            .collect();
        assert_eq!(
            labels,
            vec!["Credit History", "Applicant Income", "Loan Amount", "Coapplicant Income", "Loan Amount Term"]
        );
        assert_eq!(summary.echo[2].value, "Poor");
    }
}

// ============================================================================
// In-flight requests
// ============================================================================

mod in_flight {
    use super::*;

    #[tokio::test]
    async fn test_second_submit_is_ignored_while_loading() {
        let port = Arc::new(MockPredictionPort::gated());
        let mut shell = connected_shell(port.clone()).await;

        fill(&mut shell, &ApplicationFixtures::approvable());
        shell.dispatch(Action::SubmitRequested);
        shell.dispatch(Action::SubmitRequested);
        assert_eq!(shell.pending(), 1);

        port.release(1);
        shell.settle().await;
        assert_eq!(port.predict_calls(), 1);
        assert!(!shell.state().is_loading());
    }

    #[tokio::test]
    async fn test_completion_after_reset_is_discarded() {
        let port = Arc::new(MockPredictionPort::gated());
        let mut shell = connected_shell(port.clone()).await;

        fill(&mut shell, &ApplicationFixtures::approvable());
        shell.dispatch(Action::SubmitRequested);
        shell.dispatch(Action::Reset);
        assert!(!shell.state().is_loading());

        port.release(1);
        shell.settle().await;

        let screen = shell.screen();
        assert!(expect_form(&screen).is_empty());
        assert!(shell.state().submission.response().is_none());
        assert_banner(&screen, None);
    }

    #[tokio::test]
    async fn test_only_latest_request_is_applied() {
        // The mock answers from the request body, so each answer names its request
        let port = Arc::new(MockPredictionPort::gated());
        let mut shell = connected_shell(port.clone()).await;

        fill(&mut shell, &ApplicationFixtures::approvable());
        shell.dispatch(Action::SubmitRequested);
        shell.dispatch(Action::Reset);
        fill(&mut shell, &ApplicationFixtures::poor_credit());
        shell.dispatch(Action::SubmitRequested);
        assert_eq!(shell.pending(), 2);

        port.release(2);
        shell.settle().await;

        assert!(!shell.state().is_loading());
        assert_eq!(port.predict_calls(), 2);

        let stored = shell.state().submission.response().unwrap();
        assert_eq!(stored.prediction.as_deref(), Some("Rejected"));
        assert_eq!(stored.input_data["ApplicantIncome"], json!(2333));

        let screen = shell.screen();
        let summary = expect_result(&screen);
        assert_eq!(summary.verdict, Verdict::Rejected);
        assert_eq!(summary.echo[0].value, "$2,333");
    }

    #[tokio::test]
    async fn test_stale_answer_arriving_last_is_dropped() {
        let port = Arc::new(MockPredictionPort::gated());
        port.push_response(PredictionResponseBuilder::new().prediction("Rejected").build()).await;
        let mut shell = connected_shell(port.clone()).await;

        fill(&mut shell, &ApplicationFixtures::approvable());
        shell.dispatch(Action::SubmitRequested);
        shell.dispatch(Action::Reset);
        assert_eq!(shell.pending(), 1);

        // The abandoned request takes the scripted answer once released
        port.release(1);
        shell.settle().await;
        assert!(shell.state().submission.response().is_none());

        fill(&mut shell, &ApplicationFixtures::approvable());
        shell.dispatch(Action::SubmitRequested);
        port.release(1);
        shell.settle().await;

        assert_eq!(expect_result(&shell.screen()).headline, "Loan Approved");
    }
}

// ============================================================================
// End to end over HTTP
// ============================================================================

mod http {
    use super::*;

    fn adapter(url: String) -> Arc<dyn PredictionPort> {
        Arc::new(
            HttpPredictionAdapter::new(PredictionServiceConfig {
                base_url: url,
                timeout_secs: 5,
            })
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_prediction_round_trip() {
        let stub = StubService::start().await;
        stub.set_predict(StubReply::ok(json!({
            "prediction": "Approved",
            "confidence": 0.91,
            "input_data": {"ApplicantIncome": 5849, "LoanAmount": 146, "Credit_History": 1, "Education": "Graduate"}
        })))
        .await;
        let mut shell = connected_shell(adapter(stub.url())).await;
        assert_eq!(shell.screen().status, ConnectivityState::Connected);

        fill(&mut shell, &ApplicationFixtures::approvable());
        shell.dispatch(Action::SubmitRequested);
        shell.settle().await;

        let screen = shell.screen();
        let summary = expect_result(&screen);
        assert_eq!(summary.headline, "Loan Approved");
        assert_eq!(summary.echo[0].value, "$5,849");

        let sent = stub.requests_to("/predict").await;
        assert_eq!(sent.len(), 1);
        let body = sent[0].body.as_ref().unwrap();
        assert_eq!(body["ApplicantIncome"], json!(5849));
        assert_eq!(body["Loan_Amount_Term"], json!(360));
        assert_eq!(body["Gender"], json!("Male"));
        assert!(sent[0].request_id.as_deref().is_some_and(|id| id.starts_with("REQ-")));
    }

    #[tokio::test]
    async fn test_error_body_is_propagated() {
        let stub = StubService::start().await;
        stub.fail_predictions(400, json!({"error": "model not loaded"})).await;
        let mut shell = connected_shell(adapter(stub.url())).await;

        fill(&mut shell, &ApplicationFixtures::approvable());
        shell.dispatch(Action::SubmitRequested);
        shell.settle().await;

        let screen = shell.screen();
        assert_banner(&screen, Some("model not loaded"));
        expect_form(&screen);
    }

    #[tokio::test]
    async fn test_missing_confidence_is_generic_failure() {
        let stub = StubService::start().await;
        stub.set_predict(StubReply::ok(json!({"prediction": "Approved"}))).await;
        let mut shell = connected_shell(adapter(stub.url())).await;

        fill(&mut shell, &ApplicationFixtures::approvable());
        shell.dispatch(Action::SubmitRequested);
        shell.settle().await;

        assert_banner(&shell.screen(), Some(PREDICTION_FAILED));
    }

    #[tokio::test]
    async fn test_unhealthy_root_is_disconnected() {
        let stub = StubService::start().await;
        stub.set_root(StubReply::status(503, json!({"status": "unavailable"}))).await;
        let shell = connected_shell(adapter(stub.url())).await;

        expect_connection_error(&shell.screen());
    }

    #[tokio::test]
    async fn test_factor_order_follows_response_document() {
        let stub = StubService::start().await;
        stub.set_predict(StubReply::ok(json!({
            "prediction": "Rejected",
            "confidence": 0.62,
            "feature_importance": {
                "Credit_History": 0.31,
                "LoanAmount": 0.02,
                "ApplicantIncome": 0.21,
                "Property_Area": 0.09,
                "CoapplicantIncome": 0.15,
                "Married": 0.12,
                "Education": 0.1
            },
            "input_data": {}
        })))
        .await;
        let mut shell = connected_shell(adapter(stub.url())).await;

        fill(&mut shell, &ApplicationFixtures::poor_credit());
        shell.dispatch(Action::SubmitRequested);
        shell.settle().await;

        let screen = shell.screen();
        let features: Vec<&str> = expect_result(&screen)
            .factors
            .as_ref()
            .unwrap()
            .iter()
            .map(|f| f.feature.as_str())
            .collect();
        assert_eq!(
            features,
            vec!["Credit_History", "LoanAmount", "ApplicantIncome", "Property_Area", "CoapplicantIncome"]
        );
    }

    #[tokio::test]
    async fn test_health_reports_unloaded_model_as_degraded() {
        let stub = StubService::start().await;
        let port = adapter(stub.url());
        assert_eq!(port.health_check().await.status, AdapterHealth::Healthy);

        stub.set_root(StubReply::ok(json!({"status": "healthy", "model_loaded": false}))).await;
        let report = port.health_check().await;
        assert_eq!(report.status, AdapterHealth::Degraded);

        let text = render_health(&report);
        assert!(text.starts_with("[Backend Connected]"));
        assert!(text.contains("Service: degraded"));
        assert!(text.contains("model not loaded"));

        stub.set_root(StubReply::status(503, json!({}))).await;
        let text = render_health(&port.health_check().await);
        assert!(text.starts_with("[Backend Disconnected]"));
        assert!(text.contains(SERVICE_DOWN_MESSAGE));
    }

    #[tokio::test]
    async fn test_model_info() {
        let stub = StubService::start().await;
        let port = adapter(stub.url());
        let info = loan_client::coordinator::fetch_model_info(port.as_ref()).await.unwrap();
        assert_eq!(info.model_type, "RandomForestClassifier");

        stub.set_model_info(StubReply::status(500, json!({"error": "Model not loaded"}))).await;
        let message = loan_client::coordinator::fetch_model_info(port.as_ref()).await.unwrap_err();
        assert_eq!(message, "Model not loaded");

        stub.set_model_info(StubReply::status(500, json!({}))).await;
        let message = loan_client::coordinator::fetch_model_info(port.as_ref()).await.unwrap_err();
        assert_eq!(message, loan_client::MODEL_INFO_FAILED);
    }
}

// ============================================================================
// Property-based tests
// ============================================================================

mod properties {
    use super::*;
    use domain_loan::{MAX_FACTORS, FieldValue};
    use loan_client::{reduce, AppState, Effect};
    use proptest::prelude::*;
    use test_utils::{field_strategy, response_strategy, valid_application_strategy};

    proptest! {
        #[test]
        fn valid_applications_are_dispatched(application in valid_application_strategy()) {
            let (state, _) = reduce(AppState::default(), Action::SessionStarted);
            let state = application.fields().fold(state, |state, (field, value)| {
                reduce(state, Action::FieldChanged { field, value }).0
            });

            let (state, effect) = reduce(state, Action::SubmitRequested);
            prop_assert!(matches!(effect, Some(Effect::Predict { .. })), "expected Effect::Predict, got {:?}", effect);
            prop_assert!(state.is_loading());
            prop_assert!(state.submission.field_errors().is_empty());
        }

        #[test]
        fn blanking_a_field_blocks_submission(
            application in valid_application_strategy(),
            blank in field_strategy()
        ) {
            let mut state = AppState::default();
            for (field, value) in application.fields() {
                state = reduce(state, Action::FieldChanged { field, value }).0;
            }
            state = reduce(state, Action::FieldChanged { field: blank, value: FieldValue::empty() }).0;

            let (state, effect) = reduce(state, Action::SubmitRequested);
            prop_assert!(effect.is_none());
            prop_assert!(!state.is_loading());
            prop_assert_eq!(state.submission.field_errors().get(blank), Some(REQUIRED_MESSAGE));
        }

        #[test]
        fn presented_results_respect_factor_limit(response in response_strategy()) {
            let summary = ResultPresenter::default().present(&response);
            let approved = response.prediction.as_deref() == Some("Approved");
            prop_assert_eq!(summary.verdict == Verdict::Approved, approved);
            prop_assert!(summary.factors.map_or(0, |f| f.len()) <= MAX_FACTORS);
            prop_assert_eq!(summary.echo.len(), 4);
        }
    }
}
