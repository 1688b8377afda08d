//! Custom Test Assertions
//!
//! Assertion helpers for screens and validation results that give more
//! useful failure messages than bare `assert!`.

use domain_loan::{LoanField, ResultSummary, ValidationErrors};
use loan_client::{Screen, View};

/// Asserts that a field carries exactly the given error
pub fn assert_field_error(errors: &ValidationErrors, field: LoanField, expected: &str) {
    assert_eq!(
        errors.get(field),
        Some(expected),
        "Field {} should report {:?}; all errors: {}",
        field,
        expected,
        errors
    );
}

/// Asserts that the screen shows the form and returns its field errors
pub fn expect_form(screen: &Screen) -> &ValidationErrors {
    match &screen.view {
        View::Form { errors, .. } => errors,
        other => panic!("Expected the input form, got {:?}", other),
    }
}

/// Asserts that the screen shows a result and returns it
pub fn expect_result(screen: &Screen) -> &ResultSummary {
    match &screen.view {
        View::Result(summary) => summary,
        other => panic!("Expected a result view, got {:?}", other),
    }
}

/// Asserts that the screen shows the connection-error view
pub fn expect_connection_error(screen: &Screen) {
    assert!(
        matches!(screen.view, View::ConnectionError),
        "Expected the connection-error view, got {:?}",
        screen.view
    );
}

/// Asserts the banner text
pub fn assert_banner(screen: &Screen, expected: Option<&str>) {
    assert_eq!(
        screen.banner.as_deref(),
        expected,
        "Unexpected banner on screen with status {}",
        screen.status
    );
}
