//! Loan application validation rules
//!
//! Validation is a pure function of one form snapshot. Each field reports at
//! most one error, checked in this order:
//!
//! 1. **Required**: every field must be non-empty. A numeric zero is a value,
//!    not an empty field; whitespace-only text is empty.
//! 2. **Numeric format**: `ApplicantIncome`, `CoapplicantIncome` and
//!    `LoanAmount` must parse as a finite number.
//! 3. **Non-negative**: the same three fields must be `>= 0`.
//!
//! `Loan_Amount_Term` and `Credit_History` come from fixed option sets and
//! are only checked for presence here; coercion rejects anything non-numeric.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::application::{LoanApplication, LoanField};

/// Message for a missing field
pub const REQUIRED_MESSAGE: &str = "This field is required";

/// Message for an amount that is not a number
pub const NOT_A_NUMBER_MESSAGE: &str = "Must be a valid number";

/// Message for a negative amount
pub const NEGATIVE_MESSAGE: &str = "Must be a positive number";

/// Per-field validation errors
///
/// An empty set means the application can be submitted. Iteration follows
/// form order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<LoanField, String>,
}

impl ValidationErrors {
    /// Creates an empty error set
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an error set holding a single error
    pub fn single(field: LoanField, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.report(field, message);
        errors
    }

    /// Records an error unless the field already has one
    ///
    /// Returns true if the error was recorded.
    pub fn report(&mut self, field: LoanField, message: impl Into<String>) -> bool {
        if self.errors.contains_key(&field) {
            return false;
        }
        self.errors.insert(field, message.into());
        true
    }

    /// Removes the error for a field, returning true if there was one
    pub fn clear(&mut self, field: LoanField) -> bool {
        self.errors.remove(&field).is_some()
    }

    /// Returns the error message for a field
    pub fn get(&self, field: LoanField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Returns true if the field has an error
    pub fn contains(&self, field: LoanField) -> bool {
        self.errors.contains_key(&field)
    }

    /// Returns true if there are no errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of fields with errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterates over errors in form order
    pub fn iter(&self) -> impl Iterator<Item = (LoanField, &str)> {
        self.errors.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// Returns the fields that have errors, in form order
    pub fn fields(&self) -> Vec<LoanField> {
        self.errors.keys().copied().collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Validator for loan applications
///
/// # Examples
///
/// ```rust
/// use domain_loan::{LoanApplication, LoanField, LoanValidator};
///
/// let app = LoanApplication::new().with(LoanField::LoanAmount, "-5");
/// let errors = LoanValidator::validate(&app);
///
/// assert_eq!(errors.get(LoanField::Gender), Some("This field is required"));
/// assert_eq!(errors.get(LoanField::LoanAmount), Some("Must be a positive number"));
/// ```
pub struct LoanValidator;

impl LoanValidator {
    /// Validates every field of an application
    pub fn validate(application: &LoanApplication) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for field in LoanField::ALL {
            if let Some(message) = Self::validate_field(application, field) {
                errors.report(field, message);
            }
        }
        errors
    }

    /// Validates a single field, returning its error message if any
    pub fn validate_field(application: &LoanApplication, field: LoanField) -> Option<&'static str> {
        if application.is_blank(field) {
            return Some(REQUIRED_MESSAGE);
        }
        if field.is_amount() {
            return Self::check_amount(application, field);
        }
        None
    }

    fn check_amount(application: &LoanApplication, field: LoanField) -> Option<&'static str> {
        let value = application.get(field)?;
        match value.as_number() {
            None => Some(NOT_A_NUMBER_MESSAGE),
            Some(amount) if amount < 0.0 => Some(NEGATIVE_MESSAGE),
            Some(_) => None,
        }
    }
}
