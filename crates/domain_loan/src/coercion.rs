//! Coercion of a validated form snapshot into the prediction request body
//!
//! The five numeric fields are converted to integers by truncation toward
//! zero (`"5000.9"` becomes `5000`, `"-3.7"` becomes `-3`); the remaining
//! fields are sent as strings exactly as entered.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::{FieldValue, LoanApplication, LoanField};
use crate::validation::{LoanValidator, ValidationErrors, NOT_A_NUMBER_MESSAGE};

/// A field that could not be converted to an integer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} cannot be sent as an integer: {value:?}")]
pub struct CoercionError {
    pub field: LoanField,
    pub value: String,
}

/// The body of a `POST /predict` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoercedApplication {
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Married")]
    pub married: String,
    #[serde(rename = "Dependents")]
    pub dependents: String,
    #[serde(rename = "Education")]
    pub education: String,
    #[serde(rename = "Self_Employed")]
    pub self_employed: String,
    #[serde(rename = "ApplicantIncome")]
    pub applicant_income: i64,
    #[serde(rename = "CoapplicantIncome")]
    pub coapplicant_income: i64,
    #[serde(rename = "LoanAmount")]
    pub loan_amount: i64,
    #[serde(rename = "Loan_Amount_Term")]
    pub loan_amount_term: i64,
    #[serde(rename = "Credit_History")]
    pub credit_history: i64,
    #[serde(rename = "Property_Area")]
    pub property_area: String,
}

/// Truncates a value toward zero, if it is a finite number within `i64` range
pub fn coerce_integer(value: &FieldValue) -> Option<i64> {
    let number = value.as_number()?.trunc();
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if number < i64::MIN as f64 || number >= i64::MAX as f64 {
        return None;
    }
    Some(number as i64)
}

impl TryFrom<&LoanApplication> for CoercedApplication {
    type Error = CoercionError;

    fn try_from(application: &LoanApplication) -> Result<Self, Self::Error> {
        let integer = |field: LoanField| -> Result<i64, CoercionError> {
            let value = application.get(field).cloned().unwrap_or_default();
            coerce_integer(&value).ok_or_else(|| CoercionError {
                field,
                value: value.to_string(),
            })
        };
        let text = |field: LoanField| application.text(field);

        Ok(Self {
            gender: text(LoanField::Gender),
            married: text(LoanField::Married),
            dependents: text(LoanField::Dependents),
            education: text(LoanField::Education),
            self_employed: text(LoanField::SelfEmployed),
            applicant_income: integer(LoanField::ApplicantIncome)?,
            coapplicant_income: integer(LoanField::CoapplicantIncome)?,
            loan_amount: integer(LoanField::LoanAmount)?,
            loan_amount_term: integer(LoanField::LoanAmountTerm)?,
            credit_history: integer(LoanField::CreditHistory)?,
            property_area: text(LoanField::PropertyArea),
        })
    }
}

/// Validates and coerces an application in one step
///
/// Validation errors come first. A field that passes validation but cannot
/// be coerced is reported in the same per-field form.
pub fn prepare_submission(application: &LoanApplication) -> Result<CoercedApplication, ValidationErrors> {
    let errors = LoanValidator::validate(application);
    if !errors.is_empty() {
        return Err(errors);
    }

    CoercedApplication::try_from(application)
        .map_err(|e| ValidationErrors::single(e.field, NOT_A_NUMBER_MESSAGE))
}
