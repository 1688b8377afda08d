//! Loan Application Domain
//!
//! This crate holds everything about a loan application that does not depend
//! on how the client is driven:
//!
//! - **Application model**: the eleven form fields, their option sets and the
//!   form snapshot (`LoanApplication`)
//! - **Field Validator**: per-field rules producing `ValidationErrors`
//! - **Coercion**: converting a valid snapshot into the request body
//! - **Result Presenter**: mapping a `PredictionResponse` onto a `ResultSummary`
//! - **Prediction port**: the `PredictionPort` trait with HTTP and mock adapters
//!
//! # Examples
//!
//! ```rust
//! use domain_loan::{prepare_submission, LoanApplication, LoanField};
//!
//! let app = LoanApplication::new()
//!     .with(LoanField::Gender, "Male")
//!     .with(LoanField::Married, "Yes")
//!     .with(LoanField::Dependents, "0")
//!     .with(LoanField::Education, "Graduate")
//!     .with(LoanField::SelfEmployed, "No")
//!     .with(LoanField::ApplicantIncome, "5849.7")
//!     .with(LoanField::CoapplicantIncome, "0")
//!     .with(LoanField::LoanAmount, "146")
//!     .with(LoanField::LoanAmountTerm, "360")
//!     .with(LoanField::CreditHistory, "1")
//!     .with(LoanField::PropertyArea, "Urban");
//!
//! let body = prepare_submission(&app).unwrap();
//! assert_eq!(body.applicant_income, 5849);
//! assert_eq!(body.property_area, "Urban");
//! ```

pub mod application;
pub mod validation;
pub mod coercion;
pub mod prediction;
pub mod presenter;
pub mod error;
pub mod ports;
pub mod adapters;

pub use application::{FieldOption, FieldValue, LoanApplication, LoanField};
pub use validation::{
    LoanValidator, ValidationErrors, NEGATIVE_MESSAGE, NOT_A_NUMBER_MESSAGE, REQUIRED_MESSAGE,
};
pub use coercion::{coerce_integer, prepare_submission, CoercedApplication, CoercionError};
pub use prediction::{FeatureImportance, FeatureWeight, ModelInfo, PredictionResponse, ServiceStatus};
pub use presenter::{
    credit_history_label, humanize_label, EchoItem, RankedFactor, ResultPresenter, ResultSummary,
    Verdict, MAX_FACTORS,
};
pub use error::LoanError;
pub use ports::PredictionPort;
pub use adapters::{HttpPredictionAdapter, PredictionServiceConfig};
