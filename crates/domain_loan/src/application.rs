//! Loan application model
//!
//! A `LoanApplication` is the form snapshot the applicant edits field by
//! field. Values stay as entered (text, or a number when loaded from JSON)
//! until submission, when they are coerced into a `CoercedApplication`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::LoanError;

/// One of the eleven fields of a loan application
///
/// Declaration order is form order; `Ord` and `LoanField::ALL` follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LoanField {
    Gender,
    Married,
    Dependents,
    Education,
    #[serde(rename = "Self_Employed")]
    SelfEmployed,
    ApplicantIncome,
    CoapplicantIncome,
    LoanAmount,
    #[serde(rename = "Loan_Amount_Term")]
    LoanAmountTerm,
    #[serde(rename = "Credit_History")]
    CreditHistory,
    #[serde(rename = "Property_Area")]
    PropertyArea,
}

/// An allowed value for a select-sourced field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldOption {
    /// Value sent to the prediction service
    pub value: &'static str,
    /// Text shown to the applicant
    pub label: &'static str,
}

const fn opt(value: &'static str, label: &'static str) -> FieldOption {
    FieldOption { value, label }
}

const GENDER_OPTIONS: &[FieldOption] = &[opt("Male", "Male"), opt("Female", "Female")];
const MARRIED_OPTIONS: &[FieldOption] = &[opt("Yes", "Married"), opt("No", "Single")];
const DEPENDENTS_OPTIONS: &[FieldOption] =
    &[opt("0", "0"), opt("1", "1"), opt("2", "2"), opt("3+", "3+")];
const EDUCATION_OPTIONS: &[FieldOption] =
    &[opt("Graduate", "Graduate"), opt("Not Graduate", "Not Graduate")];
const YES_NO_OPTIONS: &[FieldOption] = &[opt("Yes", "Yes"), opt("No", "No")];
const PROPERTY_AREA_OPTIONS: &[FieldOption] = &[
    opt("Urban", "Urban"),
    opt("Semiurban", "Semiurban"),
    opt("Rural", "Rural"),
];
const TERM_OPTIONS: &[FieldOption] = &[
    opt("120", "120 months (10 years)"),
    opt("180", "180 months (15 years)"),
    opt("240", "240 months (20 years)"),
    opt("300", "300 months (25 years)"),
    opt("360", "360 months (30 years)"),
];
const CREDIT_HISTORY_OPTIONS: &[FieldOption] = &[opt("1", "Good (1)"), opt("0", "Poor (0)")];

impl LoanField {
    /// All fields, in form order
    pub const ALL: [LoanField; 11] = [
        LoanField::Gender,
        LoanField::Married,
        LoanField::Dependents,
        LoanField::Education,
        LoanField::SelfEmployed,
        LoanField::ApplicantIncome,
        LoanField::CoapplicantIncome,
        LoanField::LoanAmount,
        LoanField::LoanAmountTerm,
        LoanField::CreditHistory,
        LoanField::PropertyArea,
    ];

    /// Free-form amount fields checked for numeric format and sign
    pub const AMOUNTS: [LoanField; 3] = [
        LoanField::ApplicantIncome,
        LoanField::CoapplicantIncome,
        LoanField::LoanAmount,
    ];

    /// Fields converted to integers before submission
    pub const COERCED: [LoanField; 5] = [
        LoanField::ApplicantIncome,
        LoanField::CoapplicantIncome,
        LoanField::LoanAmount,
        LoanField::LoanAmountTerm,
        LoanField::CreditHistory,
    ];

    /// Returns the name used on the wire
    pub fn wire_name(&self) -> &'static str {
        match self {
            LoanField::Gender => "Gender",
            LoanField::Married => "Married",
            LoanField::Dependents => "Dependents",
            LoanField::Education => "Education",
            LoanField::SelfEmployed => "Self_Employed",
            LoanField::ApplicantIncome => "ApplicantIncome",
            LoanField::CoapplicantIncome => "CoapplicantIncome",
            LoanField::LoanAmount => "LoanAmount",
            LoanField::LoanAmountTerm => "Loan_Amount_Term",
            LoanField::CreditHistory => "Credit_History",
            LoanField::PropertyArea => "Property_Area",
        }
    }

    /// Returns the form label
    pub fn label(&self) -> &'static str {
        match self {
            LoanField::Gender => "Gender",
            LoanField::Married => "Marital Status",
            LoanField::Dependents => "Dependents",
            LoanField::Education => "Education",
            LoanField::SelfEmployed => "Self Employed",
            LoanField::ApplicantIncome => "Applicant Income ($)",
            LoanField::CoapplicantIncome => "Coapplicant Income ($)",
            LoanField::LoanAmount => "Loan Amount ($)",
            LoanField::LoanAmountTerm => "Loan Term (months)",
            LoanField::CreditHistory => "Credit History",
            LoanField::PropertyArea => "Property Area",
        }
    }

    /// Returns true for the free-form amount fields
    pub fn is_amount(&self) -> bool {
        Self::AMOUNTS.contains(self)
    }

    /// Returns true if the field is sent as an integer
    pub fn is_coerced(&self) -> bool {
        Self::COERCED.contains(self)
    }

    /// Returns the allowed values for select-sourced fields
    ///
    /// Amount fields are free input and return `None`.
    pub fn options(&self) -> Option<&'static [FieldOption]> {
        match self {
            LoanField::Gender => Some(GENDER_OPTIONS),
            LoanField::Married => Some(MARRIED_OPTIONS),
            LoanField::Dependents => Some(DEPENDENTS_OPTIONS),
            LoanField::Education => Some(EDUCATION_OPTIONS),
            LoanField::SelfEmployed => Some(YES_NO_OPTIONS),
            LoanField::LoanAmountTerm => Some(TERM_OPTIONS),
            LoanField::CreditHistory => Some(CREDIT_HISTORY_OPTIONS),
            LoanField::PropertyArea => Some(PROPERTY_AREA_OPTIONS),
            LoanField::ApplicantIncome | LoanField::CoapplicantIncome | LoanField::LoanAmount => {
                None
            }
        }
    }

    /// Returns the option whose value matches `value` exactly
    pub fn find_option(&self, value: &str) -> Option<&'static FieldOption> {
        self.options()?.iter().find(|option| option.value == value)
    }
}

impl fmt::Display for LoanField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for LoanField {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LoanField::ALL
            .iter()
            .copied()
            .find(|field| field.wire_name() == s)
            .ok_or_else(|| LoanError::UnknownField(s.to_string()))
    }
}

/// A single form value as entered
///
/// Numbers appear when a snapshot is loaded from JSON. A number is never
/// blank, so a numeric zero always counts as present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Returns an empty text value
    pub fn empty() -> Self {
        FieldValue::Text(String::new())
    }

    /// Returns true if the value counts as missing
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Number(_) => false,
            FieldValue::Text(text) => text.trim().is_empty(),
        }
    }

    /// Parses the value as a finite number
    pub fn as_number(&self) -> Option<f64> {
        let number = match self {
            FieldValue::Number(n) => *n,
            FieldValue::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        number.is_finite().then_some(number)
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            FieldValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

/// A form snapshot of a loan application
///
/// Fields that were never set read as empty text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanApplication {
    values: BTreeMap<LoanField, FieldValue>,
}

impl LoanApplication {
    /// Creates an application with every field empty
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of a field, or `None` if it was never set
    pub fn get(&self, field: LoanField) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    /// Returns the value of a field as display text
    pub fn text(&self, field: LoanField) -> String {
        self.get(field).map(ToString::to_string).unwrap_or_default()
    }

    /// Returns true if the field is missing or blank
    pub fn is_blank(&self, field: LoanField) -> bool {
        self.get(field).map_or(true, FieldValue::is_blank)
    }

    /// Sets a field value
    pub fn set(&mut self, field: LoanField, value: impl Into<FieldValue>) {
        self.values.insert(field, value.into());
    }

    /// Builder-style variant of `set`
    pub fn with(mut self, field: LoanField, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Returns true if no field holds a non-blank value
    pub fn is_empty(&self) -> bool {
        LoanField::ALL.iter().all(|field| self.is_blank(*field))
    }

    /// Builds an application from a JSON object keyed by wire name
    ///
    /// Keys must name a field and values must be text or a number. Fields
    /// missing from the object stay empty.
    pub fn from_snapshot(snapshot: Map<String, Value>) -> Result<Self, LoanError> {
        let mut application = Self::new();
        for (key, value) in snapshot {
            let field: LoanField = key.parse()?;
            let converted = match &value {
                Value::String(text) => Some(FieldValue::Text(text.clone())),
                Value::Number(n) => n.as_f64().map(FieldValue::Number),
                _ => None,
            };
            let converted = converted.ok_or_else(|| LoanError::UnsupportedValue {
                field,
                value: value.to_string(),
            })?;
            application.set(field, converted);
        }
        Ok(application)
    }

    /// Iterates over every field in form order, with empty values for unset fields
    pub fn fields(&self) -> impl Iterator<Item = (LoanField, FieldValue)> + '_ {
        LoanField::ALL
            .iter()
            .map(move |field| (*field, self.get(*field).cloned().unwrap_or_default()))
    }
}
