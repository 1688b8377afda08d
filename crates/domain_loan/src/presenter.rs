//! Mapping from a prediction response to the result view
//!
//! The presenter is pure: the same response always yields the same summary.
//! An unrecognized prediction value is shown as a rejection.

use serde::Serialize;
use serde_json::Value;

use core_kernel::{Currency, Money, Percentage};

use crate::application::LoanField;
use crate::prediction::PredictionResponse;

/// Maximum number of factors shown
pub const MAX_FACTORS: usize = 5;

/// Shown for an echoed value the service did not return
pub const MISSING_VALUE: &str = "N/A";

const APPROVED_MESSAGE: &str = "Congratulations! Your loan application has been approved \
    based on the provided information.";
const REJECTED_MESSAGE: &str = "We're sorry, but your loan application was not approved at \
    this time. Please consider improving your financial profile and reapplying.";

/// Outcome of a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Approved,
    Rejected,
}

impl Verdict {
    /// Approved only for the exact, case-sensitive value "Approved"
    pub fn from_prediction(prediction: Option<&str>) -> Self {
        match prediction {
            Some(crate::prediction::APPROVED) => Verdict::Approved,
            _ => Verdict::Rejected,
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Verdict::Approved)
    }
}

/// One ranked feature in the "Key Factors Considered" section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedFactor {
    /// Feature name as sent by the service
    pub feature: String,
    /// Humanized label
    pub label: String,
    pub importance: Percentage,
}

/// One line of the application summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EchoItem {
    pub label: &'static str,
    pub value: String,
}

/// Everything the result view displays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    pub verdict: Verdict,
    /// "Loan Approved", "Loan Rejected", ...
    pub headline: String,
    pub outcome_message: &'static str,
    pub confidence: Percentage,
    /// `None` when the response had no feature importance at all
    pub factors: Option<Vec<RankedFactor>>,
    pub echo: Vec<EchoItem>,
    /// The service's own explanation, if any
    pub service_message: Option<String>,
}

/// Builds result summaries
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultPresenter {
    currency: Currency,
}

impl ResultPresenter {
    /// Creates a presenter that shows amounts in `currency`
    pub fn new(currency: Currency) -> Self {
        Self { currency }
    }

    /// Maps a response onto the result view
    pub fn present(&self, response: &PredictionResponse) -> ResultSummary {
        let verdict = Verdict::from_prediction(response.prediction.as_deref());

        let headline = match response.prediction.as_deref().map(str::trim) {
            Some(prediction) if !prediction.is_empty() => format!("Loan {}", prediction),
            _ => "Loan Rejected".to_string(),
        };

        let factors = response.feature_importance.as_ref().map(|importance| {
            importance
                .leading(MAX_FACTORS)
                .iter()
                .map(|weight| RankedFactor {
                    feature: weight.feature.clone(),
                    label: humanize_label(&weight.feature),
                    importance: Percentage::from_fraction(weight.importance),
                })
                .collect()
        });

        ResultSummary {
            verdict,
            headline,
            outcome_message: if verdict.is_approved() { APPROVED_MESSAGE } else { REJECTED_MESSAGE },
            confidence: Percentage::from_fraction(response.confidence),
            factors,
            echo: self.echo(response),
            service_message: response.message.clone(),
        }
    }

    fn echo(&self, response: &PredictionResponse) -> Vec<EchoItem> {
        vec![
            EchoItem {
                label: "Applicant Income",
                value: self.amount(response.echoed(LoanField::ApplicantIncome)),
            },
            EchoItem {
                label: "Loan Amount",
                value: self.amount(response.echoed(LoanField::LoanAmount)),
            },
            EchoItem {
                label: "Credit History",
                value: credit_history_label(response.echoed(LoanField::CreditHistory)).to_string(),
            },
            EchoItem {
                label: "Education",
                value: plain_value(response.echoed(LoanField::Education)),
            },
        ]
    }

    fn amount(&self, value: Option<&Value>) -> String {
        let parsed = match value {
            Some(Value::Number(n)) => Money::parse(&n.to_string(), self.currency).ok(),
            Some(Value::String(s)) => Money::parse(s, self.currency).ok(),
            _ => None,
        };
        match parsed {
            Some(money) => money.to_string(),
            None => plain_value(value),
        }
    }
}

/// "Good" only for a numeric 1; everything else is "Poor"
pub fn credit_history_label(value: Option<&Value>) -> &'static str {
    let is_good = value
        .and_then(Value::as_f64)
        .is_some_and(|n| n == 1.0);
    if is_good {
        "Good"
    } else {
        "Poor"
    }
}

fn plain_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => MISSING_VALUE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Turns a feature name into a label
///
/// Underscores become spaces and a space goes before each ASCII capital that
/// is not already preceded by one: `ApplicantIncome` → `Applicant Income`,
/// `Loan_Amount_Term` → `Loan Amount Term`.
pub fn humanize_label(feature: &str) -> String {
    let mut label = String::with_capacity(feature.len() + 4);
    let mut previous: Option<char> = None;
    for ch in feature.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_ascii_uppercase() && previous.is_some_and(|p| p != ' ') {
            label.push(' ');
        }
        label.push(ch);
        previous = Some(ch);
    }
    label.trim().to_string()
}
