//! Loan domain errors

use thiserror::Error;

use crate::application::LoanField;

/// Errors raised while reading a form snapshot
#[derive(Debug, Error)]
pub enum LoanError {
    /// A field name that is not part of the application
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// A snapshot value that is neither text nor a number
    #[error("{field} must be text or a number, got {value}")]
    UnsupportedValue { field: LoanField, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_field() {
        let unknown = LoanError::UnknownField("Income".to_string());
        assert_eq!(unknown.to_string(), "Unknown field: Income");

        let unsupported = LoanError::UnsupportedValue {
            field: LoanField::CreditHistory,
            value: "true".to_string(),
        };
        assert_eq!(unsupported.to_string(), "Credit_History must be text or a number, got true");
    }
}
