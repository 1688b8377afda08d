//! Client error handling

use thiserror::Error;

use core_kernel::{CoreError, PortError};
use domain_loan::LoanError;

/// Errors raised outside the session loop
///
/// Service failures inside a session never surface here; they become
/// banner messages.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Loan(#[from] LoanError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Illegal action: {0}")]
    IllegalAction(String),
}
