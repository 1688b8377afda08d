//! Loan Prediction Client
//!
//! Drives one applicant session against the prediction service:
//!
//! - **Connectivity Monitor**: startup probe, retry, status indicator
//! - **Submission Coordinator**: validation gate, request ids, loading flag
//! - **Application Shell**: reducer-driven state, view selection, error banner
//!
//! # Example
//!
//! ```rust,ignore
//! use loan_client::{Shell, render};
//! use domain_loan::{HttpPredictionAdapter, ResultPresenter};
//! use std::sync::Arc;
//!
//! let port = Arc::new(HttpPredictionAdapter::new(config.prediction_service())?);
//! let mut shell = Shell::new(port, ResultPresenter::default());
//! shell.start();
//! shell.settle().await;
//! println!("{}", render::render(&shell.screen()));
//! ```

pub mod config;
pub mod error;
pub mod connectivity;
pub mod coordinator;
pub mod state;
pub mod shell;
pub mod render;
pub mod snapshot;

pub use config::ClientConfig;
pub use error::ClientError;
pub use connectivity::{ConnectivityMonitor, ConnectivityState, SERVICE_DOWN_MESSAGE};
pub use coordinator::{SubmissionState, SubmitOutcome, MODEL_INFO_FAILED, PREDICTION_FAILED};
pub use state::{reduce, Action, AppState, Effect};
pub use shell::{Screen, Shell, View};
