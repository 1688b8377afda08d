//! Prediction service adapters
//!
//! - **HttpPredictionAdapter**: talks to the real service over HTTP
//! - **MockPredictionPort**: scripted in-memory port (in `ports::mock`)

pub mod http;

pub use http::{HttpPredictionAdapter, PredictionServiceConfig, REQUEST_ID_HEADER};
