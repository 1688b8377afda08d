//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! loan prediction client test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built applications and service responses
//! - `builders`: Builder patterns for service responses
//! - `stub_service`: In-process HTTP stub of the prediction service
//! - `assertions`: Custom assertion helpers for screens and validation
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod stub_service;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use stub_service::*;
pub use assertions::*;
pub use generators::*;
