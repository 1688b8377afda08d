//! Core Kernel - Foundational types and utilities for the loan prediction client
//!
//! This crate provides the building blocks shared by the domain and client crates:
//! - Error types for kernel-level failures and port (adapter) boundaries
//! - Port infrastructure: health checks and operation metadata
//! - Identifiers for correlating requests with the prediction service
//! - Display types for money amounts and percentages

pub mod money;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use money::{Money, Currency, MoneyError, Percentage, group_thousands};
pub use identifiers::{CorrelationId, SessionId, RequestId, RequestSequence};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, AdapterHealth, HealthCheckResult, HealthCheckable,
    OperationMetadata,
};
