//! Form snapshots read from disk for one-shot predictions

use serde_json::{Map, Value};
use std::path::Path;

use domain_loan::LoanApplication;

use crate::error::ClientError;

/// Reads a JSON object keyed by field wire name
pub async fn read_snapshot(path: &Path) -> Result<LoanApplication, ClientError> {
    let text = tokio::fs::read_to_string(path).await?;
    parse_snapshot(&text)
}

/// Parses a snapshot document
pub fn parse_snapshot(text: &str) -> Result<LoanApplication, ClientError> {
    let snapshot: Map<String, Value> = serde_json::from_str(text)?;
    Ok(LoanApplication::from_snapshot(snapshot)?)
}
