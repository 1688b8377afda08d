//! Test Data Builders
//!
//! Builders for service responses, so tests only spell out the fields they
//! care about.

use serde_json::{Map, Value};

use domain_loan::{FeatureImportance, LoanField, PredictionResponse};

/// Builder for prediction responses
pub struct PredictionResponseBuilder {
    prediction: Option<String>,
    confidence: f64,
    feature_importance: Option<FeatureImportance>,
    input_data: Map<String, Value>,
    message: Option<String>,
}

impl Default for PredictionResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionResponseBuilder {
    /// Creates an approved response with 0.8 confidence and nothing else
    pub fn new() -> Self {
        Self {
            prediction: Some("Approved".to_string()),
            confidence: 0.8,
            feature_importance: None,
            input_data: Map::new(),
            message: None,
        }
    }

    /// Sets the prediction value
    pub fn prediction(mut self, prediction: impl Into<String>) -> Self {
        self.prediction = Some(prediction.into());
        self
    }

    /// Removes the prediction value
    pub fn without_prediction(mut self) -> Self {
        self.prediction = None;
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Sets feature importances in the given order
    pub fn importance<S: Into<String>>(mut self, pairs: impl IntoIterator<Item = (S, f64)>) -> Self {
        self.feature_importance = Some(FeatureImportance::from_pairs(pairs));
        self
    }

    /// Adds an echoed input value
    pub fn echo(mut self, field: LoanField, value: impl Into<Value>) -> Self {
        self.input_data.insert(field.wire_name().to_string(), value.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn build(self) -> PredictionResponse {
        PredictionResponse {
            prediction: self.prediction,
            confidence: self.confidence,
            feature_importance: self.feature_importance,
            input_data: self.input_data,
            message: self.message,
        }
    }
}
