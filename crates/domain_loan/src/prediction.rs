//! Prediction service payloads
//!
//! # Feature importance ordering
//!
//! `feature_importance` arrives as a JSON object. Its entries are kept in the
//! order the keys appear in the response body; nothing re-sorts them. The
//! service already sends them most-important first, and the result view
//! takes the leading entries as the ranking.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

use crate::application::LoanField;

/// The prediction value that counts as an approval
pub const APPROVED: &str = "Approved";

/// Importance of one model feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight {
    pub feature: String,
    pub importance: f64,
}

/// Feature importances in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureImportance {
    weights: Vec<FeatureWeight>,
}

impl FeatureImportance {
    /// Builds from `(feature, importance)` pairs, keeping their order
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            weights: pairs
                .into_iter()
                .map(|(feature, importance)| FeatureWeight {
                    feature: feature.into(),
                    importance,
                })
                .collect(),
        }
    }

    /// Returns the number of features
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Returns true if there are no features
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Iterates in document order
    pub fn iter(&self) -> impl Iterator<Item = &FeatureWeight> {
        self.weights.iter()
    }

    /// Returns at most the first `n` entries
    pub fn leading(&self, n: usize) -> &[FeatureWeight] {
        &self.weights[..n.min(self.weights.len())]
    }
}

impl Serialize for FeatureImportance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.weights.len()))?;
        for weight in &self.weights {
            map.serialize_entry(&weight.feature, &weight.importance)?;
        }
        map.end()
    }
}

struct FeatureImportanceVisitor;

impl<'de> Visitor<'de> for FeatureImportanceVisitor {
    type Value = FeatureImportance;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map from feature name to importance")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut weights = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((feature, importance)) = access.next_entry::<String, f64>()? {
            weights.push(FeatureWeight { feature, importance });
        }
        Ok(FeatureImportance { weights })
    }
}

impl<'de> Deserialize<'de> for FeatureImportance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FeatureImportanceVisitor)
    }
}

/// Response to `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// "Approved", or anything else for a rejection
    #[serde(default)]
    pub prediction: Option<String>,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Importances, present only for models that expose them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importance: Option<FeatureImportance>,
    /// The submitted application as the service saw it
    #[serde(default)]
    pub input_data: Map<String, Value>,
    /// The service's own explanation, if it sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PredictionResponse {
    /// Returns true only for the exact value "Approved"
    pub fn is_approved(&self) -> bool {
        self.prediction.as_deref() == Some(APPROVED)
    }

    /// Returns the echoed value of a field
    pub fn echoed(&self, field: LoanField) -> Option<&Value> {
        self.input_data
            .get(field.wire_name())
            .filter(|value| !value.is_null())
    }
}

/// Response to `GET /`
///
/// Reachability alone decides connectivity; the body is informational.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub model_loaded: Option<bool>,
    #[serde(default)]
    pub version: Option<String>,
}

/// Response to `GET /model-info`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(default)]
    pub model_type: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importance: Option<FeatureImportance>,
}
