//! Pre-built Test Fixtures
//!
//! Ready-to-use applications and service responses. The values follow the
//! public loan-prediction dataset the service model is trained on.

use serde_json::{json, Value};

use domain_loan::{FeatureImportance, LoanApplication, LoanField, ModelInfo, PredictionResponse};

/// Fixture for loan application snapshots
pub struct ApplicationFixtures;

impl ApplicationFixtures {
    /// A complete, valid application with good credit history
    pub fn approvable() -> LoanApplication {
        LoanApplication::new()
            .with(LoanField::Gender, "Male")
            .with(LoanField::Married, "Yes")
            .with(LoanField::Dependents, "0")
            .with(LoanField::Education, "Graduate")
            .with(LoanField::SelfEmployed, "No")
            .with(LoanField::ApplicantIncome, "5849")
            .with(LoanField::CoapplicantIncome, "0")
            .with(LoanField::LoanAmount, "146")
            .with(LoanField::LoanAmountTerm, "360")
            .with(LoanField::CreditHistory, "1")
            .with(LoanField::PropertyArea, "Urban")
    }

    /// A complete, valid application with poor credit history
    pub fn poor_credit() -> LoanApplication {
        LoanApplication::new()
            .with(LoanField::Gender, "Female")
            .with(LoanField::Married, "No")
            .with(LoanField::Dependents, "3+")
            .with(LoanField::Education, "Not Graduate")
            .with(LoanField::SelfEmployed, "Yes")
            .with(LoanField::ApplicantIncome, "2333")
            .with(LoanField::CoapplicantIncome, "1516")
            .with(LoanField::LoanAmount, "95")
            .with(LoanField::LoanAmountTerm, "180")
            .with(LoanField::CreditHistory, "0")
            .with(LoanField::PropertyArea, "Rural")
    }

    /// The approvable application as a JSON snapshot
    pub fn approvable_json() -> Value {
        json!({
            "Gender": "Male",
            "Married": "Yes",
            "Dependents": "0",
            "Education": "Graduate",
            "Self_Employed": "No",
            "ApplicantIncome": "5849",
            "CoapplicantIncome": "0",
            "LoanAmount": "146",
            "Loan_Amount_Term": "360",
            "Credit_History": "1",
            "Property_Area": "Urban"
        })
    }
}

/// Fixture for prediction service responses
pub struct ResponseFixtures;

impl ResponseFixtures {
    /// Approved with 0.91 confidence and no feature importance
    pub fn approved() -> PredictionResponse {
        PredictionResponse {
            prediction: Some("Approved".to_string()),
            confidence: 0.91,
            feature_importance: None,
            input_data: Self::echo(5849, 146, 1, "Graduate"),
            message: None,
        }
    }

    /// Rejected with seven feature importances
    pub fn rejected_with_factors() -> PredictionResponse {
        PredictionResponse {
            prediction: Some("Rejected".to_string()),
            confidence: 0.7342,
            feature_importance: Some(Self::seven_factors()),
            input_data: Self::echo(2333, 95, 0, "Not Graduate"),
            message: Some("Credit history weighs heavily on this decision".to_string()),
        }
    }

    /// Seven importances in a deliberately unsorted order
    pub fn seven_factors() -> FeatureImportance {
        FeatureImportance::from_pairs([
            ("Credit_History", 0.2841),
            ("ApplicantIncome", 0.1964),
            ("LoanAmount", 0.1823),
            ("CoapplicantIncome", 0.1102),
            ("Loan_Amount_Term", 0.0517),
            ("Property_Area", 0.0722),
            ("Married", 0.0298),
        ])
    }

    fn echo(income: i64, amount: i64, credit: i64, education: &str) -> serde_json::Map<String, Value> {
        let value = json!({
            "ApplicantIncome": income,
            "LoanAmount": amount,
            "Credit_History": credit,
            "Education": education
        });
        match value {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        }
    }
}

/// Fixture for model metadata
pub struct ModelInfoFixtures;

impl ModelInfoFixtures {
    pub fn random_forest() -> ModelInfo {
        ModelInfo {
            model_type: "RandomForestClassifier".to_string(),
            features: LoanField::ALL.iter().map(|f| f.wire_name().to_string()).collect(),
            model_loaded: true,
            description: Some("Loan approval prediction model".to_string()),
            feature_importance: Some(ResponseFixtures::seven_factors()),
        }
    }
}
