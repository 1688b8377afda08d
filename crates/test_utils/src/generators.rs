//! Property-Based Test Generators
//!
//! Proptest strategies for form values and service responses.

use proptest::prelude::*;

use domain_loan::{FieldValue, LoanApplication, LoanField, PredictionResponse};

use crate::builders::PredictionResponseBuilder;

/// Strategy for any field
pub fn field_strategy() -> impl Strategy<Value = LoanField> {
    proptest::sample::select(LoanField::ALL.to_vec())
}

/// Strategy for a value accepted by a select field
pub fn option_value_strategy(field: LoanField) -> BoxedStrategy<String> {
    match field.options() {
        Some(options) => proptest::sample::select(options.to_vec())
            .prop_map(|option| option.value.to_string())
            .boxed(),
        None => (0u32..100_000).prop_map(|n| n.to_string()).boxed(),
    }
}

/// Strategy for complete, valid applications
pub fn valid_application_strategy() -> impl Strategy<Value = LoanApplication> {
    let strategies: Vec<BoxedStrategy<(LoanField, String)>> = LoanField::ALL
        .iter()
        .map(|field| {
            let field = *field;
            option_value_strategy(field).prop_map(move |value| (field, value)).boxed()
        })
        .collect();

    strategies.prop_map(|values| {
        values
            .into_iter()
            .fold(LoanApplication::new(), |app, (field, value)| {
                app.with(field, FieldValue::from(value))
            })
    })
}

/// Strategy for the prediction value, mostly near-misses of "Approved"
pub fn prediction_value_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Approved".to_string()),
        Just("approved".to_string()),
        Just("APPROVED".to_string()),
        Just("Rejected".to_string()),
        Just(String::new()),
        "[A-Za-z]{1,10}",
    ]
}

/// Strategy for well-formed responses
pub fn response_strategy() -> impl Strategy<Value = PredictionResponse> {
    (prediction_value_strategy(), 0.0f64..=1.0, 0usize..9).prop_map(
        |(prediction, confidence, factor_count)| {
            let factors: Vec<(String, f64)> = (0..factor_count)
                .map(|i| (format!("Feature_{}", i), 1.0 / (i as f64 + 2.0)))
                .collect();
            let builder = PredictionResponseBuilder::new()
                .prediction(prediction)
                .confidence(confidence);
            if factors.is_empty() {
                builder.build()
            } else {
                builder.importance(factors).build()
            }
        },
    )
}
