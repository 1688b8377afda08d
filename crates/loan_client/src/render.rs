//! Plain-text rendering of a screen

use std::fmt::Write;

use core_kernel::{AdapterHealth, HealthCheckResult, Percentage};
use domain_loan::{LoanApplication, LoanField, ModelInfo, ResultSummary, ValidationErrors};

use crate::connectivity::{ConnectivityState, SERVICE_DOWN_MESSAGE};
use crate::shell::{Screen, View};

const BAR_WIDTH: usize = 20;

/// Renders a screen as terminal text
pub fn render(screen: &Screen) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}]", screen.status.indicator());

    if let Some(banner) = &screen.banner {
        let _ = writeln!(out, "! {}", banner);
    }
    out.push('\n');

    match &screen.view {
        View::ConnectionError => render_connection_error(&mut out),
        View::Result(summary) => render_result(&mut out, summary),
        View::Form {
            form,
            errors,
            loading,
        } => render_form(&mut out, form, errors, *loading),
    }
    out
}

/// Draws a fixed-width bar filled to the percentage
pub fn confidence_bar(confidence: &Percentage) -> String {
    let filled = (confidence.fill_fraction() * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn render_connection_error(out: &mut String) {
    out.push_str("Backend Connection Required\n");
    out.push_str("Please start the prediction service to use the prediction system.\n\n");
    out.push_str("Quick Setup:\n");
    out.push_str("  1. Navigate to the prediction service directory\n");
    out.push_str("  2. Install its dependencies\n");
    out.push_str("  3. Train the model\n");
    out.push_str("  4. Start the service (default http://localhost:5000)\n\n");
    out.push_str("Retry to check the connection again.\n");
}

fn render_result(out: &mut String, summary: &ResultSummary) {
    let _ = writeln!(out, "{}", summary.headline);
    let _ = writeln!(out, "{}", summary.outcome_message);
    if let Some(message) = &summary.service_message {
        let _ = writeln!(out, "{}", message);
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "Confidence: {} [{}]",
        summary.confidence,
        confidence_bar(&summary.confidence)
    );

    if let Some(factors) = &summary.factors {
        out.push_str("\nKey Factors Considered:\n");
        for factor in factors {
            let _ = writeln!(
                out,
                "  {:<20} {:>6} [{}]",
                factor.label,
                factor.importance.to_string(),
                confidence_bar(&factor.importance)
            );
        }
    }

    out.push_str("\nApplication Summary:\n");
    for item in &summary.echo {
        let _ = writeln!(out, "  {:<18} {}", format!("{}:", item.label), item.value);
    }
}

fn render_form(out: &mut String, form: &LoanApplication, errors: &ValidationErrors, loading: bool) {
    out.push_str("Loan Application\n");
    for field in LoanField::ALL {
        let value = form.text(field);
        let shown = if value.is_empty() { "-".to_string() } else { display_value(field, &value) };
        let _ = writeln!(out, "  {:<24} {}", field.label(), shown);
        if let Some(error) = errors.get(field) {
            let _ = writeln!(out, "  {:<24} ^ {}", "", error);
        }
    }
    if loading {
        out.push_str("\nPredicting...\n");
    }
}

fn display_value(field: LoanField, value: &str) -> String {
    match field.find_option(value) {
        Some(option) => option.label.to_string(),
        None => value.to_string(),
    }
}

/// Renders model metadata
pub fn render_model_info(info: &ModelInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Model: {}", info.model_type);
    let _ = writeln!(out, "Loaded: {}", if info.model_loaded { "yes" } else { "no" });
    if let Some(description) = &info.description {
        let _ = writeln!(out, "{}", description);
    }
    if !info.features.is_empty() {
        let _ = writeln!(out, "Features: {}", info.features.join(", "));
    }
    if let Some(importance) = &info.feature_importance {
        out.push_str("Feature importance:\n");
        for weight in importance.iter() {
            let _ = writeln!(
                out,
                "  {:<20} {}",
                weight.feature,
                Percentage::from_fraction(weight.importance)
            );
        }
    }
    out
}

/// Renders a health report for the `check` command
///
/// A degraded service still counts as connected.
pub fn render_health(report: &HealthCheckResult) -> String {
    let state = if report.status.is_reachable() {
        ConnectivityState::Connected
    } else {
        ConnectivityState::Disconnected
    };

    let mut out = String::new();
    let _ = writeln!(out, "[{}]", state.indicator());
    let _ = writeln!(out, "Service: {} ({} ms)", report.status, report.latency_ms);
    if report.status == AdapterHealth::Unhealthy {
        let _ = writeln!(out, "{}", SERVICE_DOWN_MESSAGE);
    }
    if let Some(message) = &report.message {
        let _ = writeln!(out, "Details: {}", message);
    }
    out
}
