//! Client configuration
//!
//! Sources, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. `loan-predict.toml` in the working directory (optional), or an explicit file
//! 3. `LOAN_*` environment variables (`LOAN_SERVICE_URL`, `LOAN_TIMEOUT_SECS`,
//!    `LOAN_LOG_LEVEL`, `LOAN_CURRENCY`)

use serde::Deserialize;
use std::path::Path;

use core_kernel::{CoreError, Currency};
use domain_loan::{HttpPredictionAdapter, PredictionServiceConfig};

use crate::error::ClientError;

/// Default configuration file name, without extension
pub const CONFIG_FILE: &str = "loan-predict";

/// Client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Prediction service base URL
    pub service_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Log level
    pub log_level: String,
    /// Currency code used for amounts in the result view
    pub currency: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
            log_level: "info".to_string(),
            currency: "USD".to_string(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default file and the environment
    pub fn load(file: Option<&Path>) -> Result<Self, ClientError> {
        Self::load_from(
            file,
            config::Environment::with_prefix("LOAN").try_parsing(true),
        )
    }

    /// Loads configuration with an explicit environment source
    pub fn load_from(file: Option<&Path>, env: config::Environment) -> Result<Self, ClientError> {
        let defaults = Self::default();
        let file_source = match file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(CONFIG_FILE).required(false),
        };

        let loaded: ClientConfig = config::Config::builder()
            .set_default("service_url", defaults.service_url)?
            .set_default("timeout_secs", defaults.timeout_secs)?
            .set_default("log_level", defaults.log_level)?
            .set_default("currency", defaults.currency)?
            .add_source(file_source)
            .add_source(env)
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Returns a copy pointing at a different service
    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = url.into();
        self
    }

    /// Parses the configured currency
    pub fn currency(&self) -> Result<Currency, ClientError> {
        self.currency
            .parse::<Currency>()
            .map_err(|e| ClientError::Core(CoreError::from(e)))
    }

    /// Settings for the HTTP adapter
    pub fn prediction_service(&self) -> PredictionServiceConfig {
        PredictionServiceConfig {
            base_url: self.service_url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    /// Builds the HTTP adapter for the configured service
    pub fn connect(&self) -> Result<HttpPredictionAdapter, ClientError> {
        Ok(HttpPredictionAdapter::new(self.prediction_service())?)
    }

    fn validate(&self) -> Result<(), ClientError> {
        if self.service_url.trim().is_empty() {
            return Err(CoreError::configuration("service_url must not be empty").into());
        }
        if self.timeout_secs == 0 {
            return Err(CoreError::configuration("timeout_secs must be positive").into());
        }
        self.currency()?;
        Ok(())
    }
}
