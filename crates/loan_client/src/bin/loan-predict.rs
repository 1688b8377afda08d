//! Loan Prediction Client - command line binary
//!
//! # Usage
//!
//! ```bash
//! # Check that the prediction service is up and its model loaded
//! loan-predict check
//!
//! # Predict from a JSON form snapshot
//! loan-predict predict --file application.json
//!
//! # Fill in the form field by field
//! loan-predict interactive
//!
//! # Show the model behind the service
//! loan-predict model-info
//! ```
//!
//! # Environment Variables
//!
//! * `LOAN_SERVICE_URL` - Prediction service URL (default: http://localhost:5000)
//! * `LOAN_TIMEOUT_SECS` - Request timeout (default: 30)
//! * `LOAN_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `LOAN_CURRENCY` - Currency for amounts: USD, EUR, GBP, INR, JPY (default: USD)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::HealthCheckable;
use domain_loan::{FieldValue, LoanApplication, LoanField, PredictionPort, ResultPresenter};
use loan_client::coordinator::fetch_model_info;
use loan_client::render::{render, render_health, render_model_info};
use loan_client::snapshot::read_snapshot;
use loan_client::{Action, ClientConfig, ConnectivityState, Shell, View};

#[derive(Parser)]
#[command(name = "loan-predict")]
#[command(author, version, about = "Loan approval prediction client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Prediction service URL (overrides configuration)
    #[arg(long, global = true)]
    service_url: Option<String>,

    /// Configuration file (default: ./loan-predict.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the prediction service's health, including whether its model is loaded
    Check,

    /// Submit a form snapshot read from a JSON file
    Predict {
        /// JSON object keyed by field name
        #[arg(short, long)]
        file: PathBuf,

        /// Print the result summary as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Fill in the application interactively
    Interactive,

    /// Show information about the prediction model
    ModelInfo,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = ClientConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(url) = cli.service_url.clone() {
        config = config.with_service_url(url);
    }

    init_tracing(if cli.verbose { "debug" } else { &config.log_level });

    let currency = config.currency()?;
    let port: Arc<dyn PredictionPort> = Arc::new(config.connect()?);
    let presenter = ResultPresenter::new(currency);

    tracing::debug!(service_url = %config.service_url, "Configuration loaded");

    match cli.command {
        Commands::Check => {
            let report = port.health_check().await;
            print!("{}", render_health(&report));
        }
        Commands::Predict { file, json } => {
            let application = read_snapshot(&file)
                .await
                .with_context(|| format!("failed to load application snapshot {}", file.display()))?;
            predict_once(port, presenter, application, json).await?;
        }
        Commands::Interactive => {
            interactive(port, presenter).await?;
        }
        Commands::ModelInfo => match fetch_model_info(port.as_ref()).await {
            Ok(info) => print!("{}", render_model_info(&info)),
            Err(message) => println!("{}", message),
        },
    }

    Ok(())
}

/// Initializes the tracing subscriber
///
/// Logs go to stderr so rendered views on stdout stay clean.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn predict_once(
    port: Arc<dyn PredictionPort>,
    presenter: ResultPresenter,
    application: LoanApplication,
    json: bool,
) -> Result<()> {
    let mut shell = Shell::new(port, presenter);
    shell.start();
    shell.settle().await;

    if shell.screen().status == ConnectivityState::Connected {
        for (field, value) in application.fields() {
            shell.dispatch(Action::FieldChanged { field, value });
        }
        shell.dispatch(Action::SubmitRequested);
        shell.settle().await;
    }

    let screen = shell.screen();
    match (&screen.view, json) {
        (View::Result(summary), true) => println!("{}", serde_json::to_string_pretty(summary)?),
        _ => print!("{}", render(&screen)),
    }
    Ok(())
}

type Input = Lines<BufReader<Stdin>>;

async fn prompt(input: &mut Input, text: &str) -> Result<Option<String>> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    Ok(input.next_line().await?.map(|line| line.trim().to_string()))
}

/// Asks for one field; select fields only accept one of their options
async fn ask_field(input: &mut Input, field: LoanField) -> Result<Option<FieldValue>> {
    let Some(options) = field.options() else {
        return Ok(prompt(input, &format!("{}: ", field.label())).await?.map(FieldValue::from));
    };

    let choices: Vec<String> = options
        .iter()
        .enumerate()
        .map(|(i, option)| format!("{}) {}", i + 1, option.label))
        .collect();
    loop {
        let text = format!("{} [{}]: ", field.label(), choices.join(", "));
        let Some(answer) = prompt(input, &text).await? else {
            return Ok(None);
        };
        let chosen = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| options.get(i))
            .or_else(|| field.find_option(&answer));
        match chosen {
            Some(option) => return Ok(Some(FieldValue::from(option.value))),
            None => println!("  Please choose one of the listed options"),
        }
    }
}

async fn interactive(port: Arc<dyn PredictionPort>, presenter: ResultPresenter) -> Result<()> {
    let mut input: Input = BufReader::new(tokio::io::stdin()).lines();
    let mut shell = Shell::new(port, presenter);
    shell.start();
    shell.settle().await;

    loop {
        let screen = shell.screen();
        print!("{}", render(&screen));
        if screen.banner.is_some() {
            shell.dispatch(Action::DismissError);
        }

        match screen.view {
            View::ConnectionError => {
                match prompt(&mut input, "Check connection again? [Y/n]: ").await?.as_deref() {
                    None | Some("n") | Some("N") => return Ok(()),
                    Some(_) => {
                        shell.retry()?;
                        shell.settle().await;
                    }
                }
            }
            View::Result(_) => {
                match prompt(&mut input, "New application? [y/N]: ").await?.as_deref() {
                    Some("y") | Some("Y") => shell.dispatch(Action::Reset),
                    _ => return Ok(()),
                }
            }
            View::Form { form, errors, .. } => {
                // First pass asks every field, later passes only the ones in error
                let fields: Vec<LoanField> = if errors.is_empty() {
                    LoanField::ALL.iter().copied().filter(|f| form.is_blank(*f)).collect()
                } else {
                    errors.fields()
                };
                if fields.is_empty() {
                    match prompt(&mut input, "Submit again? [Y/n]: ").await?.as_deref() {
                        None | Some("n") | Some("N") => return Ok(()),
                        Some(_) => {}
                    }
                }
                for field in fields {
                    match ask_field(&mut input, field).await? {
                        Some(value) => shell.dispatch(Action::FieldChanged { field, value }),
                        None => return Ok(()),
                    }
                }
                shell.dispatch(Action::SubmitRequested);
                shell.settle().await;
            }
        }
    }
}
