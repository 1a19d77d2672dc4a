//! # Tally Checkout Runner
//!
//! Command-line shell around `tally-core`.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Runner Startup                                       │
//! │                                                                         │
//! │  1. Initialize Logging (tracing → stderr)                               │
//! │     └── RUST_LOG or "info,tally=debug"                                  │
//! │                                                                         │
//! │  2. Parse Arguments (clap)                                              │
//! │                                                                         │
//! │  3. Load Configuration                                                  │
//! │     └── defaults → checkout.toml → TALLY_* env → validate               │
//! │                                                                         │
//! │  4. Run Command                                                         │
//! │     ├── price:  replay scenario, print report JSON to stdout            │
//! │     └── config: print effective configuration as TOML                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod error;
pub mod scenario;

use config::CheckoutConfig;
use error::AppResult;
use scenario::Scenario;

/// Tally POS checkout pricing runner
#[derive(Debug, Parser)]
#[command(name = "tally-checkout", version, about)]
pub struct Cli {
    /// Config file (defaults to the platform config dir's checkout.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay a checkout scenario and print the totals
    Price {
        /// Scenario JSON file
        #[arg(short, long)]
        scenario: PathBuf,

        /// Pretty-print the JSON report
        #[arg(short, long)]
        pretty: bool,

        /// Abort on the first rejected step
        #[arg(long)]
        strict: bool,
    },

    /// Print the effective configuration
    Config,
}

/// Entry point used by `main`.
pub fn run() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match execute(&cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(code = ?err.code(), "{}", err);
            match serde_json::to_string(&err.report()) {
                Ok(report) => eprintln!("{}", report),
                Err(_) => eprintln!("{}", err),
            }
            ExitCode::FAILURE
        }
    }
}

/// Runs one parsed command and returns what to print.
pub fn execute(cli: &Cli) -> AppResult<String> {
    let config = CheckoutConfig::load(cli.config.as_deref())?;

    match &cli.command {
        Command::Price {
            scenario,
            pretty,
            strict,
        } => {
            info!(?scenario, "Pricing scenario");
            let loaded = Scenario::from_file(scenario)?;
            let report = loaded.replay(
                config.pricing.clone(),
                config.store.location_id.as_deref(),
                *strict,
            )?;

            let output = if *pretty || config.output.pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            Ok(output)
        }
        Command::Config => toml::to_string_pretty(&config)
            .map_err(|e| error::AppError::InvalidConfig(e.to_string())),
    }
}

/// Initializes the tracing subscriber for logging.
///
/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tally=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
