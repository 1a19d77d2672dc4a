//! # App Error Type
//!
//! Everything that can stop a scenario run, with a machine-readable code.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  config file ──── toml::de::Error ─────┐                                │
//! │  scenario file ── serde_json::Error ───┤                                │
//! │  filesystem ───── io::Error ───────────┼──► AppError ──► stderr report  │
//! │  session step ─── CoreError ───────────┘        │        { code, msg }  │
//! │                                                 └──► exit code 1        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use serde::Serialize;
use tally_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type for the checkout app.
pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid scenario: {0}")]
    Scenario(#[from] serde_json::Error),

    #[error("Step {step} ({op}) failed: {source}")]
    Step {
        step: usize,
        op: &'static str,
        #[source]
        source: CoreError,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidConfig(err.to_string())
    }
}

/// Error codes for the stderr report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product, tier, line or campaign does not exist
    NotFound,
    /// Input failed a validation rule
    ValidationError,
    /// Checkout blocked by bad cart data
    CheckoutBlocked,
    /// Business rule rejected the action
    BusinessLogic,
    /// Config file or environment problem
    ConfigError,
    /// Filesystem or parse failure
    Internal,
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Io { .. } | AppError::Scenario(_) => ErrorCode::Internal,
            AppError::ConfigParse(_) | AppError::InvalidConfig(_) => ErrorCode::ConfigError,
            AppError::Step { source, .. } | AppError::Core(source) => core_code(source),
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

fn core_code(err: &CoreError) -> ErrorCode {
    match err {
        CoreError::LineNotFound(_)
        | CoreError::ProductNotFound(_)
        | CoreError::TierNotFound { .. }
        | CoreError::CampaignNotFound(_) => ErrorCode::NotFound,
        CoreError::Validation(_) => ErrorCode::ValidationError,
        CoreError::EmptyCart | CoreError::InvalidTierQuantity { .. } => ErrorCode::CheckoutBlocked,
        CoreError::CampaignNotApplicable { .. } | CoreError::NoCustomerSelected => {
            ErrorCode::BusinessLogic
        }
    }
}

/// What the user sees when a run fails.
///
/// ```json
/// { "code": "NOT_FOUND", "message": "Step 2 (add) failed: Product not found: p9" }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
}
