//! # Checkout Configuration
//!
//! Store-level pricing defaults and runner settings.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TALLY_TAX_RATE=0.0825  TALLY_TAX_NAME="Sales Tax"                  │
//! │     TALLY_POINT_VALUE=0.02 TALLY_LOCATION_ID=downtown                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/pos/checkout.toml (Linux)                                │
//! │     ~/Library/Application Support/com.tally.pos/checkout.toml (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     8% "Tax", 1 point = $0.01                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [pricing]
//! tax_rate = "0.08"
//! tax_name = "Tax"
//! point_value = "0.01"
//!
//! [store]
//! location_id = "downtown"
//!
//! [output]
//! pretty = true
//! ```

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::validation::validate_tax_rate;
use tally_core::{Money, PricingDefaults, TaxRate, ValidationError};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

/// Store the runner prices for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Location used for tax when a scenario does not name one.
    #[serde(default)]
    pub location_id: Option<String>,
}

/// How results are printed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub pretty: bool,
}

/// Complete runner configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default)]
    pub pricing: PricingDefaults,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub output: OutputSettings,
}

impl CheckoutConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (checkout.toml)
    /// 3. Environment variables
    ///
    /// An explicitly given path must exist; the platform default may not.
    pub fn load(config_path: Option<&Path>) -> AppResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<&Path>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load checkout config: {}. Using defaults.", e);
            Self::default()
        })
    }

    fn from_file(path: &Path) -> AppResult<Self> {
        info!(?path, "Loading checkout config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        validate_tax_rate(self.pricing.tax_rate)?;

        if self.pricing.tax_name.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "pricing.tax_name".to_string(),
            }
            .into());
        }

        if self.pricing.point_value.is_negative() {
            return Err(ValidationError::MustNotBeNegative {
                field: "pricing.point_value".to_string(),
            }
            .into());
        }

        if let Some(id) = &self.store.location_id {
            if id.trim().is_empty() {
                return Err(AppError::InvalidConfig(
                    "store.location_id must not be blank".into(),
                ));
            }
        }

        Ok(())
    }

    /// Applies `TALLY_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(rate) = var("TALLY_TAX_RATE") {
            match rate.parse::<Decimal>() {
                Ok(fraction) => {
                    debug!(%fraction, "Overriding tax rate from environment");
                    self.pricing.tax_rate = TaxRate::from_fraction(fraction);
                }
                Err(_) => warn!(value = %rate, "Ignoring unparseable TALLY_TAX_RATE"),
            }
        }

        if let Some(name) = var("TALLY_TAX_NAME") {
            self.pricing.tax_name = name;
        }

        if let Some(value) = var("TALLY_POINT_VALUE") {
            match value.parse::<Money>() {
                Ok(point_value) => {
                    debug!(%point_value, "Overriding point value from environment");
                    self.pricing.point_value = point_value;
                }
                Err(_) => warn!(value = %value, "Ignoring unparseable TALLY_POINT_VALUE"),
            }
        }

        if let Some(id) = var("TALLY_LOCATION_ID") {
            debug!(location_id = %id, "Overriding location from environment");
            self.store.location_id = Some(id);
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tally", "pos")
            .map(|dirs| dirs.config_dir().join("checkout.toml"))
    }
}
