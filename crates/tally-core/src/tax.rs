//! # Tax Adapter
//!
//! Resolves the tax rate and amount for the checkout's location.
//!
//! ## Fallback
//! ```text
//! quote(amount, Some("loc-downtown"))  ──► table hit ──► location rate
//! quote(amount, Some("loc-unknown"))   ──┐
//! quote(amount, None)                  ──┴─► default rate (8%, "Tax")
//! ```
//! Tax is always computable; a missing location never blocks checkout.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::money::Money;
use crate::types::{LocationTaxConfig, PricingDefaults, TaxRate};

/// Tax resolved for one amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxQuote {
    /// Rounded to cents.
    pub tax_amount: Money,
    pub tax_rate: TaxRate,
    pub tax_name: String,
}

/// Seam for tax resolution.
///
/// Implementations must not fail: when they cannot resolve a location they
/// fall back to a default rate.
pub trait TaxAdapter: fmt::Debug + Send + Sync {
    fn quote(&self, amount: Money, location_id: Option<&str>) -> TaxQuote;

    /// Receives a pushed location tax list. Adapters that resolve rates
    /// elsewhere ignore it.
    fn replace_locations(&mut self, configs: Vec<LocationTaxConfig>) {
        debug!(count = configs.len(), "Tax adapter ignores pushed location configs");
    }
}

/// Tax configuration keyed by location id, with a default rate.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationTaxTable {
    locations: HashMap<String, LocationTaxConfig>,
    default_rate: TaxRate,
    default_name: String,
}

impl LocationTaxTable {
    /// Creates an empty table that answers every query with the defaults.
    pub fn new(defaults: &PricingDefaults) -> Self {
        LocationTaxTable {
            locations: HashMap::new(),
            default_rate: defaults.tax_rate,
            default_name: defaults.tax_name.clone(),
        }
    }

    /// Replaces all location entries.
    pub fn replace_all(&mut self, configs: impl IntoIterator<Item = LocationTaxConfig>) {
        self.locations = configs
            .into_iter()
            .map(|c| (c.location_id.clone(), c))
            .collect();
    }

    /// Adds or replaces one location entry.
    pub fn upsert(&mut self, config: LocationTaxConfig) {
        self.locations.insert(config.location_id.clone(), config);
    }

    pub fn get(&self, location_id: &str) -> Option<&LocationTaxConfig> {
        self.locations.get(location_id)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl TaxAdapter for LocationTaxTable {
    fn replace_locations(&mut self, configs: Vec<LocationTaxConfig>) {
        self.replace_all(configs);
    }

    fn quote(&self, amount: Money, location_id: Option<&str>) -> TaxQuote {
        let (rate, name) = match location_id.and_then(|id| self.locations.get(id)) {
            Some(config) => (config.sales_tax_rate, config.tax_name.clone()),
            None => {
                debug!(?location_id, "No location tax config, using default rate");
                (self.default_rate, self.default_name.clone())
            }
        };

        TaxQuote {
            tax_amount: amount.calculate_tax(rate),
            tax_rate: rate,
            tax_name: name,
        }
    }
}
