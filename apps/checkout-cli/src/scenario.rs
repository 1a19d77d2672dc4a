//! # Checkout Scenarios
//!
//! A recorded checkout: the catalog snapshots the register had loaded and
//! the cashier actions taken, replayed through a [`CheckoutSession`].
//!
//! ## File Format
//! ```json
//! {
//!   "now": "2026-10-16T17:00:00",
//!   "location_id": "downtown",
//!   "catalog": [ { "id": "p1", "name": "Pre-roll", "regular_price": "10", ... } ],
//!   "loyalty_program": { "point_value": "0.01", "points_per_dollar": "1" },
//!   "campaigns": [ ... ],
//!   "locations": [ { "location_id": "downtown", "sales_tax_rate": "0.1" } ],
//!   "steps": [
//!     { "op": "add", "product_id": "p1" },
//!     { "op": "update_quantity", "line_id": "p1", "delta": 2 },
//!     { "op": "select_customer", "customer": { "id": "c1", "loyalty_points": 500 } },
//!     { "op": "redeem_points", "points": 100 }
//!   ],
//!   "submit": true
//! }
//! ```

use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tally_core::cart::LineItem;
use tally_core::session::CampaignOption;
use tally_core::tier::DataQualityWarning;
use tally_core::{
    AddOutcome, Campaign, CatalogEvent, CheckoutSession, CheckoutSubmission, CheckoutTotals,
    CoreError, Customer, Discount, FixedClock, LocationTaxConfig, LoyaltyProgram, PricingDefaults,
    Product,
};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

/// One cashier action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Add {
        product_id: String,
        #[serde(default)]
        tier: Option<String>,
    },
    UpdateQuantity {
        line_id: String,
        delta: i64,
    },
    SetQuantity {
        line_id: String,
        quantity: u32,
    },
    Remove {
        line_id: String,
    },
    Discount {
        line_id: String,
        discount: Discount,
    },
    RemoveDiscount {
        line_id: String,
    },
    ClearCart,
    SelectCustomer {
        #[serde(default)]
        customer: Option<Customer>,
    },
    RedeemPoints {
        points: u64,
    },
    SelectCampaign {
        #[serde(default)]
        campaign_id: Option<String>,
    },
    SetLocation {
        #[serde(default)]
        location_id: Option<String>,
    },
    /// Upstream data change arriving mid-checkout.
    Event {
        event: CatalogEvent,
    },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Add { .. } => "add",
            Step::UpdateQuantity { .. } => "update_quantity",
            Step::SetQuantity { .. } => "set_quantity",
            Step::Remove { .. } => "remove",
            Step::Discount { .. } => "discount",
            Step::RemoveDiscount { .. } => "remove_discount",
            Step::ClearCart => "clear_cart",
            Step::SelectCustomer { .. } => "select_customer",
            Step::RedeemPoints { .. } => "redeem_points",
            Step::SelectCampaign { .. } => "select_campaign",
            Step::SetLocation { .. } => "set_location",
            Step::Event { .. } => "event",
        }
    }
}

/// A recorded checkout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Store-local time the checkout happened. System clock when absent.
    #[serde(default)]
    pub now: Option<NaiveDateTime>,

    #[serde(default)]
    pub location_id: Option<String>,

    #[serde(default)]
    pub catalog: Vec<Product>,

    #[serde(default)]
    pub loyalty_program: Option<LoyaltyProgram>,

    #[serde(default)]
    pub campaigns: Vec<Campaign>,

    #[serde(default)]
    pub locations: Vec<LocationTaxConfig>,

    #[serde(default)]
    pub steps: Vec<Step>,

    /// Build the backend payload after the last step.
    #[serde(default)]
    pub submit: bool,
}

/// What happened to one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub op: &'static str,
    pub result: String,
}

/// Final state of a replayed scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub lines: Vec<LineItem>,
    pub totals: CheckoutTotals,
    pub steps: Vec<StepReport>,
    pub campaigns: Vec<CampaignOption>,
    pub warnings: Vec<DataQualityWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<CheckoutSubmission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_error: Option<String>,
}

impl Scenario {
    /// Reads a scenario from a JSON file.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Opens a session loaded with this scenario's snapshots.
    pub fn open_session(&self, defaults: PricingDefaults) -> CheckoutSession {
        let mut session = match self.now {
            Some(now) => CheckoutSession::with_clock(defaults, FixedClock(now)),
            None => CheckoutSession::new(defaults),
        };

        session.handle_event(CatalogEvent::CatalogReplaced(self.catalog.clone()));
        session.handle_event(CatalogEvent::LoyaltyProgramChanged(self.loyalty_program.clone()));
        session.handle_event(CatalogEvent::CampaignsChanged(self.campaigns.clone()));
        session.handle_event(CatalogEvent::TaxConfigChanged(self.locations.clone()));
        session
    }

    /// Replays every step.
    ///
    /// A step the session rejects is recorded and the replay continues,
    /// the way a register shows the error and lets the cashier carry on.
    /// With `strict`, the first rejection aborts the run.
    pub fn replay(
        &self,
        defaults: PricingDefaults,
        fallback_location: Option<&str>,
        strict: bool,
    ) -> AppResult<ScenarioReport> {
        let mut session = self.open_session(defaults);
        let location = self
            .location_id
            .clone()
            .or_else(|| fallback_location.map(str::to_string));
        session.set_location(location);

        let mut steps = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.iter().enumerate() {
            let number = index + 1;
            let op = step.name();
            let result = match apply(&mut session, step) {
                Ok(result) => {
                    debug!(step = number, op, %result, "Step applied");
                    result
                }
                Err(source) if strict => {
                    return Err(AppError::Step {
                        step: number,
                        op,
                        source,
                    })
                }
                Err(err) => {
                    warn!(step = number, op, error = %err, "Step rejected");
                    format!("rejected: {}", err)
                }
            };
            steps.push(StepReport {
                step: number,
                op,
                result,
            });
        }

        let (submission, submission_error) = if self.submit {
            match session.prepare_submission() {
                Ok(submission) => (Some(submission), None),
                Err(err) if strict => return Err(err.into()),
                Err(err) => (None, Some(err.to_string())),
            }
        } else {
            (None, None)
        };

        info!(
            session_id = %session.id(),
            steps = steps.len(),
            total = %session.totals().total,
            "Scenario replayed"
        );

        Ok(ScenarioReport {
            lines: session.cart().items().to_vec(),
            totals: session.totals().clone(),
            steps,
            campaigns: session.campaign_options(),
            warnings: session.cart().warnings().to_vec(),
            submission,
            submission_error,
        })
    }
}

fn apply(session: &mut CheckoutSession, step: &Step) -> Result<String, CoreError> {
    let result = match step {
        Step::Add { product_id, tier } => match session.add_product(product_id, tier.as_deref())? {
            AddOutcome::Added { line_id } => format!("added {}", line_id),
            AddOutcome::Merged { line_id, quantity } => format!("{} now {}", line_id, quantity),
            AddOutcome::AtInventoryLimit { line_id } => format!("{} at inventory limit", line_id),
            AddOutcome::OutOfStock { product_id } => format!("{} out of stock", product_id),
        },
        Step::UpdateQuantity { line_id, delta } => {
            let quantity = session.update_quantity(line_id, *delta)?;
            format!("{} now {}", line_id, quantity)
        }
        Step::SetQuantity { line_id, quantity } => {
            let quantity = session.set_quantity(line_id, *quantity)?;
            format!("{} now {}", line_id, quantity)
        }
        Step::Remove { line_id } => {
            session.remove_item(line_id)?;
            format!("removed {}", line_id)
        }
        Step::Discount { line_id, discount } => {
            let adjusted = session.apply_manual_discount(line_id, *discount)?;
            format!("{} adjusted to {}", line_id, adjusted)
        }
        Step::RemoveDiscount { line_id } => {
            session.remove_manual_discount(line_id)?;
            format!("{} discount removed", line_id)
        }
        Step::ClearCart => {
            session.clear_cart();
            "cart cleared".to_string()
        }
        Step::SelectCustomer { customer } => {
            let summary = match customer {
                Some(c) => format!("customer {}", c.id),
                None => "no customer".to_string(),
            };
            session.select_customer(customer.clone());
            summary
        }
        Step::RedeemPoints { points } => {
            let applied = session.set_points_to_redeem(*points)?;
            format!("redeeming {} points", applied)
        }
        Step::SelectCampaign { campaign_id } => {
            session.select_campaign(campaign_id.as_deref())?;
            match campaign_id {
                Some(id) => format!("campaign {}", id),
                None => "no campaign".to_string(),
            }
        }
        Step::SetLocation { location_id } => {
            session.set_location(location_id.clone());
            format!("location {}", location_id.as_deref().unwrap_or("default"))
        }
        Step::Event { event } => {
            session.handle_event(event.clone());
            "catalog updated".to_string()
        }
    };
    Ok(result)
}
