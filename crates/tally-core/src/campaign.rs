//! # Campaigns
//!
//! Promotional campaigns ("deals") and the predicate that decides whether
//! one may be applied right now.
//!
//! ## Applicability
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Campaign::status(now)                                  │
//! │                                                                         │
//! │  is_active? ──── no ───► Inactive                                       │
//! │      │                                                                  │
//! │     yes                                                                 │
//! │      ▼                                                                  │
//! │  schedule                                                               │
//! │   ├── always ───────────────────────────────┐                          │
//! │   ├── date_range: now < start ─► NotStarted │                          │
//! │   │               now > end ───► Ended      │                          │
//! │   └── recurring:  day/time miss ► OutsideWindow                        │
//! │                                              ▼                          │
//! │  current_uses >= max_total_uses? ── yes ──► UsageLimitReached           │
//! │      │                                                                  │
//! │     no ──► Applicable                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Status is evaluated on every call. Nothing here caches a verdict, so a
//! campaign whose window closes mid-checkout stops discounting on the next
//! recompute.

use std::fmt;

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a campaign's `discount_value` is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignDiscountType {
    /// `discount_value` percent of the post-loyalty amount.
    Percentage,
    /// `discount_value` currency units off.
    Fixed,
}

/// When a campaign runs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CampaignSchedule {
    /// No time restriction.
    #[default]
    Always,

    /// Inclusive range; an open end means unbounded on that side.
    DateRange {
        #[serde(default)]
        start_date: Option<NaiveDateTime>,
        #[serde(default)]
        end_date: Option<NaiveDateTime>,
    },

    /// Weekly window, e.g. Mon/Fri 16:00–18:00.
    ///
    /// When `start_time > end_time` the window runs past midnight and
    /// belongs to the day it opened on.
    Recurring {
        days: Vec<Weekday>,
        start_time: NaiveTime,
        end_time: NaiveTime,
    },
}

/// Result of evaluating a campaign at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Applicable,
    Inactive,
    NotStarted,
    Ended,
    OutsideWindow,
    UsageLimitReached,
}

impl CampaignStatus {
    pub fn is_applicable(&self) -> bool {
        matches!(self, CampaignStatus::Applicable)
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CampaignStatus::Applicable => write!(f, "applicable"),
            CampaignStatus::Inactive => write!(f, "inactive"),
            CampaignStatus::NotStarted => write!(f, "not started yet"),
            CampaignStatus::Ended => write!(f, "ended"),
            CampaignStatus::OutsideWindow => write!(f, "outside its scheduled window"),
            CampaignStatus::UsageLimitReached => write!(f, "usage limit reached"),
        }
    }
}

/// A promotional campaign record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default = "default_true")]
    pub is_active: bool,

    pub discount_type: CampaignDiscountType,

    pub discount_value: Decimal,

    #[serde(default)]
    pub schedule: CampaignSchedule,

    /// `None` means unlimited.
    #[serde(default)]
    pub max_total_uses: Option<u32>,

    #[serde(default)]
    pub current_uses: u32,
}

fn default_true() -> bool {
    true
}

impl Campaign {
    /// Evaluates the campaign at `now` (store-local time).
    pub fn status(&self, now: NaiveDateTime) -> CampaignStatus {
        if !self.is_active {
            return CampaignStatus::Inactive;
        }

        let scheduled = match &self.schedule {
            CampaignSchedule::Always => CampaignStatus::Applicable,
            CampaignSchedule::DateRange {
                start_date,
                end_date,
            } => date_range_status(*start_date, *end_date, now),
            CampaignSchedule::Recurring {
                days,
                start_time,
                end_time,
            } => {
                if in_weekly_window(days, *start_time, *end_time, now) {
                    CampaignStatus::Applicable
                } else {
                    CampaignStatus::OutsideWindow
                }
            }
        };
        if !scheduled.is_applicable() {
            return scheduled;
        }

        match self.max_total_uses {
            Some(max) if self.current_uses >= max => CampaignStatus::UsageLimitReached,
            _ => CampaignStatus::Applicable,
        }
    }

    /// Shorthand for `status(now).is_applicable()`.
    pub fn is_applicable(&self, now: NaiveDateTime) -> bool {
        self.status(now).is_applicable()
    }
}

fn date_range_status(
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> CampaignStatus {
    match (start, end) {
        (Some(start), _) if now < start => CampaignStatus::NotStarted,
        (_, Some(end)) if now > end => CampaignStatus::Ended,
        _ => CampaignStatus::Applicable,
    }
}

fn in_weekly_window(days: &[Weekday], start: NaiveTime, end: NaiveTime, now: NaiveDateTime) -> bool {
    let time = now.time();
    let today = now.weekday();

    if start <= end {
        return days.contains(&today) && time >= start && time <= end;
    }

    // Overnight: the late part belongs to today, the early part to yesterday.
    (time >= start && days.contains(&today)) || (time <= end && days.contains(&today.pred()))
}
