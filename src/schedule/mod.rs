pub mod scheduler;
pub mod service;
pub mod store;

use std::str::FromStr;

use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assets::{AssetId, RegistryError};
use crate::payment::{ExecutionOutcome, PaymentRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    EveryFiveMinutes,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EveryFiveMinutes => "every_five_minutes",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    fn fixed_interval(self) -> Option<TimeDelta> {
        match self {
            Self::EveryFiveMinutes => Some(TimeDelta::minutes(5)),
            Self::Weekly => Some(TimeDelta::days(7)),
            Self::Monthly => None,
        }
    }

    /// First due time for a schedule anchored at `anchor`.
    pub fn first_due(self, anchor: DateTime<Utc>) -> DateTime<Utc> {
        match self.fixed_interval() {
            Some(interval) => anchor + interval,
            None => add_months(anchor, 1),
        }
    }

    /// Next due time after `previous_due`, stepping whole intervals from it
    /// until the result lies strictly after `now`. A tick that runs less than
    /// one interval late therefore advances by exactly one interval; missed
    /// cycles are skipped rather than replayed.
    ///
    /// Monthly schedules step in calendar months from `anchor`, keeping the
    /// anchor's day of month or the last day of shorter months.
    pub fn next_due(
        self,
        anchor: DateTime<Utc>,
        previous_due: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        let floor = previous_due.max(now);
        match self.fixed_interval() {
            Some(interval) => {
                let mut next = previous_due + interval;
                if next <= floor {
                    let behind = (floor - previous_due).num_seconds() / interval.num_seconds();
                    next = previous_due + interval * i32::try_from(behind).unwrap_or(i32::MAX);
                    while next <= floor {
                        next += interval;
                    }
                }
                next
            }
            None => {
                let mut months = 1;
                loop {
                    let next = add_months(anchor, months);
                    if next > floor {
                        return next;
                    }
                    months += 1;
                }
            }
        }
    }
}

fn add_months(at: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    at.checked_add_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "5min" | "every_five_minutes" | "every-five-minutes" => Ok(Self::EveryFiveMinutes),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(format!("unknown frequency: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringPayment {
    pub id: String,
    pub recipient: String,
    pub amount: u128,
    pub origin_asset: AssetId,
    pub destination_asset: AssetId,
    pub token: String,
    pub chain: String,
    pub frequency: Frequency,
    /// Reference point for calendar-month stepping.
    pub anchor_at: DateTime<Utc>,
    pub next_due_at: DateTime<Utc>,
    pub active: bool,
    pub last_outcome: Option<ExecutionOutcome>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RecurringPayment {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.active && self.next_due_at <= now
    }

    pub fn payment_request(&self) -> PaymentRequest {
        PaymentRequest {
            payment_id: self.id.clone(),
            recipient: self.recipient.clone(),
            amount: self.amount,
            origin_asset: self.origin_asset.clone(),
            token: self.token.clone(),
            chain: self.chain.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecurringPayment {
    pub recipient: String,
    pub amount: u128,
    pub origin_asset: AssetId,
    pub token: String,
    pub chain: String,
    pub frequency: Frequency,
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("payment not found: {0}")]
    NotFound(String),

    #[error("payment is already executing: {0}")]
    AlreadyRunning(String),

    #[error("payment is not active: {0}")]
    Inactive(String),

    #[error("invalid payment definition: {0}")]
    InvalidDefinition(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
