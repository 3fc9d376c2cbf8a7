//! Exchange rate snapshot
//!
//! Rates are quoted against a base currency: `rates[c]` is how many units of
//! `c` one unit of `base` buys. The base itself always maps to 1.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::currency::Currency;
use crate::error::ExpenseError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub base: Currency,
    pub rates: BTreeMap<Currency, Decimal>,
    pub fetched_at: DateTime<Utc>,
}

impl RateSnapshot {
    /// Build a snapshot, forcing the base rate to 1 and rejecting
    /// non-positive rates
    pub fn new(
        base: Currency,
        mut rates: BTreeMap<Currency, Decimal>,
        fetched_at: DateTime<Utc>,
    ) -> Result<Self, ExpenseError> {
        if let Some((currency, rate)) = rates.iter().find(|(_, rate)| **rate <= Decimal::ZERO) {
            return Err(ExpenseError::RateFetch(format!(
                "non-positive rate {} for {}",
                rate, currency
            )));
        }
        rates.insert(base, Decimal::ONE);
        Ok(Self {
            base,
            rates,
            fetched_at,
        })
    }

    /// Units of `currency` per unit of the base
    pub fn rate(&self, currency: Currency) -> Result<Decimal, ExpenseError> {
        self.rates.get(&currency).copied().ok_or_else(|| {
            ExpenseError::RateFetch(format!(
                "snapshot from {} has no rate for {}",
                self.fetched_at.format("%Y-%m-%d %H:%M"),
                currency
            ))
        })
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }

    /// Whether the snapshot is younger than `ttl`
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) < ttl
    }

    /// Currencies from the supported set with no rate in this snapshot
    pub fn missing(&self) -> Vec<Currency> {
        Currency::ALL
            .iter()
            .copied()
            .filter(|c| !self.rates.contains_key(c))
            .collect()
    }
}
