//! Currency conversion and exchange rate refresh
//!
//! [`CurrencyConverter`] does pure arithmetic over one snapshot.
//! [`RateService`] decides where that snapshot comes from: the on-disk cache
//! while it is fresh, otherwise the rate source, falling back to a stale
//! cache when the source is unreachable.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Currency, Money, RateSnapshot};
use crate::providers::RateSource;
use crate::storage::RateCache;

/// Converts amounts between supported currencies using one snapshot
#[derive(Debug, Clone)]
pub struct CurrencyConverter {
    snapshot: RateSnapshot,
}

impl CurrencyConverter {
    pub fn new(snapshot: RateSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &RateSnapshot {
        &self.snapshot
    }

    /// Convert `amount` from one currency to another through the snapshot base.
    ///
    /// The intermediate value stays a `Decimal`; only the result is rounded
    /// to minor units, half away from zero.
    pub fn convert(&self, amount: Money, from: Currency, to: Currency) -> ExpenseResult<Money> {
        if from == to {
            return Ok(amount);
        }

        let from_rate = self.snapshot.rate(from)?;
        let to_rate = self.snapshot.rate(to)?;

        let converted = amount
            .to_decimal()
            .checked_div(from_rate)
            .and_then(|base| base.checked_mul(to_rate))
            .ok_or_else(|| overflow(amount, from, to))?;

        Money::from_decimal(converted).map_err(|_| overflow(amount, from, to))
    }

    /// Same as [`convert`](Self::convert) with currencies given as ISO codes
    pub fn convert_code(&self, amount: Money, from: &str, to: &str) -> ExpenseResult<Money> {
        self.convert(amount, Currency::from_code(from)?, Currency::from_code(to)?)
    }

    /// Rate of `to` per unit of `from`
    pub fn cross_rate(&self, from: Currency, to: Currency) -> ExpenseResult<Decimal> {
        let from_rate = self.snapshot.rate(from)?;
        let to_rate = self.snapshot.rate(to)?;
        to_rate
            .checked_div(from_rate)
            .ok_or_else(|| ExpenseError::RateFetch(format!("cannot derive {}/{} rate", from, to)))
    }
}

fn overflow(amount: Money, from: Currency, to: Currency) -> ExpenseError {
    ExpenseError::Validation(format!(
        "Converting {} from {} to {} is out of range",
        amount, from, to
    ))
}

/// Convert with an optional converter.
///
/// Same-currency amounts pass through without rates; anything else needs a
/// converter and fails with a rate error when there is none.
pub fn convert_amount(
    converter: Option<&CurrencyConverter>,
    amount: Money,
    from: Currency,
    to: Currency,
) -> ExpenseResult<Money> {
    if from == to {
        return Ok(amount);
    }
    converter
        .ok_or_else(ExpenseError::rates_unavailable)?
        .convert(amount, from, to)
}

/// Where the current rate snapshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateOrigin {
    /// Cache younger than the TTL
    FreshCache,
    /// Just fetched from the source
    Fetched,
    /// Source failed; cache is older than the TTL
    StaleCache,
}

/// Loads, refreshes and caches rate snapshots
pub struct RateService<S: RateSource> {
    cache: RateCache,
    source: S,
    base: Currency,
    ttl: Duration,
}

impl<S: RateSource> RateService<S> {
    pub fn new(cache: RateCache, source: S, base: Currency, ttl: Duration) -> Self {
        Self {
            cache,
            source,
            base,
            ttl,
        }
    }

    /// The cached snapshot, whatever its age
    pub fn cached(&self) -> Option<RateSnapshot> {
        self.cache.load()
    }

    /// Fetch a new snapshot from the source and cache it
    pub fn refresh(&self) -> ExpenseResult<RateSnapshot> {
        let snapshot = self.source.fetch(self.base)?;
        self.cache.save(&snapshot)?;
        info!(base = %snapshot.base, "Exchange rates refreshed");
        Ok(snapshot)
    }

    /// Best available snapshot at `now`.
    ///
    /// With `allow_fetch` false the source is never contacted and a stale
    /// cache is returned as is. Returns `None` only when nothing is cached
    /// and the source cannot be reached.
    pub fn current(
        &self,
        now: DateTime<Utc>,
        allow_fetch: bool,
    ) -> Option<(RateSnapshot, RateOrigin)> {
        let cached = self.cache.load();

        if let Some(snapshot) = &cached {
            if snapshot.is_fresh(now, self.ttl) {
                debug!("Using fresh cached exchange rates");
                return cached.map(|s| (s, RateOrigin::FreshCache));
            }
        }

        if allow_fetch {
            match self.refresh() {
                Ok(snapshot) => return Some((snapshot, RateOrigin::Fetched)),
                Err(e) => warn!(error = %e, "Rate refresh failed"),
            }
        }

        cached.map(|snapshot| {
            warn!(
                fetched_at = %snapshot.fetched_at,
                "Using stale cached exchange rates"
            );
            (snapshot, RateOrigin::StaleCache)
        })
    }

    /// A converter over [`current`](Self::current), if any rates exist
    pub fn converter(&self, now: DateTime<Utc>, allow_fetch: bool) -> Option<CurrencyConverter> {
        self.current(now, allow_fetch)
            .map(|(snapshot, _)| CurrencyConverter::new(snapshot))
    }
}
