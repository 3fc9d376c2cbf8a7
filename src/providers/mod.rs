//! Exchange rate sources

pub mod exchange_rate_api;

pub use exchange_rate_api::ExchangeRateApiSource;

use crate::error::ExpenseResult;
use crate::models::{Currency, RateSnapshot};

/// Something that can produce a fresh rate snapshot
pub trait RateSource {
    /// Fetch rates quoted against `base`.
    ///
    /// Fails with [`crate::error::ExpenseError::RateFetch`] on network or
    /// parse failure.
    fn fetch(&self, base: Currency) -> ExpenseResult<RateSnapshot>;
}
