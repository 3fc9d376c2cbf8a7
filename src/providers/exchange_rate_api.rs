//! Rate source backed by the exchangerate-api.com `latest` endpoint

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::RateSource;
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Currency, RateSnapshot};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ExchangeRateApiSource {
    base_url: String,
}

impl ExchangeRateApiSource {
    pub fn new(base_url: &str) -> Self {
        ExchangeRateApiSource {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url_for(&self, base: Currency) -> String {
        format!("{}/{}", self.base_url, base.code())
    }
}

#[derive(Deserialize, Debug)]
struct LatestRatesResponse {
    rates: HashMap<String, serde_json::Number>,
}

impl RateSource for ExchangeRateApiSource {
    #[instrument(skip(self), fields(base = %base))]
    fn fetch(&self, base: Currency) -> ExpenseResult<RateSnapshot> {
        let url = self.url_for(base);
        debug!("Requesting exchange rates from {}", url);

        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ExpenseError::RateFetch(format!("failed to build HTTP client: {}", e)))?;

        let response = client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| ExpenseError::RateFetch(format!("request to {} failed: {}", url, e)))?;

        let body = response
            .text()
            .map_err(|e| ExpenseError::RateFetch(format!("failed to read response: {}", e)))?;

        let snapshot = parse_rates(base, &body, Utc::now())?;
        info!(rates = snapshot.rates.len(), "Fetched exchange rates");
        Ok(snapshot)
    }
}

/// Parse a `{"rates": {"USD": 0.012, ...}}` body into a snapshot.
///
/// Codes outside the supported set are dropped. Numbers are read from their
/// JSON text so no binary float rounding creeps into the rates.
pub fn parse_rates(
    base: Currency,
    body: &str,
    fetched_at: DateTime<Utc>,
) -> ExpenseResult<RateSnapshot> {
    let response: LatestRatesResponse = serde_json::from_str(body)
        .map_err(|e| ExpenseError::RateFetch(format!("unexpected response body: {}", e)))?;

    let mut rates = BTreeMap::new();
    for (code, number) in response.rates {
        let Ok(currency) = Currency::from_code(&code) else {
            continue;
        };
        let text = number.to_string();
        let rate = Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|e| {
                ExpenseError::RateFetch(format!("invalid rate {} for {}: {}", text, code, e))
            })?;
        rates.insert(currency, rate);
    }

    RateSnapshot::new(base, rates, fetched_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fetched_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_keeps_supported_currencies() {
        let body = r#"{
            "base": "INR",
            "date": "2025-03-01",
            "rates": {"INR": 1, "USD": 0.01152, "EUR": 0.011, "BRL": 0.067, "JPY": 1.73}
        }"#;
        let snapshot = parse_rates(Currency::Inr, body, fetched_at()).unwrap();

        assert_eq!(snapshot.base, Currency::Inr);
        assert_eq!(snapshot.rate(Currency::Inr).unwrap(), Decimal::ONE);
        assert_eq!(snapshot.rate(Currency::Usd).unwrap(), Decimal::new(1152, 5));
        assert_eq!(snapshot.rate(Currency::Jpy).unwrap(), Decimal::new(173, 2));
        assert_eq!(snapshot.rates.len(), 4);
        assert!(snapshot.missing().contains(&Currency::Gbp));
    }

    #[test]
    fn test_parse_rejects_non_positive_rate() {
        let body = r#"{"rates": {"USD": 0}}"#;
        let err = parse_rates(Currency::Inr, body, fetched_at()).unwrap_err();
        assert!(matches!(err, ExpenseError::RateFetch(_)));
    }

    #[test]
    fn test_parse_rejects_malformed_body() {
        for body in ["", "<html>rate limited</html>", r#"{"result": "error"}"#] {
            let err = parse_rates(Currency::Inr, body, fetched_at()).unwrap_err();
            assert!(err.is_recoverable());
        }
    }

    #[test]
    fn test_url_for_base() {
        let source = ExchangeRateApiSource::new("https://api.exchangerate-api.com/v4/latest/");
        assert_eq!(
            source.url_for(Currency::Usd),
            "https://api.exchangerate-api.com/v4/latest/USD"
        );
    }
}
