//! CLI command handlers
//!
//! This module contains the implementation of CLI commands, bridging the clap
//! argument parsing with the service layer. Arguments arrive as strings and
//! are parsed here, so malformed input surfaces as a recoverable
//! [`ExpenseError`] rather than a clap usage error.

pub mod budget;
pub mod config;
pub mod expense;
pub mod export;
pub mod prompt;
pub mod rates;
pub mod recurring;
pub mod report;
pub mod tag;

pub use budget::{handle_budget_command, BudgetCommands};
pub use config::{handle_config_command, ConfigCommands};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use export::{handle_export_command, ExportCommands};
pub use prompt::Prompter;
pub use rates::{handle_rates_command, RatesCommands};
pub use recurring::{handle_recurring_command, RecurringCommands};
pub use report::{handle_report_command, ReportCommands};
pub use tag::{handle_tag_command, TagCommands};

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, Utc};

use crate::config::{ExpensePaths, Settings};
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{
    expense::normalize_tags, Budget, BudgetScope, Category, Currency, Money, PaymentMethod,
    YearMonth, MAX_AMOUNT,
};
use crate::providers::ExchangeRateApiSource;
use crate::services::budget::currencies_in;
use crate::services::{CurrencyConverter, RateService};
use crate::storage::{RateCache, Store};

/// Everything a command handler needs
pub struct Context {
    pub paths: ExpensePaths,
    pub settings: Settings,
    pub store: Store,
    /// Date used for defaults and recurring catch-up
    pub today: NaiveDate,
    /// Never contact the rate API; use whatever is cached
    pub offline: bool,
}

impl Context {
    pub fn rate_service(&self) -> RateService<ExchangeRateApiSource> {
        RateService::new(
            RateCache::new(self.paths.rates_cache_file()),
            ExchangeRateApiSource::new(&self.settings.rates.api_url),
            self.settings.rates.base,
            Duration::hours(i64::from(self.settings.rates.ttl_hours)),
        )
    }

    /// A converter for amounts in `currencies` shown in `target`.
    ///
    /// Returns `None` without touching the cache or network when every
    /// currency already is `target`, or when no rates can be had; callers
    /// that then need a conversion fail with a rate error.
    pub fn converter_for<I>(&self, currencies: I, target: Currency) -> Option<CurrencyConverter>
    where
        I: IntoIterator<Item = Currency>,
    {
        if currencies.into_iter().all(|c| c == target) {
            return None;
        }
        self.converter()
    }

    /// A converter over the best available rates, fetching when allowed
    pub fn converter(&self) -> Option<CurrencyConverter> {
        self.rate_service().converter(Utc::now(), !self.offline)
    }

    /// A converter when any expense counted by `budgets` is in a currency
    /// other than its budget's
    pub fn budget_converter<'b, I>(&self, budgets: I) -> Option<CurrencyConverter>
    where
        I: IntoIterator<Item = &'b Budget>,
    {
        let needs_rates = budgets.into_iter().any(|b| {
            currencies_in(self.store.expenses(), b.scope, b.month).any(|c| c != b.currency)
        });
        if needs_rates {
            self.converter()
        } else {
            None
        }
    }
}

/// Parse a positive amount such as "250" or "1,299.50"
pub fn parse_amount(s: &str) -> ExpenseResult<Money> {
    let amount = Money::parse(s)
        .map_err(|e| ExpenseError::Validation(format!("Invalid amount '{}': {}", s.trim(), e)))?;
    if !amount.is_positive() {
        return Err(ExpenseError::Validation(format!(
            "Amount must be positive, got '{}'",
            s.trim()
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(ExpenseError::Validation(format!(
            "Amount '{}' exceeds the maximum of {}",
            s.trim(),
            MAX_AMOUNT
        )));
    }
    Ok(amount)
}

/// Parse a date: YYYY-MM-DD, "today" or "yesterday"
pub fn parse_date(s: &str, today: NaiveDate) -> ExpenseResult<NaiveDate> {
    let s = s.trim();
    match s.to_ascii_lowercase().as_str() {
        "today" => Ok(today),
        "yesterday" => today
            .pred_opt()
            .ok_or_else(|| ExpenseError::Validation("Date out of range".into())),
        _ => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
            ExpenseError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", s))
        }),
    }
}

pub fn parse_optional_date(s: Option<&str>, today: NaiveDate) -> ExpenseResult<Option<NaiveDate>> {
    s.map(|d| parse_date(d, today)).transpose()
}

/// Parse a month (YYYY-MM), defaulting to the month of `today`
pub fn parse_month(s: Option<&str>, today: NaiveDate) -> ExpenseResult<YearMonth> {
    match s {
        Some(m) if m.trim().eq_ignore_ascii_case("current") => Ok(YearMonth::from_date(today)),
        Some(m) => m.parse(),
        None => Ok(YearMonth::from_date(today)),
    }
}

/// Parse a currency code, defaulting to the configured currency
pub fn parse_currency(s: Option<&str>, settings: &Settings) -> ExpenseResult<Currency> {
    s.map_or(Ok(settings.default_currency), Currency::from_code)
}

pub fn parse_category(s: &str) -> ExpenseResult<Category> {
    s.parse()
}

pub fn parse_scope(s: &str) -> ExpenseResult<BudgetScope> {
    s.parse()
}

pub fn parse_method(s: Option<&str>) -> ExpenseResult<PaymentMethod> {
    s.map_or(Ok(PaymentMethod::default()), str::parse)
}

/// Tags given as repeated flags and/or comma-separated lists
pub fn parse_tags<S: AsRef<str>>(values: &[S]) -> BTreeSet<String> {
    normalize_tags(values.iter().flat_map(|v| v.as_ref().split(',')))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,299.50").unwrap(), Money::from_minor(129_950));
        assert!(parse_amount("0").unwrap_err().is_validation());
        assert!(parse_amount("-5").unwrap_err().is_validation());
        assert!(parse_amount("abc").unwrap_err().is_validation());
    }

    #[test]
    fn test_parse_amount_caps_large_values() {
        assert_eq!(parse_amount("1,000,000,000,000").unwrap(), MAX_AMOUNT);
        assert!(parse_amount("1,000,000,000,000.01")
            .unwrap_err()
            .is_validation());
        assert!(parse_amount("50,000,000,000,000,000")
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_parse_date() {
        let today = date(2025, 3, 1);
        assert_eq!(parse_date("today", today).unwrap(), today);
        assert_eq!(parse_date("Yesterday", today).unwrap(), date(2025, 2, 28));
        assert_eq!(parse_date("2024-12-31", today).unwrap(), date(2024, 12, 31));
        assert!(parse_date("31/12/2024", today).is_err());
    }

    #[test]
    fn test_parse_month_defaults_to_today() {
        let today = date(2025, 3, 1);
        assert_eq!(parse_month(None, today).unwrap().to_string(), "2025-03");
        assert_eq!(parse_month(Some("2024-11"), today).unwrap().to_string(), "2024-11");
        assert!(parse_month(Some("2024-13"), today).is_err());
    }

    #[test]
    fn test_parse_currency() {
        let settings = Settings::default();
        assert_eq!(parse_currency(None, &settings).unwrap(), Currency::Inr);
        assert_eq!(parse_currency(Some("usd"), &settings).unwrap(), Currency::Usd);
        assert!(matches!(
            parse_currency(Some("XYZ"), &settings),
            Err(ExpenseError::UnsupportedCurrency(_))
        ));
    }

    #[test]
    fn test_parse_tags() {
        let tags = parse_tags(&["Groceries, weekly", "dining", " "]);
        let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["dining", "groceries", "weekly"]);
    }
}
