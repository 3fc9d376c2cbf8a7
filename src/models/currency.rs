//! Supported currencies
//!
//! The tracker works with a fixed set of eight currencies. Codes are parsed
//! once at the boundary; everything past that point uses the enum.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::money::Money;
use crate::error::ExpenseError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Inr,
    Usd,
    Eur,
    Gbp,
    Jpy,
    Cad,
    Aud,
    Sgd,
}

impl Currency {
    pub const ALL: [Currency; 8] = [
        Currency::Inr,
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Jpy,
        Currency::Cad,
        Currency::Aud,
        Currency::Sgd,
    ];

    /// ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Inr => "INR",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Jpy => "JPY",
            Self::Cad => "CAD",
            Self::Aud => "AUD",
            Self::Sgd => "SGD",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Inr => "₹",
            Self::Usd => "$",
            Self::Eur => "€",
            Self::Gbp => "£",
            Self::Jpy => "¥",
            Self::Cad => "C$",
            Self::Aud => "A$",
            Self::Sgd => "S$",
        }
    }

    /// Look up a currency by ISO code, failing for anything unsupported
    pub fn from_code(code: &str) -> Result<Self, ExpenseError> {
        let upper = code.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.code() == upper)
            .ok_or_else(|| ExpenseError::UnsupportedCurrency(code.trim().to_string()))
    }

    /// Format an amount with this currency's symbol and digit grouping.
    ///
    /// INR uses the Indian lakh/crore grouping (₹1,23,456.78); every other
    /// currency groups by thousands.
    pub fn format(&self, amount: Money) -> String {
        let major = amount.major().unsigned_abs().to_string();
        let grouped = match self {
            Self::Inr => group_indian(&major),
            _ => group_thousands(&major),
        };
        let sign = if amount.is_negative() { "-" } else { "" };
        format!("{}{}{}.{:02}", sign, self.symbol(), grouped, amount.minor_part())
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut out = String::with_capacity(digits.len() + digits.len() / 2);
    for (i, ch) in head.chars().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push(',');
    out.push_str(tail);
    out
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = ExpenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_is_case_insensitive() {
        assert_eq!(Currency::from_code("usd").unwrap(), Currency::Usd);
        assert_eq!(" Sgd ".parse::<Currency>().unwrap(), Currency::Sgd);
    }

    #[test]
    fn test_unsupported_currency() {
        let err = Currency::from_code("CHF").unwrap_err();
        assert!(matches!(err, ExpenseError::UnsupportedCurrency(ref c) if c == "CHF"));
    }

    #[test]
    fn test_all_codes_round_trip() {
        for currency in Currency::ALL {
            assert_eq!(Currency::from_code(currency.code()).unwrap(), currency);
        }
    }

    #[test]
    fn test_format_indian_grouping() {
        let inr = Currency::Inr;
        assert_eq!(inr.format(Money::from_minor(12345678)), "₹1,23,456.78");
        assert_eq!(inr.format(Money::from_minor(100000000)), "₹10,00,000.00");
        assert_eq!(inr.format(Money::from_minor(99900)), "₹999.00");
        assert_eq!(inr.format(Money::from_minor(-150050)), "-₹1,500.50");
    }

    #[test]
    fn test_format_thousands_grouping() {
        assert_eq!(Currency::Usd.format(Money::from_minor(123456789)), "$1,234,567.89");
        assert_eq!(Currency::Cad.format(Money::from_minor(5)), "C$0.05");
        assert_eq!(Currency::Eur.format(Money::from_minor(100000)), "€1,000.00");
    }

    #[test]
    fn test_serde_uses_codes() {
        assert_eq!(serde_json::to_string(&Currency::Jpy).unwrap(), "\"JPY\"");
        let c: Currency = serde_json::from_str("\"GBP\"").unwrap();
        assert_eq!(c, Currency::Gbp);
    }
}
