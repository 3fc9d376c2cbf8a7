//! Expense model
//!
//! An expense is a single recorded spend in one currency. Expenses are
//! created from user input or materialized by a recurring rule.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::category::Category;
use super::currency::Currency;
use super::ids::{ExpenseId, RuleId};
use super::money::{Money, MAX_AMOUNT};
use crate::error::ExpenseError;

/// How an expense was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    CreditCard,
    DebitCard,
    Upi,
    BankTransfer,
    Wallet,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 6] = [
        PaymentMethod::Cash,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::Upi,
        PaymentMethod::BankTransfer,
        PaymentMethod::Wallet,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::CreditCard => "Credit Card",
            Self::DebitCard => "Debit Card",
            Self::Upi => "UPI",
            Self::BankTransfer => "Bank Transfer",
            Self::Wallet => "Wallet",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for PaymentMethod {
    type Err = ExpenseError;

    /// Accepts the label ("Credit Card") or a compact form ("credit-card", "credit_card")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalize = |v: &str| {
            v.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase()
        };
        let wanted = normalize(s);
        Self::ALL
            .iter()
            .copied()
            .find(|m| normalize(m.label()) == wanted)
            .ok_or_else(|| {
                ExpenseError::Validation(format!(
                    "Unknown payment method '{}' (expected one of: {})",
                    s.trim(),
                    Self::ALL.map(|m| m.label()).join(", ")
                ))
            })
    }
}

/// A recorded expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,

    pub date: NaiveDate,

    /// Amount in minor units of `currency` (always positive)
    pub amount: Money,

    pub currency: Currency,

    pub category: Category,

    #[serde(default)]
    pub tags: BTreeSet<String>,

    #[serde(default)]
    pub payment_method: PaymentMethod,

    #[serde(default)]
    pub note: String,

    /// Set when the expense was materialized from a recurring rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_rule_id: Option<RuleId>,
}

impl Expense {
    pub fn from_new(id: ExpenseId, new: NewExpense) -> Self {
        Self {
            id,
            date: new.date,
            amount: new.amount,
            currency: new.currency,
            category: new.category,
            tags: new.tags,
            payment_method: new.payment_method,
            note: new.note,
            recurring_rule_id: new.recurring_rule_id,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(&normalize_tag(tag))
    }

    pub fn is_recurring(&self) -> bool {
        self.recurring_rule_id.is_some()
    }

    /// Apply an edit, leaving unset fields untouched
    pub fn apply(&mut self, update: &ExpenseUpdate) {
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        if let Some(currency) = update.currency {
            self.currency = currency;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(tags) = &update.tags {
            self.tags = tags.clone();
        }
        if let Some(method) = update.payment_method {
            self.payment_method = method;
        }
        if let Some(note) = &update.note {
            self.note = note.clone();
        }
    }

    pub fn validate(&self) -> Result<(), ExpenseError> {
        validate_amount(self.amount)?;
        validate_tags(&self.tags)
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} - {} ({}) [{}]",
            self.date,
            self.currency.format(self.amount),
            if self.note.is_empty() { "-" } else { self.note.as_str() },
            self.category,
            self.payment_method
        )
    }
}

/// Everything needed to create an expense; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub amount: Money,
    pub currency: Currency,
    pub category: Category,
    pub tags: BTreeSet<String>,
    pub payment_method: PaymentMethod,
    pub note: String,
    pub recurring_rule_id: Option<RuleId>,
}

impl NewExpense {
    pub fn new(date: NaiveDate, amount: Money, currency: Currency, category: Category) -> Self {
        Self {
            date,
            amount,
            currency,
            category,
            tags: BTreeSet::new(),
            payment_method: PaymentMethod::default(),
            note: String::new(),
            recurring_rule_id: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
        self
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = method;
        self
    }
}

/// Partial edit of an expense
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseUpdate {
    pub date: Option<NaiveDate>,
    pub amount: Option<Money>,
    pub currency: Option<Currency>,
    pub category: Option<Category>,
    pub tags: Option<BTreeSet<String>>,
    pub payment_method: Option<PaymentMethod>,
    pub note: Option<String>,
}

impl ExpenseUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Trim and lowercase a tag
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Normalize a list of tags, dropping empty entries
pub fn normalize_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| normalize_tag(t.as_ref()))
        .filter(|t| !t.is_empty())
        .collect()
}

pub(crate) fn validate_amount(amount: Money) -> Result<(), ExpenseError> {
    if !amount.is_positive() {
        return Err(ExpenseError::Validation(format!(
            "Amount must be greater than zero, got {}",
            amount
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(ExpenseError::Validation(format!(
            "Amount {} exceeds the maximum of {}",
            amount, MAX_AMOUNT
        )));
    }
    Ok(())
}

fn validate_tags(tags: &BTreeSet<String>) -> Result<(), ExpenseError> {
    if let Some(bad) = tags.iter().find(|t| t.trim().is_empty() || t.len() > 40) {
        return Err(ExpenseError::Validation(format!("Invalid tag '{}'", bad)));
    }
    Ok(())
}
