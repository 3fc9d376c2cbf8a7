//! Recurring expense rules
//!
//! A rule describes an expense that repeats on a fixed interval. Each time it
//! fires the rule's `next_due` date moves forward by one interval; rules are
//! deactivated rather than deleted so the expenses they produced keep a
//! valid back-reference.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::category::Category;
use super::currency::Currency;
use super::expense::{normalize_tags, validate_amount, NewExpense, PaymentMethod};
use super::ids::RuleId;
use super::money::Money;
use super::period::YearMonth;
use crate::error::ExpenseError;

/// Repeat interval of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interval {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    /// Fixed number of days between occurrences
    EveryDays(u32),
}

impl Interval {
    /// The occurrence after `date`.
    ///
    /// Month-based intervals land on `anchor_day`, clamped to the last day of
    /// the target month, so a rule anchored on the 31st goes
    /// Jan 31 → Feb 28 → Mar 31. Returns `None` on calendar overflow.
    pub fn advance(&self, date: NaiveDate, anchor_day: u32) -> Option<NaiveDate> {
        let add_months = |months: i32| {
            let target = YearMonth::from_date(date).add_months(months);
            NaiveDate::from_ymd_opt(target.year(), target.month(), 1)
                .map(|_| target.clamped_day(anchor_day))
        };

        match self {
            Self::Daily => date.checked_add_days(Days::new(1)),
            Self::Weekly => date.checked_add_days(Days::new(7)),
            Self::EveryDays(days) => date.checked_add_days(Days::new(u64::from(*days))),
            Self::Monthly => add_months(1),
            Self::Quarterly => add_months(3),
            Self::Yearly => add_months(12),
        }
    }

    pub fn validate(&self) -> Result<(), ExpenseError> {
        match self {
            Self::EveryDays(0) => Err(ExpenseError::Validation(
                "Recurring interval must be at least one day".into(),
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
            Self::Quarterly => write!(f, "quarterly"),
            Self::Yearly => write!(f, "yearly"),
            Self::EveryDays(days) => write!(f, "every {} days", days),
        }
    }
}

impl FromStr for Interval {
    type Err = ExpenseError;

    /// Accepts the named intervals or a day count such as "10d" / "10days"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        let interval = match value.as_str() {
            "daily" => Self::Daily,
            "weekly" => Self::Weekly,
            "monthly" => Self::Monthly,
            "quarterly" => Self::Quarterly,
            "yearly" | "annually" => Self::Yearly,
            other => {
                let digits = other
                    .strip_suffix("days")
                    .or_else(|| other.strip_suffix('d'))
                    .ok_or_else(|| {
                        ExpenseError::Validation(format!(
                            "Unknown interval '{}' (daily, weekly, monthly, quarterly, yearly or <N>d)",
                            s.trim()
                        ))
                    })?;
                let days: u32 = digits.trim().parse().map_err(|_| {
                    ExpenseError::Validation(format!("Invalid day count in interval '{}'", s.trim()))
                })?;
                Self::EveryDays(days)
            }
        };
        interval.validate()?;
        Ok(interval)
    }
}

/// A recurring expense definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringRule {
    pub id: RuleId,

    pub category: Category,

    pub amount: Money,

    pub currency: Currency,

    pub interval: Interval,

    /// Date of the next occurrence that has not been materialized yet
    pub next_due: NaiveDate,

    /// Day-of-month month-based intervals aim for
    pub anchor_day: u32,

    pub active: bool,

    #[serde(default)]
    pub tags: BTreeSet<String>,

    #[serde(default)]
    pub payment_method: PaymentMethod,

    #[serde(default)]
    pub note: String,
}

impl RecurringRule {
    pub fn from_new(id: RuleId, new: NewRecurringRule) -> Self {
        Self {
            id,
            category: new.category,
            amount: new.amount,
            currency: new.currency,
            interval: new.interval,
            next_due: new.start,
            anchor_day: new.start.day(),
            active: true,
            tags: new.tags,
            payment_method: new.payment_method,
            note: new.note,
        }
    }

    /// Whether an occurrence is pending at or before `as_of`
    pub fn is_due(&self, as_of: NaiveDate) -> bool {
        self.active && self.next_due <= as_of
    }

    /// Move `next_due` forward by one interval
    pub fn advance(&mut self) -> Result<NaiveDate, ExpenseError> {
        let next = self
            .interval
            .advance(self.next_due, self.anchor_day)
            .filter(|next| *next > self.next_due)
            .ok_or_else(|| {
                ExpenseError::Validation(format!(
                    "Cannot advance {} past {}",
                    self.id, self.next_due
                ))
            })?;
        self.next_due = next;
        Ok(next)
    }

    /// Move `next_due` forward until it falls on or after `date`, returning
    /// the number of occurrences passed over
    pub fn skip_to(&mut self, date: NaiveDate) -> Result<usize, ExpenseError> {
        let mut skipped = 0;
        while self.next_due < date {
            self.advance()?;
            skipped += 1;
        }
        Ok(skipped)
    }

    /// The expense this rule produces for an occurrence on `date`
    pub fn occurrence(&self, date: NaiveDate) -> NewExpense {
        NewExpense {
            date,
            amount: self.amount,
            currency: self.currency,
            category: self.category,
            tags: self.tags.clone(),
            payment_method: self.payment_method,
            note: self.note.clone(),
            recurring_rule_id: Some(self.id),
        }
    }

    pub fn validate(&self) -> Result<(), ExpenseError> {
        validate_amount(self.amount)?;
        self.interval.validate()?;
        if !(1..=31).contains(&self.anchor_day) {
            return Err(ExpenseError::Validation(format!(
                "Invalid anchor day {} on {}",
                self.anchor_day, self.id
            )));
        }
        Ok(())
    }
}

/// Everything needed to create a rule; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecurringRule {
    pub category: Category,
    pub amount: Money,
    pub currency: Currency,
    pub interval: Interval,
    /// First occurrence
    pub start: NaiveDate,
    pub tags: BTreeSet<String>,
    pub payment_method: PaymentMethod,
    pub note: String,
}

impl NewRecurringRule {
    pub fn new(
        category: Category,
        amount: Money,
        currency: Currency,
        interval: Interval,
        start: NaiveDate,
    ) -> Self {
        Self {
            category,
            amount,
            currency,
            interval,
            start,
            tags: BTreeSet::new(),
            payment_method: PaymentMethod::default(),
            note: String::new(),
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
