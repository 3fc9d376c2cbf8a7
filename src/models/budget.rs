//! Budget model
//!
//! A budget caps spending for one scope (a category or overall) in one
//! month. Only one budget per (scope, month) may be active; replaced budgets
//! stay on file, deactivated.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::BudgetScope;
use super::currency::Currency;
use super::ids::BudgetId;
use super::money::{Money, MAX_AMOUNT};
use super::period::YearMonth;
use crate::error::ExpenseError;

/// Default percentage of the threshold at which a warning is raised
pub const DEFAULT_WARNING_PERCENT: u8 = 80;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,

    pub scope: BudgetScope,

    pub month: YearMonth,

    /// Spending ceiling in `currency`
    pub threshold: Money,

    pub currency: Currency,

    /// Percentage of `threshold` at which spending is flagged
    #[serde(default = "default_warning_percent")]
    pub warning_percent: u8,

    pub active: bool,
}

fn default_warning_percent() -> u8 {
    DEFAULT_WARNING_PERCENT
}

impl Budget {
    pub fn from_new(id: BudgetId, new: NewBudget) -> Self {
        Self {
            id,
            scope: new.scope,
            month: new.month,
            threshold: new.threshold,
            currency: new.currency,
            warning_percent: new.warning_percent,
            active: true,
        }
    }

    /// Whether this budget governs `scope` in `month`
    pub fn applies_to(&self, scope: BudgetScope, month: YearMonth) -> bool {
        self.active && self.scope == scope && self.month == month
    }

    pub fn validate(&self) -> Result<(), ExpenseError> {
        if !self.threshold.is_positive() {
            return Err(ExpenseError::Validation(format!(
                "Budget threshold must be greater than zero, got {}",
                self.threshold
            )));
        }
        if self.threshold > MAX_AMOUNT {
            return Err(ExpenseError::Validation(format!(
                "Budget threshold {} exceeds the maximum of {}",
                self.threshold, MAX_AMOUNT
            )));
        }
        if self.warning_percent == 0 || self.warning_percent > 100 {
            return Err(ExpenseError::Validation(format!(
                "Warning percentage must be between 1 and 100, got {}",
                self.warning_percent
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}",
            self.scope,
            self.month,
            self.currency.format(self.threshold)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBudget {
    pub scope: BudgetScope,
    pub month: YearMonth,
    pub threshold: Money,
    pub currency: Currency,
    pub warning_percent: u8,
}

impl NewBudget {
    pub fn new(scope: BudgetScope, month: YearMonth, threshold: Money, currency: Currency) -> Self {
        Self {
            scope,
            month,
            threshold,
            currency,
            warning_percent: DEFAULT_WARNING_PERCENT,
        }
    }

    pub fn with_warning_percent(mut self, percent: u8) -> Self {
        self.warning_percent = percent;
        self
    }
}

/// Severity of spending against a budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Ok,
    Warning,
    Exceeded,
}

impl AlertLevel {
    /// Classify `spent` against `threshold`; integer math so results are exact
    pub fn classify(spent: Money, threshold: Money, warning_percent: u8) -> Self {
        let spent = i128::from(spent.minor()) * 100;
        let limit = i128::from(threshold.minor());
        if spent >= limit * 100 {
            Self::Exceeded
        } else if spent >= limit * i128::from(warning_percent) {
            Self::Warning
        } else {
            Self::Ok
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Warning => write!(f, "warning"),
            Self::Exceeded => write!(f, "exceeded"),
        }
    }
}
