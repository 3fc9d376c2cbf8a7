//! Date ranges for reports

use chrono::{Days, NaiveDate};
use std::fmt;

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Expense, YearMonth};
use crate::services::ExpenseFilter;

/// Number of days the "last three months" preset looks back
pub const LAST_THREE_MONTHS_DAYS: u64 = 90;

/// Inclusive date range; an open end matches everything on that side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ReportRange {
    /// The calendar month containing `today`
    pub fn current_month(today: NaiveDate) -> Self {
        let month = YearMonth::from_date(today);
        Self {
            start: Some(month.first_day()),
            end: Some(month.last_day()),
        }
    }

    /// The 90 days up to and including `today`
    pub fn last_three_months(today: NaiveDate) -> Self {
        Self {
            start: today.checked_sub_days(Days::new(LAST_THREE_MONTHS_DAYS)),
            end: Some(today),
        }
    }

    /// A user-supplied range; `start` must not be after `end`
    pub fn custom(start: Option<NaiveDate>, end: Option<NaiveDate>) -> ExpenseResult<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(ExpenseError::Validation(format!(
                    "Start date {} is after end date {}",
                    s, e
                )));
            }
        }
        Ok(Self { start, end })
    }

    pub fn all_time() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }

    /// Whether any day of `month` falls in the range
    pub fn overlaps(&self, month: YearMonth) -> bool {
        self.start.map_or(true, |s| month.last_day() >= s)
            && self.end.map_or(true, |e| month.first_day() <= e)
    }

    pub fn filter(&self) -> ExpenseFilter {
        ExpenseFilter::between(self.start, self.end)
    }

    /// Close open ends using the dates of `expenses`; `None` if nothing
    /// bounds the range
    pub fn bounded_by(&self, expenses: &[&Expense]) -> Option<(NaiveDate, NaiveDate)> {
        let start = self
            .start
            .or_else(|| expenses.iter().map(|e| e.date).min())?;
        let end = self.end.or_else(|| expenses.iter().map(|e| e.date).max())?;
        (start <= end).then_some((start, end))
    }
}

impl fmt::Display for ReportRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const FMT: &str = "%d %b %Y";
        match (self.start, self.end) {
            (Some(s), Some(e)) => write!(f, "{} to {}", s.format(FMT), e.format(FMT)),
            (Some(s), None) => write!(f, "Since {}", s.format(FMT)),
            (None, Some(e)) => write!(f, "Until {}", e.format(FMT)),
            (None, None) => write!(f, "All expenses"),
        }
    }
}
