//! Monthly totals per category

use std::collections::BTreeMap;

use crate::error::ExpenseResult;
use crate::models::{Category, Currency, Expense, Money, YearMonth};
use crate::services::currency::{convert_amount, CurrencyConverter};
use crate::services::expense::filter_expenses;

use super::range::ReportRange;

/// month → category → amount in one currency
pub type MonthlyTotals = BTreeMap<YearMonth, BTreeMap<Category, Money>>;

/// Sum expenses per month and category, converted to `target`.
///
/// Only months and categories with at least one expense appear.
pub fn monthly_totals<'e, I>(
    expenses: I,
    target: Currency,
    converter: Option<&CurrencyConverter>,
) -> ExpenseResult<MonthlyTotals>
where
    I: IntoIterator<Item = &'e Expense>,
{
    let mut totals = MonthlyTotals::new();
    for expense in expenses {
        let amount = convert_amount(converter, expense.amount, expense.currency, target)?;
        *totals
            .entry(YearMonth::from_date(expense.date))
            .or_default()
            .entry(expense.category)
            .or_insert_with(Money::zero) += amount;
    }
    Ok(totals)
}

/// Month-by-month spending over a range, with empty months filled in
#[derive(Debug, Clone)]
pub struct MonthlyTrend {
    pub currency: Currency,
    pub months: Vec<(YearMonth, BTreeMap<Category, Money>)>,
}

impl MonthlyTrend {
    pub fn generate(
        expenses: &[Expense],
        range: ReportRange,
        target: Currency,
        converter: Option<&CurrencyConverter>,
    ) -> ExpenseResult<Self> {
        let selected = filter_expenses(expenses, &range.filter());
        let mut totals = monthly_totals(selected.iter().copied(), target, converter)?;

        let mut months = Vec::new();
        if let Some((start, end)) = range.bounded_by(&selected) {
            let last = YearMonth::from_date(end);
            let mut month = YearMonth::from_date(start);
            while month <= last {
                months.push((month, totals.remove(&month).unwrap_or_default()));
                month = month.next();
            }
        }

        Ok(Self {
            currency: target,
            months,
        })
    }

    /// Total of each month, in order
    pub fn month_totals(&self) -> Vec<(YearMonth, Money)> {
        self.months
            .iter()
            .map(|(month, categories)| (*month, categories.values().copied().sum()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.months.iter().all(|(_, c)| c.is_empty())
    }
}
