//! Spending Report
//!
//! Category breakdown over a date range in one currency, plus the budget
//! status and active recurring rules that go with it.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::error::ExpenseResult;
use crate::models::{AlertLevel, BudgetScope, Category, Currency, Interval, Money, YearMonth};
use crate::services::budget::budget_status;
use crate::services::currency::{convert_amount, CurrencyConverter};
use crate::services::expense::filter_expenses;
use crate::storage::Store;

use super::range::ReportRange;

/// Spending in one category
#[derive(Debug, Clone)]
pub struct CategorySpending {
    pub category: Category,
    pub total: Money,
    pub count: usize,
    /// Share of the report total
    pub percentage: f64,
}

/// A budget line, with amounts in the report currency
#[derive(Debug, Clone)]
pub struct BudgetLine {
    pub scope: BudgetScope,
    pub month: YearMonth,
    pub spent: Money,
    pub threshold: Money,
    pub remaining: Money,
    pub percent_used: i64,
    pub level: AlertLevel,
}

/// An active recurring rule, with its amount in the report currency
#[derive(Debug, Clone)]
pub struct RecurringLine {
    pub note: String,
    pub category: Category,
    pub amount: Money,
    pub interval: Interval,
    pub next_due: NaiveDate,
}

/// Spending Report
#[derive(Debug, Clone)]
pub struct SpendingReport {
    pub owner: String,
    pub currency: Currency,
    pub range: ReportRange,
    /// Categories with spending, largest first
    pub categories: Vec<CategorySpending>,
    pub total: Money,
    pub expense_count: usize,
    pub budgets: Vec<BudgetLine>,
    pub recurring: Vec<RecurringLine>,
}

impl SpendingReport {
    /// Generate a spending report for a date range
    pub fn generate(
        store: &Store,
        range: ReportRange,
        currency: Currency,
        converter: Option<&CurrencyConverter>,
        owner: &str,
    ) -> ExpenseResult<Self> {
        let expenses = filter_expenses(store.expenses(), &range.filter());

        let mut by_category: BTreeMap<Category, (Money, usize)> = BTreeMap::new();
        for expense in &expenses {
            let amount = convert_amount(converter, expense.amount, expense.currency, currency)?;
            let entry = by_category
                .entry(expense.category)
                .or_insert((Money::zero(), 0));
            entry.0 += amount;
            entry.1 += 1;
        }

        let total: Money = by_category.values().map(|(amount, _)| *amount).sum();
        let mut categories: Vec<CategorySpending> = by_category
            .into_iter()
            .filter(|(_, (amount, _))| amount.is_positive())
            .map(|(category, (amount, count))| CategorySpending {
                category,
                total: amount,
                count,
                percentage: share(amount, total),
            })
            .collect();
        categories.sort_by(|a, b| b.total.cmp(&a.total).then(a.category.cmp(&b.category)));

        let mut budgets = Vec::new();
        let mut active: Vec<_> = store
            .budgets()
            .iter()
            .filter(|b| b.active && range.overlaps(b.month))
            .collect();
        active.sort_by_key(|b| (b.month, b.scope));
        for budget in active {
            let status = budget_status(store, budget, converter)?;
            let to_report =
                |amount: Money| convert_amount(converter, amount, budget.currency, currency);
            budgets.push(BudgetLine {
                scope: budget.scope,
                month: budget.month,
                spent: to_report(status.spent)?,
                threshold: to_report(budget.threshold)?,
                remaining: to_report(status.remaining)?,
                percent_used: status.percent_used,
                level: status.level,
            });
        }

        let mut recurring = Vec::new();
        for rule in store.rules().iter().filter(|r| r.active) {
            recurring.push(RecurringLine {
                note: rule.note.clone(),
                category: rule.category,
                amount: convert_amount(converter, rule.amount, rule.currency, currency)?,
                interval: rule.interval,
                next_due: rule.next_due,
            });
        }

        Ok(Self {
            owner: owner.to_string(),
            currency,
            range,
            categories,
            total,
            expense_count: expenses.len(),
            budgets,
            recurring,
        })
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let fmt = |amount: Money| self.currency.format(amount);
        let mut output = String::new();

        output.push_str(&format!("Expense Report for {}\n", self.owner));
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!("Currency: {}\n", self.currency));
        output.push_str(&format!("Period: {}\n", self.range));
        output.push_str(&format!("Expenses: {}\n\n", self.expense_count));

        output.push_str("Category Breakdown\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        if self.categories.is_empty() {
            output.push_str("  No expenses in this period\n");
        }
        for line in &self.categories {
            output.push_str(&format!(
                "  {:<20} {:>18} {:>6} {:>7.1}%\n",
                line.category.name(),
                fmt(line.total),
                line.count,
                line.percentage
            ));
        }
        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "  {:<20} {:>18} {:>6}\n",
            "Total Spending",
            fmt(self.total),
            self.expense_count
        ));

        if !self.budgets.is_empty() {
            output.push_str("\nBudget Status\n");
            for line in &self.budgets {
                output.push_str(&format!(
                    "  {} {}: {}/{} ({}% used, remaining {}) [{}]\n",
                    line.month,
                    line.scope,
                    fmt(line.spent),
                    fmt(line.threshold),
                    line.percent_used,
                    fmt(line.remaining),
                    line.level
                ));
            }
        }

        if !self.recurring.is_empty() {
            output.push_str("\nRecurring Expenses\n");
            for line in &self.recurring {
                let label = if line.note.is_empty() {
                    line.category.name()
                } else {
                    line.note.as_str()
                };
                output.push_str(&format!(
                    "  {}: {} {} (next {})\n",
                    label,
                    fmt(line.amount),
                    line.interval,
                    line.next_due
                ));
            }
        }

        output
    }

    /// Get top spending categories
    pub fn top_categories(&self, limit: usize) -> &[CategorySpending] {
        &self.categories[..limit.min(self.categories.len())]
    }
}

fn share(part: Money, total: Money) -> f64 {
    if total.is_zero() {
        0.0
    } else {
        part.minor() as f64 / total.minor() as f64 * 100.0
    }
}
