//! Table rendering with `tabled`

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Category, Expense, RateSnapshot, RecurringRule, TagRules};
use crate::services::BudgetStatus;

use super::format::{format_alert, truncate};

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Tags")]
    tags: String,
    #[tabled(rename = "Note")]
    note: String,
}

/// Expenses as a table, one row each; dates use the strftime `date_format`
pub fn expense_table(expenses: &[&Expense], date_format: &str) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let rows = expenses.iter().map(|e| ExpenseRow {
        id: e.id.to_string(),
        date: e.date.format(date_format).to_string(),
        amount: e.currency.format(e.amount),
        category: e.category.to_string(),
        method: e.payment_method.to_string(),
        tags: e.tags.iter().cloned().collect::<Vec<_>>().join(", "),
        note: format!(
            "{}{}",
            truncate(&e.note, 30),
            if e.is_recurring() { " (recurring)" } else { "" }
        ),
    });
    format!("{}\n", Table::new(rows).with(Style::rounded()))
}

/// Expense details, one field per line
pub fn expense_details(expense: &Expense, date_format: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("Expense:     {}\n", expense.id));
    output.push_str(&format!("Date:        {}\n", expense.date.format(date_format)));
    output.push_str(&format!(
        "Amount:      {} ({})\n",
        expense.currency.format(expense.amount),
        expense.currency
    ));
    output.push_str(&format!("Category:    {}\n", expense.category));
    output.push_str(&format!("Method:      {}\n", expense.payment_method));
    if !expense.tags.is_empty() {
        let tags: Vec<&str> = expense.tags.iter().map(String::as_str).collect();
        output.push_str(&format!("Tags:        {}\n", tags.join(", ")));
    }
    if !expense.note.is_empty() {
        output.push_str(&format!("Note:        {}\n", expense.note));
    }
    if let Some(rule) = expense.recurring_rule_id {
        output.push_str(&format!("Recurring:   {}\n", rule));
    }
    output
}

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Interval")]
    interval: String,
    #[tabled(rename = "Next Due")]
    next_due: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Note")]
    note: String,
}

pub fn rule_table(rules: &[&RecurringRule]) -> String {
    if rules.is_empty() {
        return "No recurring expenses.\n".to_string();
    }

    let rows = rules.iter().map(|r| RuleRow {
        id: r.id.to_string(),
        amount: r.currency.format(r.amount),
        category: r.category.to_string(),
        interval: r.interval.to_string(),
        next_due: r.next_due.to_string(),
        status: if r.active { "active" } else { "inactive" }.to_string(),
        note: truncate(&r.note, 30),
    });
    format!("{}\n", Table::new(rows).with(Style::rounded()))
}

#[derive(Tabled)]
struct BudgetRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Scope")]
    scope: String,
    #[tabled(rename = "Spent")]
    spent: String,
    #[tabled(rename = "Budget")]
    threshold: String,
    #[tabled(rename = "Remaining")]
    remaining: String,
    #[tabled(rename = "Used")]
    used: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub fn budget_table(statuses: &[BudgetStatus]) -> String {
    if statuses.is_empty() {
        return "No active budgets.\n".to_string();
    }

    let rows = statuses.iter().map(|s| {
        let currency = s.budget.currency;
        BudgetRow {
            id: s.budget.id.to_string(),
            month: s.budget.month.to_string(),
            scope: s.budget.scope.to_string(),
            spent: currency.format(s.spent),
            threshold: currency.format(s.budget.threshold),
            remaining: currency.format(s.remaining),
            used: format!("{}%", s.percent_used),
            status: format_alert(s.level).to_string(),
        }
    });
    format!("{}\n", Table::new(rows).with(Style::rounded()))
}

/// One line per budget at warning level or above
pub fn format_budget_alert(status: &BudgetStatus) -> String {
    let currency = status.budget.currency;
    format!(
        "{}: {} budget for {} at {}% ({} of {})",
        format_alert(status.level),
        status.budget.scope,
        status.budget.month.label(),
        status.percent_used,
        currency.format(status.spent),
        currency.format(status.budget.threshold)
    )
}

#[derive(Tabled)]
struct TagRow {
    #[tabled(rename = "Tag")]
    tag: String,
    #[tabled(rename = "Category")]
    category: Category,
}

pub fn tag_table(rules: &TagRules) -> String {
    if rules.is_empty() {
        return "No tag rules.\n".to_string();
    }

    let rows = rules.iter().map(|(tag, category)| TagRow {
        tag: tag.clone(),
        category: *category,
    });
    format!("{}\n", Table::new(rows).with(Style::rounded()))
}

#[derive(Tabled)]
struct RateRow {
    #[tabled(rename = "Currency")]
    code: String,
    #[tabled(rename = "Rate")]
    rate: String,
}

pub fn rates_table(snapshot: &RateSnapshot) -> String {
    let rows = snapshot.rates.iter().map(|(currency, rate)| RateRow {
        code: format!("{} {}", currency.code(), currency.symbol()),
        rate: rate.normalize().to_string(),
    });
    format!(
        "Base: {}  Fetched: {}\n{}\n",
        snapshot.base,
        snapshot.fetched_at.format("%Y-%m-%d %H:%M UTC"),
        Table::new(rows).with(Style::rounded())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AlertLevel, Budget, BudgetId, BudgetScope, Currency, ExpenseId, Money, NewBudget,
        NewExpense,
    };
    use chrono::NaiveDate;

    fn expense() -> Expense {
        Expense::from_new(
            ExpenseId::new(7),
            NewExpense::new(
                NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
                Money::from_minor(123_456),
                Currency::Inr,
                Category::Food,
            )
            .with_tags(["dining"])
            .with_note("Dinner"),
        )
    }

    #[test]
    fn test_expense_table() {
        let e = expense();
        let table = expense_table(&[&e], "%d/%m/%Y");
        assert!(table.contains("exp-7"));
        assert!(table.contains("15/01/2025"));
        assert!(table.contains("₹1,234.56"));
        assert!(table.contains("dining"));
        assert_eq!(expense_table(&[], "%Y-%m-%d"), "No expenses found.\n");
    }

    #[test]
    fn test_expense_details() {
        let details = expense_details(&expense(), "%Y-%m-%d");
        assert!(details.contains("Category:    Food"));
        assert!(details.contains("Note:        Dinner"));
        assert!(!details.contains("Recurring"));
    }

    #[test]
    fn test_budget_alert_line() {
        let budget = Budget::from_new(
            BudgetId::new(1),
            NewBudget::new(
                BudgetScope::Category(Category::Food),
                "2025-01".parse().unwrap(),
                Money::from_minor(1_000_000),
                Currency::Inr,
            ),
        );
        let status = BudgetStatus {
            budget,
            spent: Money::from_minor(820_000),
            remaining: Money::from_minor(180_000),
            percent_used: 82,
            level: AlertLevel::Warning,
        };
        assert_eq!(
            format_budget_alert(&status),
            "WARNING: Food budget for Jan 2025 at 82% (₹8,200.00 of ₹10,000.00)"
        );
        assert!(budget_table(&[status]).contains("WARNING"));
    }

    #[test]
    fn test_tag_table() {
        let table = tag_table(&crate::models::default_tag_rules());
        assert!(table.contains("mutual fund"));
        assert!(table.contains("Investment"));
    }
}
