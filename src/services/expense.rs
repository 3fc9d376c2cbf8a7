//! Expense service
//!
//! Adds, edits, deletes and queries expenses. Every mutation is persisted
//! before the method returns.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{
    infer_category, Category, Currency, Expense, ExpenseId, ExpenseUpdate, NewExpense,
};
use crate::storage::Store;

/// Criteria for listing expenses; unset fields match everything
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Inclusive lower bound
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound
    pub to: Option<NaiveDate>,
    pub category: Option<Category>,
    pub tag: Option<String>,
    pub currency: Option<Currency>,
    pub limit: Option<usize>,
}

impl ExpenseFilter {
    pub fn between(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self {
            from,
            to,
            ..Default::default()
        }
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        self.from.map_or(true, |from| expense.date >= from)
            && self.to.map_or(true, |to| expense.date <= to)
            && self.category.map_or(true, |c| expense.category == c)
            && self.currency.map_or(true, |c| expense.currency == c)
            && self.tag.as_deref().map_or(true, |t| expense.has_tag(t))
    }
}

/// Expenses matching `filter`, oldest first (ties broken by id)
pub fn filter_expenses<'e>(expenses: &'e [Expense], filter: &ExpenseFilter) -> Vec<&'e Expense> {
    let mut matched: Vec<&Expense> = expenses.iter().filter(|e| filter.matches(e)).collect();
    matched.sort_by_key(|e| (e.date, e.id));
    if let Some(limit) = filter.limit {
        // Keep the most recent `limit` entries
        let skip = matched.len().saturating_sub(limit);
        matched.drain(..skip);
    }
    matched
}

/// Service for expense management
pub struct ExpenseService<'a> {
    store: &'a mut Store,
}

impl<'a> ExpenseService<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    /// Category to use for a new expense: the explicit one, else one inferred
    /// from the tag rules
    pub fn resolve_category(
        &self,
        explicit: Option<Category>,
        tags: &BTreeSet<String>,
        note: &str,
    ) -> Category {
        explicit.unwrap_or_else(|| infer_category(self.store.tag_rules(), tags, note))
    }

    /// Record a new expense
    pub fn add(&mut self, new: NewExpense) -> ExpenseResult<Expense> {
        let id = self.store.append(new)?;
        self.store.save()?;
        debug!(%id, "Added expense");
        self.get(id)
    }

    pub fn get(&self, id: ExpenseId) -> ExpenseResult<Expense> {
        self.store
            .expense(id)
            .cloned()
            .ok_or_else(|| ExpenseError::expense_not_found(id.to_string()))
    }

    /// Apply a partial edit
    pub fn edit(&mut self, id: ExpenseId, update: &ExpenseUpdate) -> ExpenseResult<Expense> {
        if update.is_empty() {
            return Err(ExpenseError::Validation("Nothing to change".into()));
        }
        let expense = self.store.update(id, update)?.clone();
        self.store.save()?;
        debug!(%id, "Edited expense");
        Ok(expense)
    }

    pub fn delete(&mut self, id: ExpenseId) -> ExpenseResult<Expense> {
        let removed = self.store.delete(id)?;
        self.store.save()?;
        debug!(%id, "Deleted expense");
        Ok(removed)
    }

    pub fn list(&self, filter: &ExpenseFilter) -> Vec<&Expense> {
        filter_expenses(self.store.expenses(), filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (TempDir, Store) {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path().join("expenses.json")).unwrap();
        (temp_dir, store)
    }

    fn new_expense(d: NaiveDate, minor: i64, category: Category) -> NewExpense {
        NewExpense::new(d, Money::from_minor(minor), Currency::Inr, category)
    }

    #[test]
    fn test_add_persists() {
        let (temp_dir, mut store) = setup();
        let mut service = ExpenseService::new(&mut store);
        let added = service
            .add(new_expense(date(2025, 1, 10), 5_000, Category::Food).with_note("Lunch"))
            .unwrap();
        assert_eq!(added.note, "Lunch");

        let reopened = Store::open(temp_dir.path().join("expenses.json")).unwrap();
        assert_eq!(reopened.expenses().len(), 1);
    }

    #[test]
    fn test_add_rejects_zero_amount() {
        let (_temp_dir, mut store) = setup();
        let mut service = ExpenseService::new(&mut store);
        let err = service
            .add(new_expense(date(2025, 1, 10), 0, Category::Food))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(service.list(&ExpenseFilter::default()).is_empty());
    }

    #[test]
    fn test_resolve_category() {
        let (_temp_dir, mut store) = setup();
        let service = ExpenseService::new(&mut store);
        let tags = BTreeSet::from(["groceries".to_string()]);
        assert_eq!(service.resolve_category(None, &tags, ""), Category::Food);
        assert_eq!(
            service.resolve_category(Some(Category::Health), &tags, ""),
            Category::Health
        );
        assert_eq!(
            service.resolve_category(None, &BTreeSet::new(), "flight to Goa"),
            Category::Travel
        );
    }

    #[test]
    fn test_edit_and_delete() {
        let (_temp_dir, mut store) = setup();
        let mut service = ExpenseService::new(&mut store);
        let id = service
            .add(new_expense(date(2025, 1, 10), 5_000, Category::Food))
            .unwrap()
            .id;

        assert!(service.edit(id, &ExpenseUpdate::default()).is_err());

        let update = ExpenseUpdate {
            category: Some(Category::Entertainment),
            ..Default::default()
        };
        assert_eq!(service.edit(id, &update).unwrap().category, Category::Entertainment);

        service.delete(id).unwrap();
        assert!(service.get(id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_filters_and_orders() {
        let (_temp_dir, mut store) = setup();
        let mut service = ExpenseService::new(&mut store);
        service
            .add(new_expense(date(2025, 2, 1), 300, Category::Food).with_tags(["dining"]))
            .unwrap();
        service
            .add(new_expense(date(2025, 1, 5), 100, Category::Food))
            .unwrap();
        service
            .add(new_expense(date(2025, 1, 20), 200, Category::Travel))
            .unwrap();

        let all = service.list(&ExpenseFilter::default());
        let dates: Vec<_> = all.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![date(2025, 1, 5), date(2025, 1, 20), date(2025, 2, 1)]);

        let january = service.list(&ExpenseFilter::between(
            Some(date(2025, 1, 1)),
            Some(date(2025, 1, 31)),
        ));
        assert_eq!(january.len(), 2);

        let food = ExpenseFilter {
            category: Some(Category::Food),
            ..Default::default()
        };
        assert_eq!(service.list(&food).len(), 2);

        let dining = ExpenseFilter {
            tag: Some("Dining".into()),
            ..Default::default()
        };
        assert_eq!(service.list(&dining).len(), 1);

        let latest = ExpenseFilter {
            limit: Some(1),
            ..Default::default()
        };
        assert_eq!(service.list(&latest)[0].date, date(2025, 2, 1));
    }
}
