//! Budget tracker
//!
//! Spend is always recomputed from the stored expenses and compared against
//! the active budget for a scope and month; nothing is cached between calls.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{
    AlertLevel, Budget, BudgetId, BudgetScope, Category, Currency, Expense, Money, NewBudget,
    NewExpense, YearMonth,
};
use crate::services::currency::{convert_amount, CurrencyConverter};
use crate::storage::Store;

/// Spending against one budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetStatus {
    pub budget: Budget,
    /// Spend in the budget currency
    pub spent: Money,
    /// Threshold minus spent; negative once exceeded
    pub remaining: Money,
    /// Whole percent of the threshold used
    pub percent_used: i64,
    pub level: AlertLevel,
}

impl BudgetStatus {
    fn new(budget: &Budget, spent: Money) -> Self {
        let threshold = budget.threshold.minor();
        let percent_used = if threshold > 0 {
            (i128::from(spent.minor()) * 100 / i128::from(threshold)) as i64
        } else {
            0
        };
        Self {
            budget: budget.clone(),
            spent,
            remaining: budget.threshold - spent,
            percent_used,
            level: AlertLevel::classify(spent, budget.threshold, budget.warning_percent),
        }
    }

    pub fn is_alert(&self) -> bool {
        self.level >= AlertLevel::Warning
    }
}

/// Total spend for `scope` in `month`, converted to `target`
pub fn spent_in(
    expenses: &[Expense],
    scope: BudgetScope,
    month: YearMonth,
    target: Currency,
    converter: Option<&CurrencyConverter>,
) -> ExpenseResult<Money> {
    expenses
        .iter()
        .filter(|e| month.contains(e.date) && scope.covers(e.category))
        .map(|e| convert_amount(converter, e.amount, e.currency, target))
        .sum()
}

/// Status of one budget over the expenses in `store`
pub fn budget_status(
    store: &Store,
    budget: &Budget,
    converter: Option<&CurrencyConverter>,
) -> ExpenseResult<BudgetStatus> {
    let spent = spent_in(
        store.expenses(),
        budget.scope,
        budget.month,
        budget.currency,
        converter,
    )?;
    Ok(BudgetStatus::new(budget, spent))
}

/// Currencies that appear in the expenses a budget covers
pub fn currencies_in(
    expenses: &[Expense],
    scope: BudgetScope,
    month: YearMonth,
) -> impl Iterator<Item = Currency> + '_ {
    expenses
        .iter()
        .filter(move |e| month.contains(e.date) && scope.covers(e.category))
        .map(|e| e.currency)
}

/// Service for budget management and threshold checks
pub struct BudgetTracker<'a> {
    store: &'a mut Store,
    converter: Option<&'a CurrencyConverter>,
}

impl<'a> BudgetTracker<'a> {
    pub fn new(store: &'a mut Store, converter: Option<&'a CurrencyConverter>) -> Self {
        Self { store, converter }
    }

    /// Set the budget for a scope and month, replacing any active one
    pub fn set_budget(&mut self, new: NewBudget) -> ExpenseResult<(Budget, Option<BudgetId>)> {
        let (id, replaced) = self.store.set_budget(new)?;
        self.store.save()?;
        debug!(%id, ?replaced, "Set budget");
        let budget = self
            .store
            .budgets()
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| ExpenseError::budget_not_found(id.to_string()))?;
        Ok((budget, replaced))
    }

    /// Deactivate a budget
    pub fn remove_budget(&mut self, id: BudgetId) -> ExpenseResult<Budget> {
        let budget = self.store.remove_budget(id)?.clone();
        self.store.save()?;
        Ok(budget)
    }

    /// Record spending against a scope in a month.
    ///
    /// The expense is dated `today` when that falls in `month`, otherwise on
    /// the first of the month. Overall spend is filed under `Other`.
    pub fn record_spend(
        &mut self,
        scope: BudgetScope,
        month: YearMonth,
        amount: Money,
        currency: Currency,
        today: NaiveDate,
    ) -> ExpenseResult<Expense> {
        let date = if month.contains(today) {
            today
        } else {
            month.first_day()
        };
        let category = match scope {
            BudgetScope::Overall => Category::Other,
            BudgetScope::Category(c) => c,
        };
        let id = self
            .store
            .append(NewExpense::new(date, amount, currency, category))?;
        self.store.save()?;
        self.store
            .expense(id)
            .cloned()
            .ok_or_else(|| ExpenseError::expense_not_found(id.to_string()))
    }

    /// Alert level for a scope and month; `Ok` when no budget is active
    pub fn check_threshold(&self, scope: BudgetScope, month: YearMonth) -> ExpenseResult<AlertLevel> {
        Ok(self
            .status(scope, month)?
            .map_or(AlertLevel::Ok, |status| status.level))
    }

    /// Spending against the active budget for a scope and month
    pub fn status(
        &self,
        scope: BudgetScope,
        month: YearMonth,
    ) -> ExpenseResult<Option<BudgetStatus>> {
        self.store
            .active_budget(scope, month)
            .map(|budget| budget_status(&*self.store, budget, self.converter))
            .transpose()
    }

    /// Status of every active budget in `month`, overall first
    pub fn month_statuses(&self, month: YearMonth) -> ExpenseResult<Vec<BudgetStatus>> {
        let mut budgets: Vec<&Budget> = self
            .store
            .budgets()
            .iter()
            .filter(|b| b.active && b.month == month)
            .collect();
        budgets.sort_by_key(|b| b.scope);
        budgets
            .into_iter()
            .map(|b| budget_status(&*self.store, b, self.converter))
            .collect()
    }

    /// Budgets touched by `expense` that are at warning level or above
    pub fn alerts_for(&self, expense: &Expense) -> ExpenseResult<Vec<BudgetStatus>> {
        let month = YearMonth::from_date(expense.date);
        let scopes = [BudgetScope::Category(expense.category), BudgetScope::Overall];
        let mut alerts = Vec::new();
        for scope in scopes {
            if let Some(status) = self.status(scope, month)? {
                if status.is_alert() {
                    alerts.push(status);
                }
            }
        }
        Ok(alerts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    use crate::models::{RateSnapshot, MAX_AMOUNT};

    fn rupees(amount: i64) -> Money {
        Money::from_minor(amount * 100)
    }

    fn january() -> YearMonth {
        "2025-01".parse().unwrap()
    }

    fn setup() -> (TempDir, Store) {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path().join("expenses.json")).unwrap();
        (temp_dir, store)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 20).unwrap()
    }

    #[test]
    fn test_food_budget_warning_then_exceeded() {
        let (_temp_dir, mut store) = setup();
        let mut tracker = BudgetTracker::new(&mut store, None);
        let food = BudgetScope::Category(Category::Food);

        tracker
            .set_budget(NewBudget::new(food, january(), rupees(10_000), Currency::Inr))
            .unwrap();
        assert_eq!(tracker.check_threshold(food, january()).unwrap(), AlertLevel::Ok);

        tracker
            .record_spend(food, january(), rupees(8_200), Currency::Inr, today())
            .unwrap();
        assert_eq!(
            tracker.check_threshold(food, january()).unwrap(),
            AlertLevel::Warning
        );

        tracker
            .record_spend(food, january(), rupees(1_900), Currency::Inr, today())
            .unwrap();
        assert_eq!(
            tracker.check_threshold(food, january()).unwrap(),
            AlertLevel::Exceeded
        );

        let status = tracker.status(food, january()).unwrap().unwrap();
        assert_eq!(status.spent, rupees(10_100));
        assert_eq!(status.remaining, rupees(-100));
        assert_eq!(status.percent_used, 101);
    }

    #[test]
    fn test_huge_spend_is_rejected_and_totals_stay_sane() {
        let (_temp_dir, mut store) = setup();
        let mut tracker = BudgetTracker::new(&mut store, None);
        tracker
            .set_budget(NewBudget::new(
                BudgetScope::Overall,
                january(),
                rupees(10_000),
                Currency::Inr,
            ))
            .unwrap();

        let huge = Money::parse("50,000,000,000,000,000").unwrap();
        let err = tracker
            .record_spend(BudgetScope::Overall, january(), huge, Currency::Inr, today())
            .unwrap_err();
        assert!(err.is_validation());

        for _ in 0..2 {
            tracker
                .record_spend(BudgetScope::Overall, january(), MAX_AMOUNT, Currency::Inr, today())
                .unwrap();
        }
        let status = tracker.status(BudgetScope::Overall, january()).unwrap().unwrap();
        assert_eq!(status.spent, MAX_AMOUNT + MAX_AMOUNT);
        assert_eq!(status.level, AlertLevel::Exceeded);
        assert!(status.remaining.is_negative());
    }

    #[test]
    fn test_no_budget_is_ok() {
        let (_temp_dir, mut store) = setup();
        let mut tracker = BudgetTracker::new(&mut store, None);
        tracker
            .record_spend(BudgetScope::Overall, january(), rupees(1_000_000), Currency::Inr, today())
            .unwrap();
        assert_eq!(
            tracker.check_threshold(BudgetScope::Overall, january()).unwrap(),
            AlertLevel::Ok
        );
    }

    #[test]
    fn test_record_spend_dates() {
        let (_temp_dir, mut store) = setup();
        let mut tracker = BudgetTracker::new(&mut store, None);
        let food = BudgetScope::Category(Category::Food);

        let inside = tracker
            .record_spend(food, january(), rupees(1), Currency::Inr, today())
            .unwrap();
        assert_eq!(inside.date, today());
        assert_eq!(inside.category, Category::Food);

        let outside = tracker
            .record_spend(BudgetScope::Overall, january().next(), rupees(1), Currency::Inr, today())
            .unwrap();
        assert_eq!(outside.date, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(outside.category, Category::Other);
    }

    #[test]
    fn test_overall_counts_every_category_and_other_months_are_ignored() {
        let (_temp_dir, mut store) = setup();
        let mut tracker = BudgetTracker::new(&mut store, None);
        tracker
            .set_budget(NewBudget::new(
                BudgetScope::Overall,
                january(),
                rupees(1_000),
                Currency::Inr,
            ))
            .unwrap();
        for category in [Category::Food, Category::Travel, Category::Health] {
            tracker
                .record_spend(BudgetScope::Category(category), january(), rupees(300), Currency::Inr, today())
                .unwrap();
        }
        tracker
            .record_spend(BudgetScope::Overall, january().prev(), rupees(5_000), Currency::Inr, today())
            .unwrap();

        let status = tracker.status(BudgetScope::Overall, january()).unwrap().unwrap();
        assert_eq!(status.spent, rupees(900));
        assert_eq!(status.level, AlertLevel::Warning);
    }

    #[test]
    fn test_foreign_spend_needs_rates() {
        let (_temp_dir, mut store) = setup();
        let food = BudgetScope::Category(Category::Food);
        {
            let mut tracker = BudgetTracker::new(&mut store, None);
            tracker
                .set_budget(NewBudget::new(food, january(), rupees(10_000), Currency::Inr))
                .unwrap();
            tracker
                .record_spend(food, january(), Money::from_minor(10_000), Currency::Usd, today())
                .unwrap();
            assert!(matches!(
                tracker.check_threshold(food, january()).unwrap_err(),
                ExpenseError::RateFetch(_)
            ));
        }

        let rates = BTreeMap::from([(Currency::Usd, Decimal::new(1, 2))]);
        let fetched_at = Utc.with_ymd_and_hms(2025, 1, 20, 0, 0, 0).unwrap();
        let converter =
            CurrencyConverter::new(RateSnapshot::new(Currency::Inr, rates, fetched_at).unwrap());
        let tracker = BudgetTracker::new(&mut store, Some(&converter));
        // $100 at 0.01 USD/INR is ₹10,000
        assert_eq!(
            tracker.check_threshold(food, january()).unwrap(),
            AlertLevel::Exceeded
        );
    }

    #[test]
    fn test_replacing_and_removing_budgets() {
        let (_temp_dir, mut store) = setup();
        let mut tracker = BudgetTracker::new(&mut store, None);
        let food = BudgetScope::Category(Category::Food);

        let (first, _) = tracker
            .set_budget(NewBudget::new(food, january(), rupees(100), Currency::Inr))
            .unwrap();
        let (second, replaced) = tracker
            .set_budget(NewBudget::new(food, january(), rupees(50), Currency::Inr))
            .unwrap();
        assert_eq!(replaced, Some(first.id));

        tracker
            .record_spend(food, january(), rupees(60), Currency::Inr, today())
            .unwrap();
        assert_eq!(
            tracker.check_threshold(food, january()).unwrap(),
            AlertLevel::Exceeded
        );

        tracker.remove_budget(second.id).unwrap();
        assert_eq!(tracker.check_threshold(food, january()).unwrap(), AlertLevel::Ok);
        assert!(tracker.remove_budget(second.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_alerts_for_expense() {
        let (_temp_dir, mut store) = setup();
        let mut tracker = BudgetTracker::new(&mut store, None);
        let food = BudgetScope::Category(Category::Food);
        tracker
            .set_budget(NewBudget::new(food, january(), rupees(100), Currency::Inr))
            .unwrap();
        tracker
            .set_budget(NewBudget::new(BudgetScope::Overall, january(), rupees(1_000), Currency::Inr))
            .unwrap();

        let small = tracker
            .record_spend(food, january(), rupees(50), Currency::Inr, today())
            .unwrap();
        assert!(tracker.alerts_for(&small).unwrap().is_empty());

        let big = tracker
            .record_spend(food, january(), rupees(40), Currency::Inr, today())
            .unwrap();
        let alerts = tracker.alerts_for(&big).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].budget.scope, food);
        assert_eq!(alerts[0].level, AlertLevel::Warning);
        assert_eq!(tracker.month_statuses(january()).unwrap().len(), 2);
    }
}
