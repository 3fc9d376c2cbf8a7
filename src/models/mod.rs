//! Core data models for the expense tracker
//!
//! Expenses, recurring rules, budgets and exchange rate snapshots, plus the
//! closed sets (currency, category, payment method) they are built from.

pub mod budget;
pub mod category;
pub mod currency;
pub mod expense;
pub mod ids;
pub mod money;
pub mod period;
pub mod rates;
pub mod recurring;
pub mod tag;

pub use budget::{AlertLevel, Budget, NewBudget, DEFAULT_WARNING_PERCENT};
pub use category::{BudgetScope, Category};
pub use currency::Currency;
pub use expense::{Expense, ExpenseUpdate, NewExpense, PaymentMethod};
pub use ids::{BudgetId, ExpenseId, RuleId};
pub use money::{Money, MAX_AMOUNT};
pub use period::YearMonth;
pub use rates::RateSnapshot;
pub use recurring::{Interval, NewRecurringRule, RecurringRule};
pub use tag::{default_tag_rules, infer_category, TagRules};
