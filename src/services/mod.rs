//! Service layer for the expense tracker
//!
//! Services sit on top of the record store, handling validation, derived
//! values and persistence after each mutation.

pub mod budget;
pub mod currency;
pub mod expense;
pub mod recurrence;
pub mod tag;

pub use budget::{BudgetStatus, BudgetTracker};
pub use currency::{convert_amount, CurrencyConverter, RateOrigin, RateService};
pub use expense::{ExpenseFilter, ExpenseService};
pub use recurrence::{due_rules, materialize, run_due, Materialized, RecurrenceService};
pub use tag::TagService;
