//! Reports module for the expense tracker
//!
//! Category breakdowns, monthly totals and the date-range presets they
//! share.

pub mod monthly;
pub mod range;
pub mod spending;

pub use monthly::{monthly_totals, MonthlyTotals, MonthlyTrend};
pub use range::ReportRange;
pub use spending::{BudgetLine, CategorySpending, RecurringLine, SpendingReport};
