//! Display formatting for terminal output
//!
//! Tables, text charts and the small formatting helpers they share.

pub mod chart;
pub mod format;
pub mod tables;

pub use chart::{render_share_chart, render_trend_chart};
pub use format::{format_alert, format_bar, format_percentage, separator, truncate};
pub use tables::{
    budget_table, expense_details, expense_table, format_budget_alert, rates_table, rule_table,
    tag_table,
};
