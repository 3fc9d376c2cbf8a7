//! Expense Tracker - single-user expense tracking from the command line
//!
//! This library provides the core functionality behind the `extrack` binary:
//! expenses in several currencies, monthly budgets with threshold alerts,
//! recurring expenses that catch up on missed periods, reports and CSV
//! export. All records live in one JSON file that is replaced atomically on
//! every save.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Settings and path management
//! - `error`: Custom error types
//! - `models`: Core data models (expenses, rules, budgets, rates, ...)
//! - `storage`: JSON record store and exchange rate cache
//! - `providers`: Exchange rate sources
//! - `services`: Business logic layer
//! - `reports`: Spending reports and monthly totals
//! - `export`: CSV export
//! - `display`: Terminal tables and charts
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use expense_tracker::config::{ExpensePaths, Settings};
//! use expense_tracker::storage::Store;
//!
//! let paths = ExpensePaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let store = Store::open(paths.data_file())?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod providers;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{ExpenseError, ExpenseResult};
