//! Budget CLI commands
//!
//! Implements CLI commands for monthly budgets: setting thresholds, checking
//! spending against them and recording spend directly against a scope.

use clap::Subcommand;

use super::{parse_amount, parse_currency, parse_month, parse_scope, Context};
use crate::display::{budget_table, format_alert, format_bar, format_budget_alert};
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Budget, BudgetId, NewBudget};
use crate::services::{BudgetStatus, BudgetTracker};

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set the budget for a category (or "overall") in a month
    Set {
        /// Category name or "overall"
        scope: String,
        /// Threshold amount
        amount: String,
        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
        /// Currency code (defaults to the configured currency)
        #[arg(long)]
        currency: Option<String>,
        /// Warning percentage (defaults to the configured percentage)
        #[arg(short, long)]
        warn: Option<u8>,
    },

    /// List active budgets with their spending
    List {
        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
        /// List active budgets of every month
        #[arg(short, long)]
        all: bool,
    },

    /// Show spending against a budget
    Status {
        /// Category name or "overall"; every budget of the month when omitted
        scope: Option<String>,
        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Record spending directly against a category (or "overall")
    Spend {
        /// Category name or "overall"
        scope: String,
        /// Amount spent
        amount: String,
        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
        /// Currency code (defaults to the configured currency)
        #[arg(long)]
        currency: Option<String>,
    },

    /// Deactivate a budget
    Remove {
        /// Budget ID (e.g., "2" or "bud-2")
        id: String,
    },
}

/// Handle a budget command
pub fn handle_budget_command(ctx: &mut Context, cmd: BudgetCommands) -> ExpenseResult<()> {
    match cmd {
        BudgetCommands::Set {
            scope,
            amount,
            month,
            currency,
            warn,
        } => {
            let scope = parse_scope(&scope)?;
            let threshold = parse_amount(&amount)?;
            let month = parse_month(month.as_deref(), ctx.today)?;
            let currency = parse_currency(currency.as_deref(), &ctx.settings)?;
            let warn = warn.unwrap_or(ctx.settings.warning_percent);

            let new = NewBudget::new(scope, month, threshold, currency).with_warning_percent(warn);
            let (budget, replaced) = BudgetTracker::new(&mut ctx.store, None).set_budget(new)?;

            println!(
                "Set {} budget for {}: {} (warning at {}%)",
                budget.scope,
                budget.month.label(),
                budget.currency.format(budget.threshold),
                budget.warning_percent
            );
            if let Some(old) = replaced {
                println!("Replaced previous budget {}", old);
            }
        }

        BudgetCommands::List { month, all } => {
            let month = parse_month(month.as_deref(), ctx.today)?;
            let mut budgets: Vec<Budget> = ctx
                .store
                .budgets()
                .iter()
                .filter(|b| b.active && (all || b.month == month))
                .cloned()
                .collect();
            budgets.sort_by_key(|b| (b.month, b.scope));

            let statuses = statuses_of(ctx, &budgets)?;
            print!("{}", budget_table(&statuses));
        }

        BudgetCommands::Status { scope, month } => {
            let month = parse_month(month.as_deref(), ctx.today)?;

            let Some(scope) = scope else {
                let budgets: Vec<Budget> = {
                    let mut active: Vec<&Budget> = ctx
                        .store
                        .budgets()
                        .iter()
                        .filter(|b| b.active && b.month == month)
                        .collect();
                    active.sort_by_key(|b| b.scope);
                    active.into_iter().cloned().collect()
                };
                let statuses = statuses_of(ctx, &budgets)?;
                print!("{}", budget_table(&statuses));
                for status in statuses.iter().filter(|s| s.is_alert()) {
                    println!("{}", format_budget_alert(status));
                }
                return Ok(());
            };

            let scope = parse_scope(&scope)?;
            let converter = ctx
                .store
                .active_budget(scope, month)
                .and_then(|b| ctx.budget_converter([b]));
            let tracker = BudgetTracker::new(&mut ctx.store, converter.as_ref());
            let Some(status) = tracker.status(scope, month)? else {
                println!("No active {} budget for {}", scope, month.label());
                return Ok(());
            };

            let currency = status.budget.currency;
            println!("{} budget for {}", scope, month.label());
            println!(
                "  [{}] {}%",
                format_bar(
                    status.spent.minor() as f64,
                    status.budget.threshold.minor() as f64,
                    30
                ),
                status.percent_used
            );
            println!("  Spent:     {}", currency.format(status.spent));
            println!("  Budget:    {}", currency.format(status.budget.threshold));
            println!("  Remaining: {}", currency.format(status.remaining));
            println!("  Status:    {}", format_alert(status.level));
        }

        BudgetCommands::Spend {
            scope,
            amount,
            month,
            currency,
        } => {
            let scope = parse_scope(&scope)?;
            let amount = parse_amount(&amount)?;
            let month = parse_month(month.as_deref(), ctx.today)?;
            let currency = parse_currency(currency.as_deref(), &ctx.settings)?;
            let today = ctx.today;

            let expense = BudgetTracker::new(&mut ctx.store, None)
                .record_spend(scope, month, amount, currency, today)?;
            println!(
                "Recorded {} against {} on {} ({})",
                expense.currency.format(expense.amount),
                scope,
                expense.date,
                expense.id
            );

            let converter = ctx
                .store
                .active_budget(scope, month)
                .and_then(|b| ctx.budget_converter([b]));
            let tracker = BudgetTracker::new(&mut ctx.store, converter.as_ref());
            match tracker.status(scope, month) {
                Ok(Some(status)) if status.is_alert() => {
                    println!("{}", format_budget_alert(&status));
                }
                Ok(_) => {}
                Err(e) if e.is_recoverable() => {
                    eprintln!("Warning: could not check budget: {}", e);
                }
                Err(e) => return Err(e),
            }
        }

        BudgetCommands::Remove { id } => {
            let id: BudgetId = id.parse()?;
            let budget = BudgetTracker::new(&mut ctx.store, None).remove_budget(id)?;
            println!(
                "Removed {} budget for {} ({})",
                budget.scope,
                budget.month.label(),
                budget.id
            );
        }
    }

    Ok(())
}

fn statuses_of(ctx: &mut Context, budgets: &[Budget]) -> ExpenseResult<Vec<BudgetStatus>> {
    let converter = ctx.budget_converter(budgets);
    let tracker = BudgetTracker::new(&mut ctx.store, converter.as_ref());
    budgets
        .iter()
        .map(|b| {
            tracker
                .status(b.scope, b.month)?
                .ok_or_else(|| ExpenseError::budget_not_found(b.id.to_string()))
        })
        .collect()
}
