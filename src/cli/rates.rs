//! Exchange rate CLI commands

use chrono::{Duration, Utc};
use clap::Subcommand;

use super::{parse_amount, Context};
use crate::display::rates_table;
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::Currency;
use crate::services::{convert_amount, CurrencyConverter, RateOrigin};

/// Exchange rate subcommands
#[derive(Subcommand)]
pub enum RatesCommands {
    /// Show the cached exchange rates
    Show,

    /// Fetch fresh exchange rates
    Refresh,

    /// Convert an amount between currencies
    Convert {
        /// Amount to convert
        amount: String,
        /// Source currency code
        from: String,
        /// Target currency code
        to: String,
    },
}

/// Handle a rates command
pub fn handle_rates_command(ctx: &mut Context, cmd: RatesCommands) -> ExpenseResult<()> {
    let service = ctx.rate_service();

    match cmd {
        RatesCommands::Show => match service.cached() {
            Some(snapshot) => {
                let now = Utc::now();
                let ttl = Duration::hours(i64::from(ctx.settings.rates.ttl_hours));
                let age = snapshot.age(now);
                print!("{}", rates_table(&snapshot));
                println!(
                    "Age: {}h {}m{}",
                    age.num_hours(),
                    age.num_minutes() % 60,
                    if snapshot.is_fresh(now, ttl) { "" } else { " (stale)" }
                );
                let missing = snapshot.missing();
                if !missing.is_empty() {
                    let codes: Vec<&str> = missing.iter().map(Currency::code).collect();
                    println!("Missing: {}", codes.join(", "));
                }
            }
            None => println!("No exchange rates cached. Run 'extrack rates refresh'."),
        },

        RatesCommands::Refresh => {
            if ctx.offline {
                return Err(ExpenseError::RateFetch(
                    "cannot refresh rates in offline mode".into(),
                ));
            }
            let snapshot = service.refresh()?;
            println!("Exchange rates refreshed");
            print!("{}", rates_table(&snapshot));
        }

        RatesCommands::Convert { amount, from, to } => {
            let amount = parse_amount(&amount)?;
            let from = Currency::from_code(&from)?;
            let to = Currency::from_code(&to)?;

            let current = if from == to {
                None
            } else {
                service.current(Utc::now(), !ctx.offline)
            };
            if let Some((_, RateOrigin::StaleCache)) = &current {
                eprintln!("Warning: using stale exchange rates");
            }
            let converter = current.map(|(snapshot, _)| CurrencyConverter::new(snapshot));
            let converted = convert_amount(converter.as_ref(), amount, from, to)?;

            println!("{} = {}", from.format(amount), to.format(converted));
            if let Some(converter) = &converter {
                let rate = converter.cross_rate(from, to)?.round_dp(6).normalize();
                println!("Rate: 1 {} = {} {}", from, rate, to);
            }
        }
    }

    Ok(())
}
