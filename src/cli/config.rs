//! Configuration CLI commands

use clap::{Subcommand, ValueEnum};

use super::Context;
use crate::config::Settings;
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::Currency;

/// Settings that can be changed from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    /// Name shown in report headers
    #[value(name = "name")]
    Name,
    /// Default currency for new expenses, budgets and reports
    #[value(name = "currency")]
    Currency,
    /// Budget percentage at which a warning is raised
    #[value(name = "warning-percent")]
    WarningPercent,
    /// strftime format for dates in listings
    #[value(name = "date-format")]
    DateFormat,
    /// Base URL of the exchange rate API
    #[value(name = "rates.api-url")]
    RatesApiUrl,
    /// Hours a cached rate snapshot stays fresh
    #[value(name = "rates.ttl-hours")]
    RatesTtlHours,
}

impl ConfigKey {
    fn name(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Currency => "currency",
            Self::WarningPercent => "warning-percent",
            Self::DateFormat => "date-format",
            Self::RatesApiUrl => "rates.api-url",
            Self::RatesTtlHours => "rates.ttl-hours",
        }
    }
}

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration and paths
    Show,

    /// Change a setting
    Set {
        #[arg(value_enum)]
        key: ConfigKey,
        value: String,
    },
}

/// Handle a config command
pub fn handle_config_command(ctx: &mut Context, cmd: ConfigCommands) -> ExpenseResult<()> {
    match cmd {
        ConfigCommands::Show => {
            let settings = &ctx.settings;
            println!("Expense Tracker Configuration");
            println!("=============================");
            println!();
            println!("Paths:");
            println!("  Base directory:  {}", ctx.paths.base_dir().display());
            println!("  Settings file:   {}", ctx.paths.settings_file().display());
            println!("  Data file:       {}", ctx.paths.data_file().display());
            println!("  Rate cache:      {}", ctx.paths.rates_cache_file().display());
            println!();
            println!("Settings:");
            println!("  Name:            {}", settings.display_name());
            println!("  Currency:        {}", settings.default_currency);
            println!("  Warning percent: {}%", settings.warning_percent);
            println!("  Date format:     {}", settings.date_format);
            println!("  Rates API:       {}", settings.rates.api_url);
            println!("  Rates TTL:       {}h", settings.rates.ttl_hours);
            println!("  Rates base:      {}", settings.rates.base);
            println!();
            println!("Initialized:       {}", ctx.paths.is_initialized());
        }

        ConfigCommands::Set { key, value } => {
            let mut settings = ctx.settings.clone();
            apply_setting(&mut settings, key, &value)?;
            settings.validate().map_err(|e| match e {
                ExpenseError::Config(msg) => ExpenseError::Validation(msg),
                other => other,
            })?;
            settings.save(&ctx.paths)?;
            ctx.settings = settings;
            println!("Updated {} to '{}'", key.name(), value.trim());
        }
    }

    Ok(())
}

fn apply_setting(settings: &mut Settings, key: ConfigKey, value: &str) -> ExpenseResult<()> {
    let value = value.trim();
    let invalid_number = || {
        ExpenseError::Validation(format!("'{}' is not a valid number for {}", value, key.name()))
    };

    match key {
        ConfigKey::Name => {
            settings.user_name = (!value.is_empty()).then(|| value.to_string());
        }
        ConfigKey::Currency => {
            let currency = Currency::from_code(value)?;
            settings.default_currency = currency;
            settings.rates.base = currency;
        }
        ConfigKey::WarningPercent => {
            settings.warning_percent = value.parse().map_err(|_| invalid_number())?;
        }
        ConfigKey::DateFormat => settings.date_format = value.to_string(),
        ConfigKey::RatesApiUrl => settings.rates.api_url = value.to_string(),
        ConfigKey::RatesTtlHours => {
            settings.rates.ttl_hours = value.parse().map_err(|_| invalid_number())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_setting() {
        let mut settings = Settings::default();
        apply_setting(&mut settings, ConfigKey::Name, " Asha ").unwrap();
        apply_setting(&mut settings, ConfigKey::Currency, "usd").unwrap();
        apply_setting(&mut settings, ConfigKey::RatesTtlHours, "6").unwrap();

        assert_eq!(settings.display_name(), "Asha");
        assert_eq!(settings.default_currency, Currency::Usd);
        assert_eq!(settings.rates.base, Currency::Usd);
        assert_eq!(settings.rates.ttl_hours, 6);

        apply_setting(&mut settings, ConfigKey::Name, "").unwrap();
        assert_eq!(settings.display_name(), "you");
    }

    #[test]
    fn test_apply_setting_rejects_bad_values() {
        let mut settings = Settings::default();
        assert!(apply_setting(&mut settings, ConfigKey::WarningPercent, "lots").is_err());
        assert!(apply_setting(&mut settings, ConfigKey::Currency, "XYZ").is_err());

        apply_setting(&mut settings, ConfigKey::WarningPercent, "0").unwrap();
        assert!(settings.validate().is_err());
    }
}
