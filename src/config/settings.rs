//! User settings for the expense tracker
//!
//! Manages the user profile, default currency, budget alert percentage and
//! exchange rate source configuration.

use serde::{Deserialize, Serialize};

use super::paths::ExpensePaths;
use crate::error::ExpenseError;
use crate::models::Currency;
use crate::storage::file_io::write_json_atomic;

/// Exchange rate source and cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSettings {
    /// Base URL of the rate API; the base currency code is appended
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Cached snapshots younger than this are reused without fetching
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u32,

    /// Currency the snapshot is fetched for
    #[serde(default)]
    pub base: Currency,
}

impl Default for RateSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            ttl_hours: default_ttl_hours(),
            base: Currency::default(),
        }
    }
}

/// User settings for the expense tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Display name used in reports
    #[serde(default)]
    pub user_name: Option<String>,

    /// Currency used when an expense or budget does not name one
    #[serde(default)]
    pub default_currency: Currency,

    /// Percentage of a budget at which a warning is raised
    #[serde(default = "default_warning_percent")]
    pub warning_percent: u8,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default)]
    pub rates: RateSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_warning_percent() -> u8 {
    80
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_api_url() -> String {
    "https://api.exchangerate-api.com/v4/latest".to_string()
}

fn default_ttl_hours() -> u32 {
    12
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            user_name: None,
            default_currency: Currency::default(),
            warning_percent: default_warning_percent(),
            date_format: default_date_format(),
            rates: RateSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &ExpensePaths) -> Result<Self, ExpenseError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| ExpenseError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| ExpenseError::Config(format!("Failed to parse settings file: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ExpensePaths) -> Result<(), ExpenseError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }

    /// Reject values the rest of the application cannot work with
    pub fn validate(&self) -> Result<(), ExpenseError> {
        if self.warning_percent == 0 || self.warning_percent > 100 {
            return Err(ExpenseError::Config(format!(
                "warning_percent must be between 1 and 100, got {}",
                self.warning_percent
            )));
        }
        if chrono::format::StrftimeItems::new(&self.date_format)
            .any(|item| matches!(item, chrono::format::Item::Error))
        {
            return Err(ExpenseError::Config(format!(
                "date_format '{}' is not a valid strftime format",
                self.date_format
            )));
        }
        if self.rates.api_url.trim().is_empty() {
            return Err(ExpenseError::Config("rates.api_url cannot be empty".into()));
        }
        Ok(())
    }

    /// Name shown in report headers
    pub fn display_name(&self) -> &str {
        self.user_name.as_deref().unwrap_or("you")
    }
}
