//! Expense categories and budget scopes
//!
//! Categories are a closed set. A budget applies either to one category or
//! to all spending ("overall").

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ExpenseError;

/// Spending category
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Category {
    Food,
    Transportation,
    Housing,
    Entertainment,
    Utilities,
    Health,
    Education,
    Shopping,
    Investment,
    Travel,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::Food,
        Category::Transportation,
        Category::Housing,
        Category::Entertainment,
        Category::Utilities,
        Category::Health,
        Category::Education,
        Category::Shopping,
        Category::Investment,
        Category::Travel,
        Category::Other,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transportation => "Transportation",
            Self::Housing => "Housing",
            Self::Entertainment => "Entertainment",
            Self::Utilities => "Utilities",
            Self::Health => "Health",
            Self::Education => "Education",
            Self::Shopping => "Shopping",
            Self::Investment => "Investment",
            Self::Travel => "Travel",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Category {
    type Err = ExpenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                ExpenseError::Validation(format!(
                    "Unknown category '{}' (expected one of: {})",
                    wanted,
                    Self::ALL.map(|c| c.name()).join(", ")
                ))
            })
    }
}

/// What a budget covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetScope {
    /// Every expense in the month
    Overall,
    /// Only expenses in one category
    Category(Category),
}

impl BudgetScope {
    /// Whether an expense in `category` counts against this scope
    pub fn covers(&self, category: Category) -> bool {
        match self {
            Self::Overall => true,
            Self::Category(c) => *c == category,
        }
    }
}

impl fmt::Display for BudgetScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overall => write!(f, "Overall"),
            Self::Category(c) => write!(f, "{}", c),
        }
    }
}

impl FromStr for BudgetScope {
    type Err = ExpenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("overall") {
            Ok(Self::Overall)
        } else {
            s.parse::<Category>().map(Self::Category)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category_case_insensitive() {
        assert_eq!("food".parse::<Category>().unwrap(), Category::Food);
        assert_eq!("  TRAVEL ".parse::<Category>().unwrap(), Category::Travel);
    }

    #[test]
    fn test_unknown_category_is_validation_error() {
        let err = "Groceries".parse::<Category>().unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("Food"));
    }

    #[test]
    fn test_scope_parse_and_covers() {
        assert_eq!("overall".parse::<BudgetScope>().unwrap(), BudgetScope::Overall);
        let food = "Food".parse::<BudgetScope>().unwrap();
        assert_eq!(food, BudgetScope::Category(Category::Food));
        assert!(food.covers(Category::Food));
        assert!(!food.covers(Category::Travel));
        assert!(BudgetScope::Overall.covers(Category::Travel));
    }

    #[test]
    fn test_scope_serialization() {
        let json = serde_json::to_string(&BudgetScope::Overall).unwrap();
        assert_eq!(json, "\"overall\"");
        let json = serde_json::to_string(&BudgetScope::Category(Category::Health)).unwrap();
        assert_eq!(json, r#"{"category":"Health"}"#);
        let back: BudgetScope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, BudgetScope::Category(Category::Health));
    }
}
