//! Strongly-typed ID wrappers for all entity types
//!
//! IDs are small integers handed out by the record store from per-kind
//! counters. The newtypes keep an expense id from being passed where a rule
//! id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ExpenseError;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal, $entity:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn value(&self) -> u64 {
                self.0
            }

            /// The id following this one
            pub const fn next(&self) -> Self {
                Self(self.0 + 1)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ExpenseError;

            /// Accepts both "12" and the display form "exp-12"
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                let digits = trimmed.strip_prefix($display_prefix).unwrap_or(trimmed);
                digits.parse::<u64>().map(Self).map_err(|_| {
                    ExpenseError::Validation(format!("Invalid {} id: '{}'", $entity, s))
                })
            }
        }
    };
}

define_id!(ExpenseId, "exp-", "expense");
define_id!(RuleId, "rule-", "recurring rule");
define_id!(BudgetId, "bud-", "budget");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(ExpenseId::new(7).to_string(), "exp-7");
        assert_eq!(RuleId::new(1).to_string(), "rule-1");
        assert_eq!(BudgetId::new(42).to_string(), "bud-42");
    }

    #[test]
    fn test_id_parse_with_and_without_prefix() {
        assert_eq!("12".parse::<ExpenseId>().unwrap(), ExpenseId::new(12));
        assert_eq!("exp-12".parse::<ExpenseId>().unwrap(), ExpenseId::new(12));
        assert_eq!(" rule-3 ".parse::<RuleId>().unwrap(), RuleId::new(3));
        assert!("rule-3".parse::<ExpenseId>().is_err());
        assert!("abc".parse::<BudgetId>().unwrap_err().is_validation());
    }

    #[test]
    fn test_id_ordering_and_next() {
        let id = ExpenseId::new(4);
        assert_eq!(id.next(), ExpenseId::new(5));
        assert!(id < id.next());
    }

    #[test]
    fn test_id_serialization() {
        let id = RuleId::new(9);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "9");
        let back: RuleId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
