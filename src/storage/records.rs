//! On-disk layout of the record store

use serde::{Deserialize, Serialize};

use crate::error::ExpenseError;
use crate::models::{
    default_tag_rules, Budget, BudgetId, Expense, ExpenseId, RecurringRule, RuleId, TagRules,
};

/// Current schema version of `expenses.json`
pub const SCHEMA_VERSION: u32 = 1;

/// Everything persisted in the data file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    pub schema_version: u32,

    /// Next id to hand out; never decremented, so deleted ids are not reused
    pub next_expense_id: ExpenseId,
    pub next_rule_id: RuleId,
    pub next_budget_id: BudgetId,

    #[serde(default)]
    pub expenses: Vec<Expense>,

    #[serde(default)]
    pub recurring_rules: Vec<RecurringRule>,

    #[serde(default)]
    pub budgets: Vec<Budget>,

    #[serde(default = "default_tag_rules")]
    pub tags: TagRules,
}

impl Default for RecordSet {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            next_expense_id: ExpenseId::new(1),
            next_rule_id: RuleId::new(1),
            next_budget_id: BudgetId::new(1),
            expenses: Vec::new(),
            recurring_rules: Vec::new(),
            budgets: Vec::new(),
            tags: default_tag_rules(),
        }
    }
}

impl RecordSet {
    /// Check the invariants JSON parsing alone cannot: unique ids, counters
    /// ahead of every stored id, and one active budget per (scope, month).
    pub fn check_integrity(&self) -> Result<(), String> {
        if self.schema_version > SCHEMA_VERSION {
            return Err(format!(
                "schema version {} is newer than supported version {}",
                self.schema_version, SCHEMA_VERSION
            ));
        }

        check_ids(
            "expense",
            self.expenses.iter().map(|e| e.id.value()),
            self.next_expense_id.value(),
        )?;
        check_ids(
            "recurring rule",
            self.recurring_rules.iter().map(|r| r.id.value()),
            self.next_rule_id.value(),
        )?;
        check_ids(
            "budget",
            self.budgets.iter().map(|b| b.id.value()),
            self.next_budget_id.value(),
        )?;

        let mut active = std::collections::HashSet::new();
        for budget in self.budgets.iter().filter(|b| b.active) {
            if !active.insert((budget.scope, budget.month)) {
                return Err(format!(
                    "more than one active budget for {} in {}",
                    budget.scope, budget.month
                ));
            }
        }

        Ok(())
    }

    /// Same as [`check_integrity`](Self::check_integrity) but as a store error
    pub(crate) fn verify(&self, path: &std::path::Path) -> Result<(), ExpenseError> {
        self.check_integrity()
            .map_err(|reason| ExpenseError::CorruptData {
                path: path.to_path_buf(),
                reason,
            })
    }
}

fn check_ids(kind: &str, ids: impl Iterator<Item = u64>, next: u64) -> Result<(), String> {
    let mut seen = std::collections::HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(format!("duplicate {} id {}", kind, id));
        }
        if id >= next {
            return Err(format!(
                "{} id {} is not below the next id counter {}",
                kind, id, next
            ));
        }
    }
    Ok(())
}
