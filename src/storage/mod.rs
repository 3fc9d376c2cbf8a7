//! Storage layer for the expense tracker
//!
//! One JSON document holds every expense, recurring rule, budget and tag
//! rule. [`Store`] owns the in-memory copy and is the only writer of the
//! file; every save replaces the file atomically.

pub mod file_io;
pub mod rate_cache;
pub mod records;

pub use file_io::{read_json, read_json_optional, write_json_atomic};
pub use rate_cache::RateCache;
pub use records::{RecordSet, SCHEMA_VERSION};

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{
    Budget, BudgetId, BudgetScope, Category, Expense, ExpenseId, ExpenseUpdate, NewBudget,
    NewExpense, NewRecurringRule, RecurringRule, RuleId, YearMonth,
};

/// The record store backed by a single JSON file
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    records: RecordSet,
}

impl Store {
    /// Open the store at `path`, loading existing records.
    ///
    /// A missing file yields an empty store. A file that is not a valid
    /// record set fails with [`ExpenseError::CorruptData`].
    pub fn open(path: impl Into<PathBuf>) -> ExpenseResult<Self> {
        let mut store = Self::empty(path);
        store.load()?;
        Ok(store)
    }

    /// Open the store, moving a corrupt file aside and starting empty.
    ///
    /// Returns the path the corrupt file was moved to, if any.
    pub fn open_or_reset(path: impl Into<PathBuf>) -> ExpenseResult<(Self, Option<PathBuf>)> {
        let path = path.into();
        match Self::open(path.clone()) {
            Ok(store) => Ok((store, None)),
            Err(ExpenseError::CorruptData { reason, .. }) => {
                let backup = corrupt_backup_path(&path);
                warn!(path = %path.display(), %reason, "Resetting corrupt data file");
                std::fs::rename(&path, &backup).map_err(|e| {
                    ExpenseError::Storage(format!(
                        "Failed to move corrupt file to {}: {}",
                        backup.display(),
                        e
                    ))
                })?;
                let store = Self::empty(path);
                store.save()?;
                Ok((store, Some(backup)))
            }
            Err(e) => Err(e),
        }
    }

    /// An empty store that will write to `path`; nothing is read
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: RecordSet::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory records with the file contents
    pub fn load(&mut self) -> ExpenseResult<()> {
        let records: RecordSet = read_json(&self.path)?;
        records.verify(&self.path)?;
        debug!(
            path = %self.path.display(),
            expenses = records.expenses.len(),
            rules = records.recurring_rules.len(),
            budgets = records.budgets.len(),
            "Loaded record store"
        );
        self.records = records;
        Ok(())
    }

    /// Persist every record, atomically
    pub fn save(&self) -> ExpenseResult<()> {
        write_json_atomic(&self.path, &self.records)?;
        debug!(path = %self.path.display(), "Saved record store");
        Ok(())
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    // === Expenses ===

    /// Add an expense and return its id
    pub fn append(&mut self, new: NewExpense) -> ExpenseResult<ExpenseId> {
        let id = self.records.next_expense_id;
        let expense = Expense::from_new(id, new);
        expense.validate()?;

        self.records.next_expense_id = id.next();
        self.records.expenses.push(expense);
        Ok(id)
    }

    /// Apply a partial edit to an expense
    pub fn update(&mut self, id: ExpenseId, update: &ExpenseUpdate) -> ExpenseResult<&Expense> {
        let expense = self
            .records
            .expenses
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| ExpenseError::expense_not_found(id.to_string()))?;

        let mut edited = expense.clone();
        edited.apply(update);
        edited.validate()?;
        *expense = edited;
        Ok(expense)
    }

    /// Remove an expense; its id is never handed out again
    pub fn delete(&mut self, id: ExpenseId) -> ExpenseResult<Expense> {
        let index = self
            .records
            .expenses
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| ExpenseError::expense_not_found(id.to_string()))?;
        Ok(self.records.expenses.remove(index))
    }

    pub fn expense(&self, id: ExpenseId) -> Option<&Expense> {
        self.records.expenses.iter().find(|e| e.id == id)
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.records.expenses
    }

    // === Recurring rules ===

    pub fn add_rule(&mut self, new: NewRecurringRule) -> ExpenseResult<RuleId> {
        let id = self.records.next_rule_id;
        let rule = RecurringRule::from_new(id, new);
        rule.validate()?;

        self.records.next_rule_id = id.next();
        self.records.recurring_rules.push(rule);
        Ok(id)
    }

    pub fn rule(&self, id: RuleId) -> Option<&RecurringRule> {
        self.records.recurring_rules.iter().find(|r| r.id == id)
    }

    pub fn rule_mut(&mut self, id: RuleId) -> ExpenseResult<&mut RecurringRule> {
        self.records
            .recurring_rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ExpenseError::rule_not_found(id.to_string()))
    }

    pub fn rules(&self) -> &[RecurringRule] {
        &self.records.recurring_rules
    }

    pub fn set_rule_active(&mut self, id: RuleId, active: bool) -> ExpenseResult<&RecurringRule> {
        let rule = self.rule_mut(id)?;
        rule.active = active;
        Ok(rule)
    }

    // === Budgets ===

    /// Add a budget, deactivating any active budget for the same scope and
    /// month. Returns the new id and the id of the replaced budget.
    pub fn set_budget(&mut self, new: NewBudget) -> ExpenseResult<(BudgetId, Option<BudgetId>)> {
        let id = self.records.next_budget_id;
        let budget = Budget::from_new(id, new);
        budget.validate()?;

        let replaced = self
            .records
            .budgets
            .iter_mut()
            .find(|b| b.applies_to(budget.scope, budget.month))
            .map(|b| {
                b.active = false;
                b.id
            });

        self.records.next_budget_id = id.next();
        self.records.budgets.push(budget);
        Ok((id, replaced))
    }

    /// Deactivate a budget
    pub fn remove_budget(&mut self, id: BudgetId) -> ExpenseResult<&Budget> {
        let budget = self
            .records
            .budgets
            .iter_mut()
            .find(|b| b.id == id && b.active)
            .ok_or_else(|| ExpenseError::budget_not_found(id.to_string()))?;
        budget.active = false;
        Ok(budget)
    }

    /// The active budget for a scope and month
    pub fn active_budget(&self, scope: BudgetScope, month: YearMonth) -> Option<&Budget> {
        self.records
            .budgets
            .iter()
            .find(|b| b.applies_to(scope, month))
    }

    pub fn budgets(&self) -> &[Budget] {
        &self.records.budgets
    }

    // === Tag rules ===

    pub fn tag_rules(&self) -> &crate::models::TagRules {
        &self.records.tags
    }

    /// Map a tag to a category, replacing any existing mapping
    pub fn set_tag(&mut self, name: &str, category: Category) -> ExpenseResult<Option<Category>> {
        let name = crate::models::expense::normalize_tag(name);
        if name.is_empty() {
            return Err(ExpenseError::Validation("Tag name cannot be empty".into()));
        }
        Ok(self.records.tags.insert(name, category))
    }

    pub fn remove_tag(&mut self, name: &str) -> ExpenseResult<Category> {
        let name = crate::models::expense::normalize_tag(name);
        self.records
            .tags
            .remove(&name)
            .ok_or_else(|| ExpenseError::tag_not_found(name))
    }
}

fn corrupt_backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".corrupt");
    path.with_file_name(name)
}
