//! Recurrence engine
//!
//! Turns due recurring rules into expenses. Every missed period is
//! materialized, oldest first, and never for a date after `as_of`. Rule
//! advances and the new expenses are persisted together by a single save.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{ExpenseId, NewExpense, NewRecurringRule, RecurringRule, RuleId};
use crate::storage::Store;

/// One expense produced by a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Materialized {
    pub rule_id: RuleId,
    pub expense_id: ExpenseId,
    pub date: NaiveDate,
}

/// Active rules due at or before `as_of`, ordered by next-due date then id
pub fn due_rules(as_of: NaiveDate, rules: &[RecurringRule]) -> Vec<&RecurringRule> {
    let mut due: Vec<&RecurringRule> = rules.iter().filter(|r| r.is_due(as_of)).collect();
    due.sort_by_key(|r| (r.next_due, r.id));
    due
}

/// Produce the expense for the rule's pending occurrence and advance the rule.
///
/// Returns `None` when the rule is not due at `as_of`.
pub fn materialize(
    rule: &mut RecurringRule,
    as_of: NaiveDate,
) -> ExpenseResult<Option<NewExpense>> {
    if !rule.is_due(as_of) {
        return Ok(None);
    }
    let expense = rule.occurrence(rule.next_due);
    rule.advance()?;
    Ok(Some(expense))
}

/// Materialize every pending occurrence of every active rule up to `as_of`.
///
/// The store is saved once, after all occurrences are in memory, and only
/// when something was produced.
pub fn run_due(store: &mut Store, as_of: NaiveDate) -> ExpenseResult<Vec<Materialized>> {
    let mut produced = Vec::new();

    loop {
        let next = due_rules(as_of, store.rules()).first().map(|r| r.id);
        let Some(rule_id) = next else {
            break;
        };
        let rule = store.rule_mut(rule_id)?;
        let Some(new) = materialize(rule, as_of)? else {
            break;
        };
        let date = new.date;
        let expense_id = store.append(new)?;
        debug!(%rule_id, %expense_id, %date, "Materialized recurring expense");
        produced.push(Materialized {
            rule_id,
            expense_id,
            date,
        });
    }

    if !produced.is_empty() {
        store.save()?;
        info!(count = produced.len(), %as_of, "Recorded due recurring expenses");
    }
    Ok(produced)
}

/// Service for managing recurring rules
pub struct RecurrenceService<'a> {
    store: &'a mut Store,
}

impl<'a> RecurrenceService<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    pub fn add(&mut self, new: NewRecurringRule) -> ExpenseResult<RecurringRule> {
        let id = self.store.add_rule(new)?;
        self.store.save()?;
        self.get(id)
    }

    pub fn get(&self, id: RuleId) -> ExpenseResult<RecurringRule> {
        self.store
            .rule(id)
            .cloned()
            .ok_or_else(|| ExpenseError::rule_not_found(id.to_string()))
    }

    /// Rules ordered by id, optionally only the active ones
    pub fn list(&self, active_only: bool) -> Vec<&RecurringRule> {
        let mut rules: Vec<&RecurringRule> = self
            .store
            .rules()
            .iter()
            .filter(|r| !active_only || r.active)
            .collect();
        rules.sort_by_key(|r| r.id);
        rules
    }

    /// Resume a rule. Occurrences that fell due while it was inactive are
    /// skipped, so the next one is on or after `today`. Returns the rule and
    /// the number of skipped occurrences.
    pub fn activate(
        &mut self,
        id: RuleId,
        today: NaiveDate,
    ) -> ExpenseResult<(RecurringRule, usize)> {
        let rule = self.store.rule_mut(id)?;
        let skipped = if rule.active {
            0
        } else {
            rule.active = true;
            rule.skip_to(today)?
        };
        let rule = rule.clone();
        self.store.save()?;
        debug!(%id, skipped, next_due = %rule.next_due, "Activated recurring rule");
        Ok((rule, skipped))
    }

    pub fn deactivate(&mut self, id: RuleId) -> ExpenseResult<RecurringRule> {
        let rule = self.store.set_rule_active(id, false)?.clone();
        self.store.save()?;
        Ok(rule)
    }

    pub fn run_due(&mut self, as_of: NaiveDate) -> ExpenseResult<Vec<Materialized>> {
        run_due(self.store, as_of)
    }
}
