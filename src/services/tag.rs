//! Tag rule management

use crate::error::ExpenseResult;
use crate::models::{Category, TagRules};
use crate::storage::Store;

/// Service for the tag → category registry
pub struct TagService<'a> {
    store: &'a mut Store,
}

impl<'a> TagService<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    pub fn rules(&self) -> &TagRules {
        self.store.tag_rules()
    }

    /// Map a tag to a category; returns the category it replaced
    pub fn set(&mut self, name: &str, category: Category) -> ExpenseResult<Option<Category>> {
        let previous = self.store.set_tag(name, category)?;
        self.store.save()?;
        Ok(previous)
    }

    pub fn remove(&mut self, name: &str) -> ExpenseResult<Category> {
        let removed = self.store.remove_tag(name)?;
        self.store.save()?;
        Ok(removed)
    }
}
