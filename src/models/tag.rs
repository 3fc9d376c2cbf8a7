//! Tag rules used to infer a category when none is given

use std::collections::{BTreeMap, BTreeSet};

use super::category::Category;

/// Tag name → category registry
pub type TagRules = BTreeMap<String, Category>;

/// Tag rules every new store starts with
pub fn default_tag_rules() -> TagRules {
    [
        ("groceries", Category::Food),
        ("dining", Category::Food),
        ("fuel", Category::Transportation),
        ("rent", Category::Housing),
        ("movie", Category::Entertainment),
        ("electricity", Category::Utilities),
        ("doctor", Category::Health),
        ("books", Category::Education),
        ("shopping", Category::Shopping),
        ("mutual fund", Category::Investment),
        ("flight", Category::Travel),
    ]
    .into_iter()
    .map(|(name, category)| (name.to_string(), category))
    .collect()
}

/// Pick a category for an expense that was entered without one.
///
/// Tags are a sorted set, so the alphabetically first tag with a rule wins.
/// Failing that, the alphabetically first rule whose name appears in the
/// note; failing that, `Other`.
pub fn infer_category(rules: &TagRules, tags: &BTreeSet<String>, note: &str) -> Category {
    if let Some(category) = tags.iter().find_map(|tag| rules.get(tag)) {
        return *category;
    }

    let note = note.to_lowercase();
    rules
        .iter()
        .find(|(name, _)| note.contains(name.as_str()))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Other)
}
