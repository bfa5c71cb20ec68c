//! Read-only category catalog fetched from the catalog service.

use serde::{Deserialize, Serialize};

use crate::types::CategoryGroup;

/// A known category. `group` is meaningless when `is_income` is set; the
/// catalog service stores it as null for income categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub group: Option<CategoryGroup>,
    pub is_income: bool,
}

/// Catalog snapshot with case-insensitive name lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryCatalog {
    categories: Vec<Category>,
}

impl CategoryCatalog {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn find(&self, name: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Unknown names resolve non-income (fail open): an unrecognized
    /// category must not silently disable group editing.
    pub fn is_income(&self, name: &str) -> bool {
        self.find(name).map(|c| c.is_income).unwrap_or(false)
    }

    /// Catalog group for a name, if the category is known, non-income, and
    /// carries one.
    pub fn group_of(&self, name: &str) -> Option<CategoryGroup> {
        self.find(name).filter(|c| !c.is_income).and_then(|c| c.group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CategoryCatalog {
        CategoryCatalog::new(vec![
            Category {
                id: Some(1),
                name: "Income".into(),
                group: None,
                is_income: true,
            },
            Category {
                id: Some(2),
                name: "Groceries".into(),
                group: Some(CategoryGroup::Essential),
                is_income: false,
            },
            Category {
                id: Some(3),
                name: "Eating Out".into(),
                group: Some(CategoryGroup::Surplus),
                is_income: false,
            },
        ])
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let cat = catalog();
        assert!(cat.find("groceries").is_some());
        assert!(cat.find("GROCERIES").is_some());
        assert!(cat.is_income("income"));
    }

    #[test]
    fn unknown_name_fails_open() {
        let cat = catalog();
        assert!(!cat.is_income("Mystery"));
        assert_eq!(cat.group_of("Mystery"), None);
    }

    #[test]
    fn income_has_no_group() {
        let cat = catalog();
        assert_eq!(cat.group_of("Income"), None);
        assert_eq!(cat.group_of("Eating Out"), Some(CategoryGroup::Surplus));
    }
}
