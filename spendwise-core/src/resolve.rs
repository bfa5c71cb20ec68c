//! Pure per-row resolution of effective category and budget group.
//!
//! Income exemption is enforced here, at read time, rather than by write
//! paths remembering to clear overrides: `effective_group` returns `None`
//! whenever the resolved category is income, no matter what the override
//! map holds.

use std::collections::BTreeMap;

use crate::catalog::CategoryCatalog;
use crate::types::{CandidateRow, CategoryGroup};

/// Sentinel used when a row carries no usable suggestion.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Outcome of category resolution for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCategory {
    pub name: String,
    pub is_income: bool,
}

/// Effective category for a row: override wins, else the row's suggestion,
/// else "Uncategorized". Income status comes from a case-insensitive catalog
/// lookup; names missing from the catalog resolve non-income.
pub fn effective_category(
    row: &CandidateRow,
    catalog: &CategoryCatalog,
    overrides: &BTreeMap<String, String>,
) -> ResolvedCategory {
    let name = overrides
        .get(&row.hash)
        .map(String::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| suggested_name(row));
    ResolvedCategory {
        name: name.to_string(),
        is_income: catalog.is_income(name),
    }
}

/// The row's own suggestion, with the empty string treated as absent.
pub fn suggested_name(row: &CandidateRow) -> &str {
    let s = row.suggested_category.trim();
    if s.is_empty() { UNCATEGORIZED } else { &row.suggested_category }
}

/// Effective budget group for a row. `None` means not applicable (income).
///
/// Precedence for non-income rows: explicit override, catalog group of the
/// resolved category, the row's own group hint, then SURPLUS.
pub fn effective_group(
    row: &CandidateRow,
    category: &ResolvedCategory,
    catalog: &CategoryCatalog,
    overrides: &BTreeMap<String, CategoryGroup>,
) -> Option<CategoryGroup> {
    if category.is_income {
        return None;
    }
    if let Some(g) = overrides.get(&row.hash) {
        return Some(*g);
    }
    default_group(row, category, catalog)
}

/// The group a non-income row resolves to with no override in play. Used to
/// keep the override map minimal: an override equal to this value is noise.
/// Returns `None` only for income categories.
pub fn default_group(
    row: &CandidateRow,
    category: &ResolvedCategory,
    catalog: &CategoryCatalog,
) -> Option<CategoryGroup> {
    if category.is_income {
        return None;
    }
    Some(
        catalog
            .group_of(&category.name)
            .or(row.category_group)
            .unwrap_or(CategoryGroup::Surplus),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;

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
                name: "Dining".into(),
                group: Some(CategoryGroup::Surplus),
                is_income: false,
            },
        ])
    }

    fn row(hash: &str, suggested: &str, hint: Option<CategoryGroup>) -> CandidateRow {
        CandidateRow {
            hash: hash.into(),
            date: chrono::NaiveDate::from_ymd_opt(2026, 8, 14).unwrap(),
            description: "TEST ROW".into(),
            amount: -10.0,
            suggested_category: suggested.into(),
            category_group: hint,
            in_target_month: true,
            would_import: true,
        }
    }

    #[test]
    fn no_override_returns_suggestion() {
        let r = row("a", "Groceries", None);
        let c = effective_category(&r, &catalog(), &BTreeMap::new());
        assert_eq!(c.name, "Groceries");
        assert!(!c.is_income);
    }

    #[test]
    fn empty_suggestion_falls_back_to_uncategorized() {
        let r = row("a", "  ", None);
        let c = effective_category(&r, &catalog(), &BTreeMap::new());
        assert_eq!(c.name, UNCATEGORIZED);
        assert!(!c.is_income);
    }

    #[test]
    fn override_wins_over_suggestion() {
        let r = row("a", "Groceries", None);
        let mut ov = BTreeMap::new();
        ov.insert("a".to_string(), "Dining".to_string());
        let c = effective_category(&r, &catalog(), &ov);
        assert_eq!(c.name, "Dining");
    }

    #[test]
    fn income_lookup_is_case_insensitive() {
        let r = row("a", "income", None);
        let c = effective_category(&r, &catalog(), &BTreeMap::new());
        assert!(c.is_income);
    }

    #[test]
    fn unknown_category_is_group_applicable() {
        let r = row("a", "Llama Rides", None);
        let c = effective_category(&r, &catalog(), &BTreeMap::new());
        assert!(!c.is_income);
        let g = effective_group(&r, &c, &catalog(), &BTreeMap::new());
        assert_eq!(g, Some(CategoryGroup::Surplus));
    }

    #[test]
    fn income_group_not_applicable_even_with_override() {
        let r = row("a", "Income", None);
        let c = effective_category(&r, &catalog(), &BTreeMap::new());
        let mut ov = BTreeMap::new();
        ov.insert("a".to_string(), CategoryGroup::Debt);
        assert_eq!(effective_group(&r, &c, &catalog(), &ov), None);
    }

    #[test]
    fn group_precedence_override_catalog_hint_surplus() {
        let cat = catalog();

        // Override beats everything.
        let r = row("a", "Groceries", Some(CategoryGroup::Debt));
        let c = effective_category(&r, &cat, &BTreeMap::new());
        let mut ov = BTreeMap::new();
        ov.insert("a".to_string(), CategoryGroup::Debt);
        assert_eq!(effective_group(&r, &c, &cat, &ov), Some(CategoryGroup::Debt));

        // Catalog group beats the row hint.
        assert_eq!(
            effective_group(&r, &c, &cat, &BTreeMap::new()),
            Some(CategoryGroup::Essential)
        );

        // Row hint when the catalog has nothing.
        let r = row("b", "Mystery", Some(CategoryGroup::Debt));
        let c = effective_category(&r, &cat, &BTreeMap::new());
        assert_eq!(
            effective_group(&r, &c, &cat, &BTreeMap::new()),
            Some(CategoryGroup::Debt)
        );

        // SURPLUS as the final fallback.
        let r = row("c", "Mystery", None);
        let c = effective_category(&r, &cat, &BTreeMap::new());
        assert_eq!(
            effective_group(&r, &c, &cat, &BTreeMap::new()),
            Some(CategoryGroup::Surplus)
        );
    }
}
