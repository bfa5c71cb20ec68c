//! Commit request assembly: fold session edits down to the minimal payload
//! the import service needs to reproduce the user's final intent.

use std::collections::BTreeMap;

use crate::catalog::CategoryCatalog;
use crate::resolve::{default_group, effective_category, suggested_name};
use crate::session::SessionState;
use crate::types::{CandidateRow, CategoryGroup, StatementFile, StatementType};

/// Everything the commit endpoint needs. Each side-channel map is `None`
/// when empty rather than an empty map: the service distinguishes "no
/// overrides" from "explicit empty overrides" in its audit log, so empty
/// blobs are never sent.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitRequest {
    pub file: StatementFile,
    pub month: String,
    pub statement_type: StatementType,
    pub category_overrides: Option<BTreeMap<String, String>>,
    pub group_overrides: Option<BTreeMap<String, CategoryGroup>>,
    pub exclude_hashes: Option<Vec<String>>,
    pub description_overrides: Option<BTreeMap<String, String>>,
}

/// Assemble the minimal commit request from current session state.
///
/// Guarantees, each independent of edit order:
/// - every emitted key belongs to the current preview batch;
/// - no category override equal to the row's own suggestion;
/// - no group override on an income row, even a stale one, and none equal
///   to the row's resolved default group;
/// - description overrides are a fresh diff against the preview text, so
///   reverted edits disappear;
/// - the exclusion list follows preview row order and always names every
///   out-of-month row (structurally ineligible regardless of the user's
///   inclusion toggle) plus every row the user excluded.
pub fn assemble(
    state: &SessionState,
    rows: &[CandidateRow],
    catalog: &CategoryCatalog,
    file: &StatementFile,
    month: &str,
    statement_type: StatementType,
) -> CommitRequest {
    let mut category_overrides = BTreeMap::new();
    let mut group_overrides = BTreeMap::new();
    let mut exclude_hashes = Vec::new();
    let mut description_overrides = BTreeMap::new();

    for row in rows {
        if let Some(name) = state.category_overrides.get(&row.hash) {
            if !name.eq_ignore_ascii_case(suggested_name(row)) {
                category_overrides.insert(row.hash.clone(), name.clone());
            }
        }

        let resolved = effective_category(row, catalog, &state.category_overrides);
        if let Some(g) = state.group_overrides.get(&row.hash) {
            if !resolved.is_income && Some(*g) != default_group(row, &resolved, catalog) {
                group_overrides.insert(row.hash.clone(), *g);
            }
        }

        if !row.in_target_month || state.excluded(&row.hash) {
            exclude_hashes.push(row.hash.clone());
        }

        if let Some(text) = state.description_edits.get(&row.hash) {
            if text != &row.description {
                description_overrides.insert(row.hash.clone(), text.clone());
            }
        }
    }

    CommitRequest {
        file: file.clone(),
        month: month.to_string(),
        statement_type,
        category_overrides: non_empty_map(category_overrides),
        group_overrides: non_empty_map(group_overrides),
        exclude_hashes: non_empty_vec(exclude_hashes),
        description_overrides: non_empty_map(description_overrides),
    }
}

fn non_empty_map<V>(m: BTreeMap<String, V>) -> Option<BTreeMap<String, V>> {
    if m.is_empty() { None } else { Some(m) }
}

fn non_empty_vec(v: Vec<String>) -> Option<Vec<String>> {
    if v.is_empty() { None } else { Some(v) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;
    use chrono::NaiveDate;

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

    fn row(hash: &str, desc: &str, suggested: &str, in_month: bool) -> CandidateRow {
        CandidateRow {
            hash: hash.into(),
            date: NaiveDate::from_ymd_opt(2026, 8, 14).unwrap(),
            description: desc.into(),
            amount: -12.0,
            suggested_category: suggested.into(),
            category_group: None,
            in_target_month: in_month,
            would_import: in_month,
        }
    }

    fn file() -> StatementFile {
        StatementFile::new("aug.csv", b"Date,Description,Amount\n".to_vec())
    }

    fn assemble_with(state: &SessionState, rows: &[CandidateRow]) -> CommitRequest {
        assemble(state, rows, &catalog(), &file(), "2026-08", StatementType::Debit)
    }

    #[test]
    fn empty_state_sends_no_side_channels_for_in_month_rows() {
        let rows = vec![row("a", "WHOLE FOODS", "Groceries", true)];
        let state = SessionState::seeded(&rows);
        let req = assemble_with(&state, &rows);
        assert_eq!(req.category_overrides, None);
        assert_eq!(req.group_overrides, None);
        assert_eq!(req.exclude_hashes, None);
        assert_eq!(req.description_overrides, None);
    }

    #[test]
    fn override_equal_to_suggestion_is_not_sent() {
        let rows = vec![row("a", "WHOLE FOODS", "Groceries", true)];
        let mut state = SessionState::seeded(&rows);
        // Stale entry equal to the suggestion, inserted behind the session's
        // back; assembly must still drop it.
        state
            .category_overrides
            .insert("a".into(), "groceries".into());
        let req = assemble_with(&state, &rows);
        assert_eq!(req.category_overrides, None);
    }

    #[test]
    fn stale_income_group_override_is_force_excluded() {
        let rows = vec![row("a", "PAYROLL", "Income", true)];
        let mut state = SessionState::seeded(&rows);
        state.group_overrides.insert("a".into(), CategoryGroup::Debt);
        let req = assemble_with(&state, &rows);
        assert_eq!(req.group_overrides, None);
    }

    #[test]
    fn group_override_equal_to_resolved_default_is_dropped() {
        let rows = vec![row("a", "WHOLE FOODS", "Groceries", true)];
        let mut state = SessionState::seeded(&rows);
        state
            .group_overrides
            .insert("a".into(), CategoryGroup::Essential);
        let req = assemble_with(&state, &rows);
        assert_eq!(req.group_overrides, None);
    }

    #[test]
    fn keys_outside_preview_batch_are_filtered() {
        let rows = vec![row("a", "WHOLE FOODS", "Groceries", true)];
        let mut state = SessionState::seeded(&rows);
        state.category_overrides.insert("zzz".into(), "Dining".into());
        state.group_overrides.insert("zzz".into(), CategoryGroup::Debt);
        state.description_edits.insert("zzz".into(), "ghost".into());
        let req = assemble_with(&state, &rows);
        assert_eq!(req.category_overrides, None);
        assert_eq!(req.group_overrides, None);
        assert_eq!(req.description_overrides, None);
    }

    #[test]
    fn out_of_month_rows_always_land_in_exclude_list() {
        let rows = vec![
            row("a", "WHOLE FOODS", "Groceries", true),
            row("b", "OLD CHARGE", "Shopping", false),
        ];
        let mut state = SessionState::seeded(&rows);
        // User un-excludes the out-of-month row; it stays structurally
        // ineligible and its hash is still sent.
        state.set_excluded("b", false);
        let req = assemble_with(&state, &rows);
        assert_eq!(req.exclude_hashes, Some(vec!["b".to_string()]));
    }

    #[test]
    fn exclusion_list_follows_preview_order() {
        let rows = vec![
            row("z", "ONE", "Groceries", true),
            row("a", "TWO", "Groceries", true),
            row("m", "THREE", "Groceries", true),
        ];
        let mut state = SessionState::seeded(&rows);
        state.set_excluded("m", true);
        state.set_excluded("z", true);
        let req = assemble_with(&state, &rows);
        assert_eq!(
            req.exclude_hashes,
            Some(vec!["z".to_string(), "m".to_string()])
        );
    }

    #[test]
    fn description_diff_includes_empty_string_edits() {
        let rows = vec![row("a", "WHOLE FOODS", "Groceries", true)];
        let mut state = SessionState::seeded(&rows);
        state.description_edits.insert("a".into(), String::new());
        let req = assemble_with(&state, &rows);
        assert_eq!(
            req.description_overrides,
            Some(BTreeMap::from([("a".to_string(), String::new())]))
        );
    }

    #[test]
    fn reverted_description_disappears_from_diff() {
        let rows = vec![row("a", "WHOLE FOODS", "Groceries", true)];
        let mut state = SessionState::seeded(&rows);
        state.description_edits.insert("a".into(), "Weekly shop".into());
        state.description_edits.insert("a".into(), "WHOLE FOODS".into());
        let req = assemble_with(&state, &rows);
        assert_eq!(req.description_overrides, None);
    }

    #[test]
    fn assembling_twice_is_deterministic() {
        let rows = vec![
            row("a", "WHOLE FOODS", "Groceries", true),
            row("b", "OLD CHARGE", "Shopping", false),
        ];
        let mut state = SessionState::seeded(&rows);
        state.category_overrides.insert("a".into(), "Dining".into());
        state.description_edits.insert("a".into(), "Groceries run".into());
        let one = assemble_with(&state, &rows);
        let two = assemble_with(&state, &rows);
        assert_eq!(one, two);
    }
}
