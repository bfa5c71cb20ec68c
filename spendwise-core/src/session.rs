//! Stateful reconciliation session: one uploaded statement, one preview,
//! per-row edits, one commit.
//!
//! All mutation is serial. The only suspension points are the preview and
//! commit requests; the session hands out a [`Ticket`] when one starts and
//! refuses to start another until it settles. Tickets carry the session
//! generation, so a response that arrives after a reset or a new file
//! selection is recognized as stale and discarded instead of applied.

use std::collections::BTreeMap;

use crate::catalog::CategoryCatalog;
use crate::error::{ImportError, Result};
use crate::request::{self, CommitRequest};
use crate::resolve::{
    ResolvedCategory, default_group, effective_category, effective_group, suggested_name,
};
use crate::types::{CandidateRow, CategoryGroup, PreviewBatch, StatementFile, StatementType};

/// The four per-hash edit maps. Owned by exactly one session, fully
/// discarded on reset or successful commit, never reused across files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// hash -> category name, only when it differs from the row's suggestion.
    pub category_overrides: BTreeMap<String, String>,
    /// hash -> explicit group pick, only when it differs from the default.
    pub group_overrides: BTreeMap<String, CategoryGroup>,
    /// hash -> current description text, seeded from the preview.
    pub description_edits: BTreeMap<String, String>,
    /// hash -> true means excluded from commit.
    pub exclusions: BTreeMap<String, bool>,
}

impl SessionState {
    /// Seed fresh state from a preview batch: descriptions start at their
    /// parsed text, out-of-month rows start excluded.
    pub fn seeded(rows: &[CandidateRow]) -> Self {
        let mut state = Self::default();
        for row in rows {
            state
                .description_edits
                .insert(row.hash.clone(), row.description.clone());
            if !row.in_target_month {
                state.exclusions.insert(row.hash.clone(), true);
            }
        }
        state
    }

    pub fn excluded(&self, hash: &str) -> bool {
        self.exclusions.get(hash).copied().unwrap_or(false)
    }

    pub fn set_excluded(&mut self, hash: &str, excluded: bool) {
        self.exclusions.insert(hash.to_string(), excluded);
    }

    fn clear(&mut self) {
        self.category_overrides.clear();
        self.group_overrides.clear();
        self.description_edits.clear();
        self.exclusions.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingOp {
    Preview,
    Commit,
}

/// Handle for one in-flight preview or commit. Redeeming it against a
/// session that has moved on yields [`ImportError::StaleResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    op: PendingOp,
}

/// Fully resolved view of one preview row, for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView<'a> {
    pub row: &'a CandidateRow,
    pub category: ResolvedCategory,
    /// `None` means not applicable (income).
    pub group: Option<CategoryGroup>,
    pub description: &'a str,
    pub included: bool,
    /// In-month and included: will actually be inserted on commit.
    pub eligible: bool,
}

#[derive(Debug, Default)]
pub struct ReconciliationSession {
    generation: u64,
    pending: Option<PendingOp>,
    file: Option<StatementFile>,
    month: Option<String>,
    statement_type: Option<StatementType>,
    rows: Vec<CandidateRow>,
    state: SessionState,
}

impl ReconciliationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a new statement file. Supersedes any prior preview: all edit
    /// state is dropped and in-flight responses become stale.
    pub fn select_file(&mut self, file: StatementFile) {
        self.invalidate();
        self.file = Some(file);
    }

    pub fn set_month(&mut self, month: impl Into<String>) {
        self.month = Some(month.into());
    }

    pub fn set_statement_type(&mut self, statement_type: StatementType) {
        self.statement_type = Some(statement_type);
    }

    pub fn file(&self) -> Option<&StatementFile> {
        self.file.as_ref()
    }

    pub fn rows(&self) -> &[CandidateRow] {
        &self.rows
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn has_preview(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Discard everything tied to the current file: preview, edits, file
    /// reference. Month and statement type are workspace-level inputs and
    /// survive. Late responses for the old generation are discarded.
    pub fn reset(&mut self) {
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.file = None;
        self.rows.clear();
        self.state.clear();
    }

    fn require_inputs(&self) -> Result<(&StatementFile, &str, StatementType)> {
        let file = self
            .file
            .as_ref()
            .ok_or_else(|| ImportError::Validation("select a statement file first".into()))?;
        let month = self
            .month
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| ImportError::Validation("select a target month first".into()))?;
        let statement_type = self
            .statement_type
            .ok_or_else(|| ImportError::Validation("select a statement type first".into()))?;
        Ok((file, month, statement_type))
    }

    fn row(&self, hash: &str) -> Result<&CandidateRow> {
        self.rows
            .iter()
            .find(|r| r.hash == hash)
            .ok_or_else(|| ImportError::UnknownRow(hash.to_string()))
    }

    // --- preview lifecycle ---

    /// Start a preview. Fails fast on missing inputs and refuses to overlap
    /// another in-flight preview/commit.
    pub fn begin_preview(&mut self) -> Result<Ticket> {
        self.require_inputs()?;
        if self.pending.is_some() {
            return Err(ImportError::Busy);
        }
        self.pending = Some(PendingOp::Preview);
        Ok(Ticket {
            generation: self.generation,
            op: PendingOp::Preview,
        })
    }

    /// Apply a preview response. A ticket from a superseded generation is
    /// rejected without touching state.
    pub fn apply_preview(&mut self, ticket: Ticket, batch: PreviewBatch) -> Result<()> {
        self.redeem(ticket, PendingOp::Preview)?;
        self.rows = batch.rows;
        self.state = SessionState::seeded(&self.rows);
        Ok(())
    }

    /// Settle a failed preview/commit: the slot frees up, edits survive so
    /// the user can retry.
    pub fn abandon(&mut self, ticket: Ticket) {
        if ticket.generation == self.generation {
            self.pending = None;
        }
    }

    fn redeem(&mut self, ticket: Ticket, expected: PendingOp) -> Result<()> {
        if ticket.generation != self.generation || self.pending != Some(expected) {
            return Err(ImportError::StaleResponse);
        }
        if ticket.op != expected {
            return Err(ImportError::StaleResponse);
        }
        self.pending = None;
        Ok(())
    }

    // --- per-row edits ---

    /// Pick a category for a row. Picking the row's own suggestion (or an
    /// empty name) removes the override instead of storing a redundant one.
    /// When the pick resolves to an income category, any group override on
    /// the row is dropped, since group no longer applies.
    pub fn set_category(&mut self, catalog: &CategoryCatalog, hash: &str, name: &str) -> Result<()> {
        let row = self.row(hash)?;
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case(suggested_name(row)) {
            self.state.category_overrides.remove(hash);
        } else {
            self.state
                .category_overrides
                .insert(hash.to_string(), name.to_string());
        }
        if catalog.is_income(name) {
            self.state.group_overrides.remove(hash);
        }
        Ok(())
    }

    /// Pick a budget group for a row. Rejected for income rows; a pick equal
    /// to the row's resolved default is stored as "no override".
    pub fn set_group(
        &mut self,
        catalog: &CategoryCatalog,
        hash: &str,
        group: CategoryGroup,
    ) -> Result<()> {
        let row = self.row(hash)?;
        let resolved = effective_category(row, catalog, &self.state.category_overrides);
        if resolved.is_income {
            return Err(ImportError::GroupNotApplicable(resolved.name));
        }
        if default_group(row, &resolved, catalog) == Some(group) {
            self.state.group_overrides.remove(hash);
        } else {
            self.state.group_overrides.insert(hash.to_string(), group);
        }
        Ok(())
    }

    /// Replace the row's working description. Reverting to the original text
    /// is fine; the commit diff is recomputed from scratch at assembly.
    pub fn edit_description(&mut self, hash: &str, text: &str) -> Result<()> {
        self.row(hash)?;
        self.state
            .description_edits
            .insert(hash.to_string(), text.to_string());
        Ok(())
    }

    /// Toggle inclusion. Accepted for any row, but out-of-month rows remain
    /// structurally ineligible: the toggle never changes `eligible_count`
    /// and their hashes are always sent in the exclusion list.
    pub fn set_included(&mut self, hash: &str, included: bool) -> Result<()> {
        self.row(hash)?;
        self.state.set_excluded(hash, !included);
        Ok(())
    }

    /// Rows that will actually be inserted on commit: in-month and not
    /// excluded. Out-of-month rows never count, whatever their toggle says.
    pub fn eligible_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.in_target_month && !self.state.excluded(&r.hash))
            .count()
    }

    /// Resolved view of every preview row, in preview order.
    pub fn resolved_rows<'a>(&'a self, catalog: &CategoryCatalog) -> Vec<RowView<'a>> {
        self.rows
            .iter()
            .map(|row| {
                let category = effective_category(row, catalog, &self.state.category_overrides);
                let group = effective_group(row, &category, catalog, &self.state.group_overrides);
                let included = !self.state.excluded(&row.hash);
                RowView {
                    description: self
                        .state
                        .description_edits
                        .get(&row.hash)
                        .map(String::as_str)
                        .unwrap_or(&row.description),
                    eligible: row.in_target_month && included,
                    row,
                    category,
                    group,
                    included,
                }
            })
            .collect()
    }

    // --- commit lifecycle ---

    /// Assemble the minimal commit request from current state and mark the
    /// session busy until the response settles.
    pub fn begin_commit(&mut self, catalog: &CategoryCatalog) -> Result<(Ticket, CommitRequest)> {
        let (file, month, statement_type) = self.require_inputs()?;
        if !self.has_preview() {
            return Err(ImportError::Validation("preview the statement first".into()));
        }
        if self.eligible_count() == 0 {
            return Err(ImportError::Validation("no eligible rows to commit".into()));
        }
        if self.pending.is_some() {
            return Err(ImportError::Busy);
        }
        let request = request::assemble(&self.state, &self.rows, catalog, file, month, statement_type);
        self.pending = Some(PendingOp::Commit);
        Ok((
            Ticket {
                generation: self.generation,
                op: PendingOp::Commit,
            },
            request,
        ))
    }

    /// A successful commit consumes the session: file, preview, and all
    /// four edit maps are cleared together.
    pub fn complete_commit(&mut self, ticket: Ticket) -> Result<()> {
        self.redeem(ticket, PendingOp::Commit)?;
        self.invalidate();
        Ok(())
    }
}
