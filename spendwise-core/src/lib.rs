//! spendwise-core: statement import reconciliation engine.
//!
//! Takes the dry-run preview of an uploaded bank/credit-card statement,
//! tracks per-row user edits (category, budget group, description,
//! inclusion) keyed by the service-computed row hash, and assembles the
//! minimal commit request that inserts each eligible row exactly once.

pub mod catalog;
pub mod error;
pub mod request;
pub mod resolve;
pub mod session;
pub mod types;

pub use catalog::{Category, CategoryCatalog};
pub use error::{ImportError, Result};
pub use request::{CommitRequest, assemble};
pub use resolve::{
    ResolvedCategory, UNCATEGORIZED, default_group, effective_category, effective_group,
};
pub use session::{ReconciliationSession, RowView, SessionState, Ticket};
pub use types::{
    CandidateRow, CategoryGroup, CommitOutcome, PreviewBatch, StatementFile, StatementType,
};
