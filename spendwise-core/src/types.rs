//! Wire-facing types shared between the reconciliation engine and the
//! import service client.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How parsed amounts were signed before they reached this engine.
///
/// For "debit" statements charges arrive negative as-is. For "credit"
/// statements the import service flips every sign exactly once, before
/// hashing, so charges reach us negative too. This engine never touches
/// signs; it only forwards the statement type so the commit pass re-parses
/// the file identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementType {
    Debit,
    Credit,
}

impl StatementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementType::Debit => "debit",
            StatementType::Credit => "credit",
        }
    }
}

impl std::str::FromStr for StatementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debit" => Ok(StatementType::Debit),
            "credit" => Ok(StatementType::Credit),
            other => Err(format!("unknown statement type: {other}")),
        }
    }
}

/// Budget classification for non-income categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryGroup {
    Essential,
    Surplus,
    Debt,
}

impl CategoryGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryGroup::Essential => "ESSENTIAL",
            CategoryGroup::Surplus => "SURPLUS",
            CategoryGroup::Debt => "DEBT",
        }
    }
}

impl std::str::FromStr for CategoryGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ESSENTIAL" => Ok(CategoryGroup::Essential),
            "SURPLUS" => Ok(CategoryGroup::Surplus),
            "DEBT" => Ok(CategoryGroup::Debt),
            other => Err(format!("unknown group: {other}")),
        }
    }
}

/// One candidate transaction from a dry-run parse of the uploaded statement.
///
/// `hash` is computed by the import service from the row's content plus its
/// position; this engine treats it as an opaque, stable key and forwards it
/// untouched through every override map and the commit request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRow {
    pub hash: String,
    pub date: NaiveDate,
    pub description: String,
    /// Sign already normalized per [`StatementType`]: negative = outflow.
    pub amount: f64,
    pub suggested_category: String,
    /// Group implied by the suggested category; absent for income or unknown.
    pub category_group: Option<CategoryGroup>,
    pub in_target_month: bool,
    #[serde(default)]
    pub would_import: bool,
}

/// Dry-run response from the import service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewBatch {
    pub rows: Vec<CandidateRow>,
    #[serde(default)]
    pub total_rows: usize,
    #[serde(default)]
    pub errors_sample: Vec<String>,
    #[serde(default)]
    pub errors_total: usize,
}

/// Result of a committing import pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitOutcome {
    pub inserted: u32,
    pub skipped: u32,
    #[serde(default)]
    pub errors_total: u32,
}

/// The uploaded statement: name plus raw bytes, passed through unchanged to
/// both the preview and the commit request so the service parses the exact
/// same content twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl StatementFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}
