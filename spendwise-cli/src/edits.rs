//! Parsing of per-row edit flags (`--set-category HASH=VALUE` and friends)
//! into session operations.

use anyhow::{Result, bail};
use spendwise_core::{CategoryCatalog, CategoryGroup, ReconciliationSession};

/// Split a `HASH=VALUE` flag. The value may contain `=`; only the first one
/// separates.
pub fn parse_pair(raw: &str) -> Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((hash, value)) if !hash.trim().is_empty() => Ok((hash.trim(), value)),
        _ => bail!("expected HASH=VALUE, got: {raw}"),
    }
}

/// The full set of row edits collected from the command line.
#[derive(Debug, Default)]
pub struct RowEdits {
    pub categories: Vec<String>,
    pub groups: Vec<String>,
    pub descriptions: Vec<String>,
    pub exclude: Vec<String>,
    pub include: Vec<String>,
}

impl RowEdits {
    /// Apply edits in dependency order: categories first, since they decide
    /// whether a later group edit is even applicable.
    pub fn apply(&self, session: &mut ReconciliationSession, catalog: &CategoryCatalog) -> Result<()> {
        for raw in &self.categories {
            let (hash, name) = parse_pair(raw)?;
            session.set_category(catalog, hash, name)?;
        }
        for raw in &self.groups {
            let (hash, value) = parse_pair(raw)?;
            let group: CategoryGroup = value
                .trim()
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            session.set_group(catalog, hash, group)?;
        }
        for raw in &self.descriptions {
            let (hash, text) = parse_pair(raw)?;
            session.edit_description(hash, text)?;
        }
        for hash in &self.exclude {
            session.set_included(hash.trim(), false)?;
        }
        for hash in &self.include {
            session.set_included(hash.trim(), true)?;
        }
        Ok(())
    }
}
