//! Encoding of a [`CommitRequest`] into the import endpoint's multipart
//! fields and query string.
//!
//! The service reads the side-channel maps as JSON-valued form fields and
//! distinguishes "field absent" from "field present but empty" in its audit
//! log, so empty maps are never serialized at all.

use spendwise_core::{CommitRequest, StatementType};

/// Query parameters shared by the preview and commit calls.
pub fn import_query(month: &str, statement_type: StatementType, dry_run: bool) -> Vec<(&'static str, String)> {
    vec![
        ("dryRun", dry_run.to_string()),
        ("month", month.to_string()),
        ("statementType", statement_type.as_str().to_string()),
    ]
}

/// JSON side-channel fields for a commit, in a fixed order, each omitted
/// when its map is empty. `BTreeMap` keys serialize sorted, so identical
/// session state always encodes to identical bytes.
pub fn side_channel_fields(req: &CommitRequest) -> Vec<(&'static str, String)> {
    let mut fields = Vec::new();
    if let Some(m) = &req.category_overrides {
        fields.push(("overrides", to_json(m)));
    }
    if let Some(m) = &req.group_overrides {
        fields.push(("groupOverrides", to_json(m)));
    }
    if let Some(v) = &req.exclude_hashes {
        fields.push(("exclude", to_json(v)));
    }
    if let Some(m) = &req.description_overrides {
        fields.push(("descOverrides", to_json(m)));
    }
    fields
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    // Maps of strings/enums and string vectors cannot fail to serialize.
    serde_json::to_string(value).expect("side-channel value serializes")
}
