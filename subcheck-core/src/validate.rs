use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::requirements::RequirementsTable;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub required: Vec<String>,
    pub submitted: Vec<String>,
    pub missing: Vec<String>,
    pub complete: bool,
}

/// Lower-case, treat `_` as a space and collapse runs of whitespace.
fn canonical(s: &str) -> String {
    s.to_lowercase()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Filename with its final extension stripped, canonicalized.
pub fn normalize_filename(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    canonical(stem)
}

/// Labels carry no extension; only canonicalized.
pub fn normalize_label(label: &str) -> String {
    canonical(label)
}

pub fn validate(
    table: &RequirementsTable,
    domain: &str,
    submitted: &[String],
) -> Result<ValidationResult> {
    let required = table.lookup(domain)?;
    let present: HashSet<String> = submitted.iter().map(|f| normalize_filename(f)).collect();

    let missing: Vec<String> = required
        .iter()
        .filter(|label| !present.contains(&normalize_label(label)))
        .cloned()
        .collect();

    Ok(ValidationResult {
        required: required.to_vec(),
        submitted: submitted.to_vec(),
        complete: missing.is_empty(),
        missing,
    })
}
