//! Tabular preview-listing parser.
//!
//! `okteto preview list` prints a whitespace-aligned table:
//!
//! ```text
//! Name          Scope      Sleeping
//! app-pr-7      personal   false
//! app-pr-12     personal   true
//! ```
//!
//! The first non-empty line is the header; its lowercased tokens name the
//! columns. Every following line is whitespace-split and zipped positionally
//! against those names. Rows without a name are skipped with a warning.

use std::collections::HashMap;

use envsweep_core::PreviewEnv;

use crate::error::OktetoError;

/// Sleeping-flag tokens treated as true, case-insensitive.
fn is_sleeping_token(token: &str) -> bool {
    matches!(token.to_ascii_lowercase().as_str(), "1" | "on" | "true")
}

/// Parse the listing output into environment records, in row order.
///
/// Requires a header naming at least a `name` column; `scope` and `sleeping`
/// columns are used when present.
pub fn parse_listing(output: &str) -> Result<Vec<PreviewEnv>, OktetoError> {
    let mut lines = output.lines().filter(|line| !line.trim().is_empty());

    let header = lines
        .next()
        .ok_or(OktetoError::MalformedListing { missing: "name" })?;
    let columns: Vec<String> = header
        .split_whitespace()
        .map(str::to_ascii_lowercase)
        .collect();
    if !columns.iter().any(|c| c == "name") {
        return Err(OktetoError::MalformedListing { missing: "name" });
    }

    let mut environments = Vec::new();
    for line in lines {
        let fields: HashMap<&str, &str> = columns
            .iter()
            .map(String::as_str)
            .zip(line.split_whitespace())
            .collect();
        let Some(name) = fields.get("name").filter(|n| !n.is_empty()) else {
            tracing::warn!(row = %line.trim(), "listing row without a name; ignoring");
            continue;
        };
        environments.push(PreviewEnv {
            name: (*name).to_string(),
            scope: fields.get("scope").unwrap_or(&"").to_string(),
            sleeping: fields
                .get("sleeping")
                .map(|token| is_sleeping_token(token))
                .unwrap_or(false),
        });
    }
    Ok(environments)
}
