//! Client-side resource name validation
//!
//! Database, table, and bulk import session names share one rule: lowercase
//! alphanumerics and underscores, 3 to 255 characters. Violations fail fast
//! with [`ClientError::InvalidParameter`] and are never sent over the wire.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{ClientError, Result};

const NAME_MIN_LEN: usize = 3;
const NAME_MAX_LEN: usize = 255;

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new("^[a-z0-9_]+$").expect("name pattern is a valid regex")
});

fn validate_name(kind: &str, name: &str) -> Result<()> {
    if name.len() < NAME_MIN_LEN || name.len() > NAME_MAX_LEN {
        return Err(ClientError::InvalidParameter(format!(
            "{} name must be between {} and {} characters, got {} ({:?})",
            kind,
            NAME_MIN_LEN,
            NAME_MAX_LEN,
            name.len(),
            name
        )));
    }
    if !NAME_PATTERN.is_match(name) {
        return Err(ClientError::InvalidParameter(format!(
            "{} name must consist only of lowercase letters, digits, and '_' ({:?})",
            kind, name
        )));
    }
    Ok(())
}

/// Validate a database name against the service naming rule.
pub fn validate_database_name(name: &str) -> Result<()> {
    validate_name("database", name)
}

/// Validate a table name against the service naming rule.
pub fn validate_table_name(name: &str) -> Result<()> {
    validate_name("table", name)
}

/// Validate a bulk import session name against the service naming rule.
pub fn validate_bulk_import_name(name: &str) -> Result<()> {
    validate_name("bulk import", name)
}
