//! Table resource types

use serde::{Deserialize, Serialize};

use super::de;

/// A table as returned by `list_tables`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    /// Owning database; absent in per-database listings.
    pub database: Option<String>,
    /// Table type reported by the service (`log` or `item`).
    #[serde(rename = "type")]
    pub table_type: Option<String>,
    pub count: Option<i64>,
    pub estimated_storage_size: Option<i64>,
    /// JSON-encoded `[name, type]` column pairs.
    pub schema: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub expire_days: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub last_import: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub last_log_timestamp: Option<String>,
}

impl Table {
    /// Parsed column schema, when present and well formed.
    pub fn parsed_schema(&self) -> Option<serde_json::Value> {
        self.schema.as_deref().and_then(|raw| serde_json::from_str(raw).ok())
    }
}
