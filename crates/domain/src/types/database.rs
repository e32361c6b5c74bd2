//! Database resource types

use serde::{Deserialize, Serialize};

/// A database as returned by `list_databases`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub name: String,
    /// Total row count across tables, when the service reports it.
    pub count: Option<i64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub organization: Option<String>,
    /// Caller's permission on this database (`administrator`, `full_access`,
    /// `import_only`, `query_only`).
    pub permission: Option<String>,
}

impl Database {
    pub fn created_time(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        super::parse_time(self.created_at.as_deref())
    }

    pub fn updated_time(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        super::parse_time(self.updated_at.as_deref())
    }
}
