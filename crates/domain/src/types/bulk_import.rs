//! Bulk import session types
//!
//! Bulk import is a multi-step upload-then-commit workflow for ingesting
//! large datasets outside the row-at-a-time path: create a session, upload
//! parts, perform (validate into a job), then commit into the target table.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::de;

/// Lifecycle phase of a bulk import session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkImportStatus {
    Uploading,
    Performing,
    Ready,
    Committing,
    Committed,
}

impl fmt::Display for BulkImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uploading => "uploading",
            Self::Performing => "performing",
            Self::Ready => "ready",
            Self::Committing => "committing",
            Self::Committed => "committed",
        };
        f.write_str(s)
    }
}

/// A bulk import session as returned by `show_bulk_import` and
/// `list_bulk_imports`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkImportSession {
    pub name: String,
    pub database: Option<String>,
    pub table: Option<String>,
    pub status: Option<BulkImportStatus>,
    pub upload_frozen: Option<bool>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub job_id: Option<String>,
    pub valid_records: Option<i64>,
    pub error_records: Option<i64>,
    pub valid_parts: Option<i64>,
    pub error_parts: Option<i64>,
}
