//! Job types and lifecycle
//!
//! A job is a unit of asynchronous work (query, export, bulk import, ...)
//! identified by an opaque id and tracked through a status lifecycle. The
//! terminal set is {success, error, killed}; there are no transitions out
//! of a terminal state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::de;

/// Kind of asynchronous work a job performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Hive,
    Pig,
    Impala,
    Presto,
    Export,
    BulkImport,
    PartialDelete,
    Bulkload,
    ResultExport,
}

impl JobType {
    /// The path segment used when issuing a job of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hive => "hive",
            Self::Pig => "pig",
            Self::Impala => "impala",
            Self::Presto => "presto",
            Self::Export => "export",
            Self::BulkImport => "bulk_import",
            Self::PartialDelete => "partial_delete",
            Self::Bulkload => "bulkload",
            Self::ResultExport => "result_export",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hive" => Ok(Self::Hive),
            "pig" => Ok(Self::Pig),
            "impala" => Ok(Self::Impala),
            "presto" => Ok(Self::Presto),
            "export" => Ok(Self::Export),
            "bulk_import" => Ok(Self::BulkImport),
            "partial_delete" => Ok(Self::PartialDelete),
            "bulkload" => Ok(Self::Bulkload),
            "result_export" => Ok(Self::ResultExport),
            other => Err(format!("unknown job type: {other:?}")),
        }
    }
}

/// Job execution status as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Booting,
    Running,
    Success,
    Error,
    Killed,
}

impl JobStatus {
    /// Whether this status is terminal. The remote job record is immutable
    /// once terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error | Self::Killed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Booting => "booting",
            Self::Running => "running",
            Self::Success => "success",
            Self::Error => "error",
            Self::Killed => "killed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(Self::Queued),
            "booting" => Ok(Self::Booting),
            "running" => Ok(Self::Running),
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            "killed" => Ok(Self::Killed),
            other => Err(format!("unknown job status: {other:?}")),
        }
    }
}

/// A job record as returned by `list_jobs` / `show_job`.
///
/// Trailing fields (`duration`, `num_records`, `organization`) only appear
/// on some call paths and API revisions; they decode as `None` when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    #[serde(deserialize_with = "de::string_or_number")]
    pub job_id: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub status: Option<JobStatus>,
    pub query: Option<String>,
    pub url: Option<String>,
    pub database: Option<String>,
    pub created_at: Option<String>,
    pub start_at: Option<String>,
    pub end_at: Option<String>,
    pub cpu_time: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub result_size: Option<String>,
    pub priority: Option<i64>,
    pub retry_limit: Option<i64>,
    pub organization: Option<String>,
    pub hive_result_schema: Option<String>,
    pub debug: Option<serde_json::Value>,
    pub duration: Option<i64>,
    pub num_records: Option<i64>,
}

impl Job {
    /// Parsed result schema, when the service has produced one.
    ///
    /// The schema arrives as a JSON-encoded string of `[name, type]` pairs.
    pub fn result_schema(&self) -> Option<serde_json::Value> {
        self.hive_result_schema.as_deref().and_then(|raw| serde_json::from_str(raw).ok())
    }

    pub fn start_time(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        super::parse_time(self.start_at.as_deref())
    }

    pub fn end_time(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        super::parse_time(self.end_at.as_deref())
    }
}
