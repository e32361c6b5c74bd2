//! Resource value objects returned by the Strata API
//!
//! Response schemas are treated as open and versioned: unknown fields are
//! ignored and optional fields decode as absent, since the service has
//! shipped several revisions that add trailing fields to some call paths
//! but not others.

pub mod acl;
pub mod bulk_import;
pub mod database;
pub mod job;
pub mod schedule;
pub mod table;
pub mod user;

pub use acl::AccessControl;
pub use bulk_import::{BulkImportSession, BulkImportStatus};
pub use database::Database;
pub use job::{Job, JobStatus, JobType};
pub use schedule::{Schedule, ScheduleHistoryEntry, ScheduledJob};
pub use table::Table;
pub use user::User;

pub mod de {
    //! Shared serde helpers for lenient response decoding.

    use serde::{Deserialize, Deserializer};

    /// Accept a string or a bare number for identifier fields.
    ///
    /// Older API revisions return job ids as JSON numbers, newer ones as
    /// strings.
    pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
            Float(f64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s,
            Raw::Int(n) => n.to_string(),
            Raw::Float(n) => n.to_string(),
        })
    }

    /// Same as [`string_or_number`] but tolerates a missing or null field.
    pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wrapper(#[serde(deserialize_with = "string_or_number")] String);

        Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| w.0))
    }
}

/// Parse a service timestamp (`"2026-08-25 12:34:56 UTC"`) into UTC time.
///
/// Returns `None` for absent or unparseable values; the service is the
/// source of truth and the client never fails a call over a bad timestamp.
pub fn parse_time(value: Option<&str>) -> Option<chrono::DateTime<chrono::Utc>> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    let naive =
        chrono::NaiveDateTime::parse_from_str(raw.get(..19)?, "%Y-%m-%d %H:%M:%S").ok()?;
    Some(chrono::DateTime::from_naive_utc_and_offset(naive, chrono::Utc))
}
