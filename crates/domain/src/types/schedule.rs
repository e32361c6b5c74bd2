//! Scheduled query types

use serde::{Deserialize, Serialize};

use super::de;

/// A saved schedule as returned by `list_schedules`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub name: String,
    pub cron: Option<String>,
    pub query: Option<String>,
    pub database: Option<String>,
    /// Result output target URL, when configured.
    pub result: Option<String>,
    pub timezone: Option<String>,
    pub delay: Option<i64>,
    pub priority: Option<i64>,
    pub retry_limit: Option<i64>,
    #[serde(rename = "type")]
    pub query_type: Option<String>,
    pub next_time: Option<String>,
    pub organization: Option<String>,
}

/// A job spawned by `run_schedule`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledJob {
    #[serde(deserialize_with = "de::string_or_number")]
    pub job_id: String,
    #[serde(rename = "type")]
    pub job_type: Option<super::JobType>,
    pub scheduled_at: Option<String>,
}

/// One entry of a schedule's execution history.
///
/// Shares the open-schema treatment with [`super::Job`]: some revisions
/// append `duration`/`num_records`, others do not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleHistoryEntry {
    #[serde(deserialize_with = "de::string_or_number")]
    pub job_id: String,
    #[serde(rename = "type")]
    pub job_type: Option<super::JobType>,
    pub status: Option<super::JobStatus>,
    pub query: Option<String>,
    pub database: Option<String>,
    pub scheduled_at: Option<String>,
    pub start_at: Option<String>,
    pub end_at: Option<String>,
    pub result: Option<String>,
    pub priority: Option<i64>,
    pub duration: Option<i64>,
    pub num_records: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_entry_with_and_without_trailing_fields() {
        let old: ScheduleHistoryEntry = serde_json::from_str(
            r#"{"job_id": 10, "type": "presto", "status": "success"}"#,
        )
        .unwrap();
        assert_eq!(old.duration, None);

        let new: ScheduleHistoryEntry = serde_json::from_str(
            r#"{"job_id": "11", "type": "presto", "status": "success",
                "duration": 12, "num_records": 300}"#,
        )
        .unwrap();
        assert_eq!(new.duration, Some(12));
        assert_eq!(new.num_records, Some(300));
    }
}
