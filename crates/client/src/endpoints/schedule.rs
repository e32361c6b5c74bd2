//! Scheduled query endpoints

use serde::Deserialize;
use strata_domain::{Result, Schedule, ScheduleHistoryEntry, ScheduledJob};

use crate::classify::ensure_success;
use crate::client::Client;
use crate::transport::encode_segment;

#[derive(Deserialize)]
struct ScheduleListResponse {
    schedules: Vec<Schedule>,
}

#[derive(Deserialize)]
struct CreateScheduleResponse {
    /// First scheduled run time; absent for paused schedules.
    start: Option<String>,
}

#[derive(Deserialize)]
struct HistoryResponse {
    history: Vec<ScheduleHistoryEntry>,
}

#[derive(Deserialize)]
struct RunScheduleResponse {
    jobs: Vec<ScheduledJob>,
}

impl Client {
    /// Create a saved schedule.
    ///
    /// `params` carries the schedule definition as form fields (`cron`,
    /// `query`, `database`, `timezone`, `result`, ...). Returns the first
    /// scheduled run time when the schedule is active.
    pub async fn create_schedule(
        &self,
        name: &str,
        params: &[(&str, String)],
    ) -> Result<Option<String>> {
        let path = format!("/v3/schedule/create/{}", encode_segment(name));
        let resp = self.transport().post(&path, Some(params)).await?;
        ensure_success(&resp, &format!("Create schedule {name:?} failed"))?;
        let body: CreateScheduleResponse = resp.json()?;
        Ok(body.start)
    }

    /// Delete a schedule, returning its last saved definition.
    pub async fn delete_schedule(&self, name: &str) -> Result<Schedule> {
        let path = format!("/v3/schedule/delete/{}", encode_segment(name));
        let resp = self.transport().post(&path, None).await?;
        ensure_success(&resp, &format!("Delete schedule {name:?} failed"))?;
        resp.json()
    }

    /// List every saved schedule.
    pub async fn list_schedules(&self) -> Result<Vec<Schedule>> {
        let resp = self.transport().get("/v3/schedule/list", &[]).await?;
        ensure_success(&resp, "List schedules failed")?;
        let body: ScheduleListResponse = resp.json()?;
        Ok(body.schedules)
    }

    /// Update fields of an existing schedule.
    pub async fn update_schedule(&self, name: &str, params: &[(&str, String)]) -> Result<()> {
        let path = format!("/v3/schedule/update/{}", encode_segment(name));
        let resp = self.transport().post(&path, Some(params)).await?;
        ensure_success(&resp, &format!("Update schedule {name:?} failed"))
    }

    /// Past runs of a schedule, newest first, bounded by list positions.
    pub async fn schedule_history(
        &self,
        name: &str,
        from: Option<u64>,
        to: Option<u64>,
    ) -> Result<Vec<ScheduleHistoryEntry>> {
        let path = format!("/v3/schedule/history/{}", encode_segment(name));
        let mut params = Vec::new();
        if let Some(from) = from {
            params.push(("from", from.to_string()));
        }
        if let Some(to) = to {
            params.push(("to", to.to_string()));
        }
        let resp = self.transport().get(&path, &params).await?;
        ensure_success(&resp, &format!("History of schedule {name:?} failed"))?;
        let body: HistoryResponse = resp.json()?;
        Ok(body.history)
    }

    /// Run a schedule out of band as of `time` (unix seconds), spawning
    /// `num` jobs (defaults to one on the service side).
    pub async fn run_schedule(
        &self,
        name: &str,
        time: i64,
        num: Option<u32>,
    ) -> Result<Vec<ScheduledJob>> {
        let path = format!("/v3/schedule/run/{}/{}", encode_segment(name), time);
        let params = num.map(|n| vec![("num", n.to_string())]);
        let resp = self.transport().post(&path, params.as_deref()).await?;
        ensure_success(&resp, &format!("Run schedule {name:?} failed"))?;
        let body: RunScheduleResponse = resp.json()?;
        Ok(body.jobs)
    }
}
