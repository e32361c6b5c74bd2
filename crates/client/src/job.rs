//! Job polling handle
//!
//! [`JobHandle`] tracks one submitted job on the caller's side: id and
//! type are known at submit time, everything else is fetched on demand.
//! The remote job record is immutable once the status is terminal
//! ({success, error, killed}), so a handle that has seen a terminal
//! status answers field accessors from its cache and never goes back to
//! the network for them.

use std::time::{Duration, Instant};

use strata_domain::{ClientError, Job, JobStatus, JobType, Result};
use tracing::debug;

use crate::client::Client;

/// Caller-side handle to a submitted job.
pub struct JobHandle {
    client: Client,
    job_id: String,
    job_type: Option<JobType>,
    record: Option<Job>,
    last_status: Option<JobStatus>,
    result: Option<Vec<rmpv::Value>>,
}

impl JobHandle {
    pub(crate) fn new(client: Client, job_id: String, job_type: Option<JobType>) -> Self {
        Self { client, job_id, job_type, record: None, last_status: None, result: None }
    }

    pub(crate) fn from_record(client: Client, job: Job) -> Self {
        Self {
            client,
            job_id: job.job_id.clone(),
            job_type: Some(job.job_type),
            last_status: job.status,
            record: Some(job),
            result: None,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Job type, fetching the record once if it was not known at
    /// construction.
    pub async fn job_type(&mut self) -> Result<Option<JobType>> {
        if self.job_type.is_none() && !self.known_terminal() {
            self.refresh().await?;
        }
        Ok(self.job_type)
    }

    /// The last status this handle observed, without a network call.
    pub fn last_status(&self) -> Option<JobStatus> {
        self.last_status
    }

    /// Re-fetch the full job record.
    pub async fn refresh(&mut self) -> Result<&Job> {
        let job = self.client.show_job(&self.job_id).await?;
        self.job_type.get_or_insert(job.job_type);
        if let Some(status) = job.status {
            self.last_status = Some(status);
        }
        Ok(self.record.insert(job))
    }

    /// Current job status.
    ///
    /// Uses the lightweight status endpoint; once a terminal status has
    /// been observed it is returned from cache.
    pub async fn status(&mut self) -> Result<JobStatus> {
        if let Some(status) = self.last_status {
            if status.is_terminal() {
                return Ok(status);
            }
        }
        let status = self.client.job_status(&self.job_id).await?;
        self.last_status = Some(status);
        Ok(status)
    }

    /// Poll until the job reaches a terminal status.
    ///
    /// Each iteration sleeps `poll_interval`, then polls the status
    /// endpoint; with a `timeout`, elapsed time is measured fresh on every
    /// iteration and an exhausted budget raises [`ClientError::Timeout`].
    /// No timeout means waiting indefinitely. A handle that already knows
    /// a terminal status returns it without sleeping or polling.
    pub async fn wait(
        &mut self,
        timeout: Option<Duration>,
        poll_interval: Duration,
    ) -> Result<JobStatus> {
        self.wait_with(timeout, poll_interval, |_| {}).await
    }

    /// Like [`wait`](Self::wait), invoking `on_tick` with the status after
    /// each poll, the terminal one included.
    pub async fn wait_with<F>(
        &mut self,
        timeout: Option<Duration>,
        poll_interval: Duration,
        mut on_tick: F,
    ) -> Result<JobStatus>
    where
        F: FnMut(JobStatus),
    {
        if let Some(status) = self.last_status.filter(|s| s.is_terminal()) {
            return Ok(status);
        }

        let start = Instant::now();
        loop {
            if let Some(budget) = timeout {
                if start.elapsed() >= budget {
                    debug!(job_id = %self.job_id, ?budget, "gave up waiting for job");
                    return Err(ClientError::Timeout { timeout: budget, poll_interval });
                }
            }
            tokio::time::sleep(poll_interval).await;

            let status = self.status().await?;
            on_tick(status);
            if status.is_terminal() {
                return Ok(status);
            }
        }
    }

    /// The query text this job runs, if any.
    pub async fn query(&mut self) -> Result<Option<String>> {
        self.field(|job| job.query.clone()).await
    }

    /// Target database of the job.
    pub async fn database(&mut self) -> Result<Option<String>> {
        self.field(|job| job.database.clone()).await
    }

    /// Service console URL for the job.
    pub async fn url(&mut self) -> Result<Option<String>> {
        self.field(|job| job.url.clone()).await
    }

    /// Parsed result schema (`[name, type]` pairs), once produced.
    pub async fn result_schema(&mut self) -> Result<Option<serde_json::Value>> {
        self.field(|job| job.result_schema()).await
    }

    /// Wall-clock duration in seconds, on revisions that report it.
    pub async fn duration(&mut self) -> Result<Option<i64>> {
        self.field(|job| job.duration).await
    }

    /// Result row count, on revisions that report it.
    pub async fn num_records(&mut self) -> Result<Option<i64>> {
        self.field(|job| job.num_records).await
    }

    /// The result records of a finished job.
    ///
    /// Legal only once the job is terminal; calling earlier is an
    /// [`ClientError::InvalidParameter`]. The records are fetched at most
    /// once and cached on the handle.
    pub async fn result(&mut self) -> Result<&[rmpv::Value]> {
        let status = self.status().await?;
        if !status.is_terminal() {
            return Err(ClientError::InvalidParameter(format!(
                "job {} has not finished yet (status: {status})",
                self.job_id
            )));
        }
        if self.result.is_none() {
            let records = self.client.job_result(&self.job_id).await?;
            self.result = Some(records);
        }
        Ok(self.result.as_deref().unwrap_or(&[]))
    }

    /// Read a field from the cached record, refreshing at most once when
    /// the field is absent and the job is not known to be terminal. A
    /// field still absent after that is genuinely absent.
    async fn field<T>(&mut self, get: impl Fn(&Job) -> Option<T>) -> Result<Option<T>> {
        let cached = self.record.as_ref().and_then(|job| get(job));
        if cached.is_some() || self.known_terminal() {
            return Ok(cached);
        }
        self.refresh().await?;
        Ok(self.record.as_ref().and_then(|job| get(job)))
    }

    fn known_terminal(&self) -> bool {
        self.last_status.is_some_and(|s| s.is_terminal())
    }
}
