//! Job endpoints
//!
//! Submitting, listing, inspecting, and killing jobs, plus the result
//! record stream. The stateful polling wrapper lives in [`crate::job`].

use serde::Deserialize;
use strata_domain::{Job, JobStatus, JobType, Result};

use crate::classify::{classify, ensure_success};
use crate::client::Client;
use crate::decode::RecordStream;
use crate::job::JobHandle;
use crate::transport::encode_segment;

#[derive(Deserialize)]
struct JobListResponse {
    jobs: Vec<Job>,
}

#[derive(Deserialize)]
struct JobStatusResponse {
    status: JobStatus,
}

#[derive(Deserialize)]
struct IssueJobResponse {
    #[serde(deserialize_with = "strata_domain::types::de::string_or_number")]
    job_id: String,
}

#[derive(Deserialize)]
struct KillJobResponse {
    former_status: Option<JobStatus>,
}

impl Client {
    /// List jobs, newest first. `from`/`to` bound the listing by position,
    /// `status` filters to one lifecycle state.
    pub async fn list_jobs(
        &self,
        from: Option<u64>,
        to: Option<u64>,
        status: Option<JobStatus>,
    ) -> Result<Vec<Job>> {
        let mut params = Vec::new();
        if let Some(from) = from {
            params.push(("from", from.to_string()));
        }
        if let Some(to) = to {
            params.push(("to", to.to_string()));
        }
        if let Some(status) = status {
            params.push(("status", status.as_str().to_string()));
        }

        let resp = self.transport().get("/v3/job/list", &params).await?;
        ensure_success(&resp, "List jobs failed")?;
        let body: JobListResponse = resp.json()?;
        Ok(body.jobs)
    }

    /// Fetch the full record of one job.
    pub async fn show_job(&self, job_id: &str) -> Result<Job> {
        let path = format!("/v3/job/show/{}", encode_segment(job_id));
        let resp = self.transport().get(&path, &[]).await?;
        ensure_success(&resp, &format!("Show job {job_id} failed"))?;
        resp.json()
    }

    /// Fetch only the current status of a job. Cheaper than
    /// [`show_job`](Self::show_job) on the service side; this is the call
    /// the polling loop uses.
    pub async fn job_status(&self, job_id: &str) -> Result<JobStatus> {
        let path = format!("/v3/job/status/{}", encode_segment(job_id));
        let resp = self.transport().get(&path, &[]).await?;
        ensure_success(&resp, &format!("Status of job {job_id} failed"))?;
        let body: JobStatusResponse = resp.json()?;
        Ok(body.status)
    }

    /// Submit a query job and return a handle for polling it.
    ///
    /// `params` carries optional submit-time settings (`priority`,
    /// `retry_limit`, `result`, ...) passed through as form fields.
    pub async fn issue_job(
        &self,
        job_type: JobType,
        database: &str,
        query: &str,
        params: &[(&str, String)],
    ) -> Result<JobHandle> {
        let path =
            format!("/v3/job/issue/{}/{}", job_type.as_str(), encode_segment(database));
        let mut form = vec![("query", query.to_string())];
        form.extend(params.iter().map(|(k, v)| (*k, v.clone())));

        let resp = self.transport().post(&path, Some(&form)).await?;
        ensure_success(&resp, &format!("Issue {job_type} job on {database:?} failed"))?;
        let body: IssueJobResponse = resp.json()?;
        Ok(JobHandle::new(self.clone(), body.job_id, Some(job_type)))
    }

    /// Re-export the result of a finished job to a new destination,
    /// returning a handle for the `result_export` job that performs it.
    ///
    /// `params` names the destination (`result`, `result_connection`, ...)
    /// passed through as form fields.
    pub async fn result_export(
        &self,
        job_id: &str,
        params: &[(&str, String)],
    ) -> Result<JobHandle> {
        let path = format!("/v3/job/result_export/{}", encode_segment(job_id));
        let form: Vec<(&str, String)> = params.to_vec();

        let resp = self.transport().post(&path, Some(&form)).await?;
        ensure_success(&resp, &format!("Result export of job {job_id} failed"))?;
        let body: IssueJobResponse = resp.json()?;
        Ok(JobHandle::new(self.clone(), body.job_id, Some(JobType::ResultExport)))
    }

    /// Request cancellation of a job, returning its status before the
    /// kill when the service reports one. Kills are asynchronous; the job
    /// reaches `killed` some time after this returns.
    pub async fn kill(&self, job_id: &str) -> Result<Option<JobStatus>> {
        let path = format!("/v3/job/kill/{}", encode_segment(job_id));
        let resp = self.transport().post(&path, None).await?;
        ensure_success(&resp, &format!("Kill job {job_id} failed"))?;
        let body: KillJobResponse = resp.json()?;
        Ok(body.former_status)
    }

    /// Attach a polling handle to an already-submitted job without any
    /// network call.
    pub fn job(&self, job_id: impl Into<String>) -> JobHandle {
        JobHandle::new(self.clone(), job_id.into(), None)
    }

    /// Attach a polling handle to a job record already in hand, for
    /// example one returned by [`list_jobs`](Self::list_jobs). A record
    /// carrying a terminal status answers entirely from its fields.
    pub fn job_from_record(&self, job: Job) -> JobHandle {
        JobHandle::from_record(self.clone(), job)
    }

    /// Fetch the complete result of a finished job as decoded records.
    pub async fn job_result(&self, job_id: &str) -> Result<Vec<rmpv::Value>> {
        let mut records = Vec::new();
        self.each_job_result(job_id, |value, _| {
            records.push(value);
            Ok(())
        })
        .await?;
        Ok(records)
    }

    /// Stream the result of a finished job through `on_record`.
    ///
    /// The callback receives each decoded record together with the
    /// cumulative count of raw (compressed) bytes received, usable as a
    /// progress measure against a known result size. Returns the total
    /// raw byte count.
    pub async fn each_job_result<F>(&self, job_id: &str, mut on_record: F) -> Result<u64>
    where
        F: FnMut(rmpv::Value, u64) -> Result<()>,
    {
        let path = format!("/v3/job/result/{}", encode_segment(job_id));
        let params = [("format", "msgpack".to_string())];

        let mut stream = self.transport().get_streaming(&path, &params).await?;
        if !stream.is_success() {
            let resp = stream.into_error_response().await?;
            return Err(classify(&resp, &format!("Result of job {job_id} failed"), None));
        }

        let mut decoder = RecordStream::from_content_encoding(stream.content_encoding());
        while let Some(chunk) = stream.next_chunk().await? {
            let received = stream.received();
            for value in decoder.feed(&chunk)? {
                on_record(value, received)?;
            }
        }
        let received = stream.received();
        for value in decoder.finish()? {
            on_record(value, received)?;
        }
        Ok(received)
    }
}
