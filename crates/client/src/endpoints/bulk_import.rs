//! Bulk import endpoints
//!
//! The multi-step ingest workflow: create a session bound to a target
//! table, upload parts over the data-plane host, optionally freeze the
//! part set, perform (validate into a job), then commit. Error records
//! produced by the perform step come back as a compressed record stream.

use bytes::Bytes;
use serde::Deserialize;
use strata_domain::{
    validate_bulk_import_name, validate_database_name, validate_table_name, BulkImportSession,
    JobType, Result,
};

use crate::classify::{classify, ensure_success};
use crate::client::Client;
use crate::decode::RecordStream;
use crate::job::JobHandle;
use crate::transport::encode_segment;

#[derive(Deserialize)]
struct SessionListResponse {
    bulk_imports: Vec<BulkImportSession>,
}

#[derive(Deserialize)]
struct PartListResponse {
    parts: Vec<String>,
}

#[derive(Deserialize)]
struct PerformResponse {
    #[serde(deserialize_with = "strata_domain::types::de::string_or_number")]
    job_id: String,
}

impl Client {
    /// Create a bulk import session targeting `database.table`.
    pub async fn create_bulk_import(
        &self,
        name: &str,
        database: &str,
        table: &str,
    ) -> Result<()> {
        validate_bulk_import_name(name)?;
        validate_database_name(database)?;
        validate_table_name(table)?;
        let path = format!(
            "/v3/bulk_import/create/{}/{}/{}",
            encode_segment(name),
            encode_segment(database),
            encode_segment(table)
        );
        let resp = self.transport().post(&path, None).await?;
        ensure_success(&resp, &format!("Create bulk import {name:?} failed"))
    }

    /// Delete a session and its uploaded parts.
    pub async fn delete_bulk_import(&self, name: &str) -> Result<()> {
        let path = format!("/v3/bulk_import/delete/{}", encode_segment(name));
        let resp = self.transport().post(&path, None).await?;
        ensure_success(&resp, &format!("Delete bulk import {name:?} failed"))
    }

    /// Fetch the current state of one session.
    pub async fn show_bulk_import(&self, name: &str) -> Result<BulkImportSession> {
        let path = format!("/v3/bulk_import/show/{}", encode_segment(name));
        let resp = self.transport().get(&path, &[]).await?;
        ensure_success(&resp, &format!("Show bulk import {name:?} failed"))?;
        resp.json()
    }

    /// List every session visible to the caller.
    pub async fn list_bulk_imports(&self) -> Result<Vec<BulkImportSession>> {
        let resp = self.transport().get("/v3/bulk_import/list", &[]).await?;
        ensure_success(&resp, "List bulk imports failed")?;
        let body: SessionListResponse = resp.json()?;
        Ok(body.bulk_imports)
    }

    /// Upload one part of exactly `size` bytes under `part_name`.
    ///
    /// Goes over the data-plane host via PUT; never retried. Re-uploading
    /// an existing part name replaces it.
    pub async fn upload_part(
        &self,
        name: &str,
        part_name: &str,
        body: Bytes,
        size: u64,
    ) -> Result<()> {
        let path = format!(
            "/v3/bulk_import/upload_part/{}/{}",
            encode_segment(name),
            encode_segment(part_name)
        );
        let resp = self.transport().put(&path, body, size, None).await?;
        ensure_success(&resp, &format!("Upload part {part_name:?} of {name:?} failed"))
    }

    /// Delete one uploaded part.
    pub async fn delete_part(&self, name: &str, part_name: &str) -> Result<()> {
        let path = format!(
            "/v3/bulk_import/delete_part/{}/{}",
            encode_segment(name),
            encode_segment(part_name)
        );
        let resp = self.transport().post(&path, None).await?;
        ensure_success(&resp, &format!("Delete part {part_name:?} of {name:?} failed"))
    }

    /// List the names of the uploaded parts.
    pub async fn list_parts(&self, name: &str) -> Result<Vec<String>> {
        let path = format!("/v3/bulk_import/list_parts/{}", encode_segment(name));
        let resp = self.transport().get(&path, &[]).await?;
        ensure_success(&resp, &format!("List parts of {name:?} failed"))?;
        let body: PartListResponse = resp.json()?;
        Ok(body.parts)
    }

    /// Reject further uploads to the session.
    pub async fn freeze_bulk_import(&self, name: &str) -> Result<()> {
        let path = format!("/v3/bulk_import/freeze/{}", encode_segment(name));
        let resp = self.transport().post(&path, None).await?;
        ensure_success(&resp, &format!("Freeze bulk import {name:?} failed"))
    }

    /// Re-open a frozen session for uploads.
    pub async fn unfreeze_bulk_import(&self, name: &str) -> Result<()> {
        let path = format!("/v3/bulk_import/unfreeze/{}", encode_segment(name));
        let resp = self.transport().post(&path, None).await?;
        ensure_success(&resp, &format!("Unfreeze bulk import {name:?} failed"))
    }

    /// Validate the uploaded parts. Runs as a job; the returned handle
    /// polls it like any other.
    pub async fn perform_bulk_import(&self, name: &str) -> Result<JobHandle> {
        let path = format!("/v3/bulk_import/perform/{}", encode_segment(name));
        let resp = self.transport().post(&path, None).await?;
        ensure_success(&resp, &format!("Perform bulk import {name:?} failed"))?;
        let body: PerformResponse = resp.json()?;
        Ok(JobHandle::new(self.clone(), body.job_id, Some(JobType::BulkImport)))
    }

    /// Commit a performed session into the target table.
    pub async fn commit_bulk_import(&self, name: &str) -> Result<()> {
        let path = format!("/v3/bulk_import/commit/{}", encode_segment(name));
        let resp = self.transport().post(&path, None).await?;
        ensure_success(&resp, &format!("Commit bulk import {name:?} failed"))
    }

    /// Stream the records the perform step rejected through `on_record`.
    pub async fn each_error_record<F>(&self, name: &str, mut on_record: F) -> Result<()>
    where
        F: FnMut(rmpv::Value) -> Result<()>,
    {
        let path = format!("/v3/bulk_import/error_records/{}", encode_segment(name));

        let mut stream = self.transport().get_streaming(&path, &[]).await?;
        if !stream.is_success() {
            let resp = stream.into_error_response().await?;
            return Err(classify(&resp, &format!("Error records of {name:?} failed"), None));
        }

        let mut decoder = RecordStream::from_content_encoding(stream.content_encoding());
        while let Some(chunk) = stream.next_chunk().await? {
            for value in decoder.feed(&chunk)? {
                on_record(value)?;
            }
        }
        for value in decoder.finish()? {
            on_record(value)?;
        }
        Ok(())
    }

    /// Collect the rejected records of a performed session.
    pub async fn error_records(&self, name: &str) -> Result<Vec<rmpv::Value>> {
        let mut records = Vec::new();
        self.each_error_record(name, |value| {
            records.push(value);
            Ok(())
        })
        .await?;
        Ok(records)
    }
}
