//! Database endpoints

use serde::Deserialize;
use strata_domain::{validate_database_name, Database, Result};

use crate::classify::ensure_success;
use crate::client::Client;
use crate::transport::encode_segment;

#[derive(Deserialize)]
struct DatabaseListResponse {
    databases: Vec<Database>,
}

impl Client {
    /// List every database visible to the caller.
    pub async fn list_databases(&self) -> Result<Vec<Database>> {
        let resp = self.transport().get("/v3/database/list", &[]).await?;
        ensure_success(&resp, "List databases failed")?;
        let body: DatabaseListResponse = resp.json()?;
        Ok(body.databases)
    }

    /// Create a database. The name is validated client-side and an invalid
    /// one is rejected before any request is sent.
    pub async fn create_database(&self, name: &str) -> Result<()> {
        validate_database_name(name)?;
        let path = format!("/v3/database/create/{}", encode_segment(name));
        let resp = self.transport().post(&path, None).await?;
        ensure_success(&resp, &format!("Create database {name:?} failed"))
    }

    /// Delete a database and everything in it.
    pub async fn delete_database(&self, name: &str) -> Result<()> {
        let path = format!("/v3/database/delete/{}", encode_segment(name));
        let resp = self.transport().post(&path, None).await?;
        ensure_success(&resp, &format!("Delete database {name:?} failed"))
    }
}
