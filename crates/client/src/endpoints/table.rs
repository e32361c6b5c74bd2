//! Table endpoints, including the direct row import path

use bytes::Bytes;
use serde::Deserialize;
use strata_domain::{validate_database_name, validate_table_name, ClientError, Result, Table};

use crate::classify::ensure_success;
use crate::client::Client;
use crate::decode::RecordDecoder;
use crate::transport::encode_segment;

#[derive(Deserialize)]
struct TableListResponse {
    tables: Vec<Table>,
}

#[derive(Deserialize)]
struct DeleteTableResponse {
    #[serde(rename = "type")]
    table_type: Option<String>,
}

#[derive(Deserialize)]
struct ImportResponse {
    elapsed_time: serde_json::Value,
}

impl Client {
    /// List the tables of one database.
    ///
    /// The listing omits the owning database from each record; it is
    /// filled in here so a [`Table`] is self-describing.
    pub async fn list_tables(&self, database: &str) -> Result<Vec<Table>> {
        let path = format!("/v3/table/list/{}", encode_segment(database));
        let resp = self.transport().get(&path, &[]).await?;
        ensure_success(&resp, &format!("List tables in {database:?} failed"))?;
        let body: TableListResponse = resp.json()?;
        let mut tables = body.tables;
        for table in &mut tables {
            table.database.get_or_insert_with(|| database.to_string());
        }
        Ok(tables)
    }

    /// Create a log table. Both names are validated client-side.
    pub async fn create_log_table(&self, database: &str, table: &str) -> Result<()> {
        validate_database_name(database)?;
        validate_table_name(table)?;
        let path = format!(
            "/v3/table/create/{}/{}/log",
            encode_segment(database),
            encode_segment(table)
        );
        let resp = self.transport().post(&path, None).await?;
        ensure_success(&resp, &format!("Create table {database}.{table} failed"))
    }

    /// Delete a table, returning its type when the service reports one.
    pub async fn delete_table(&self, database: &str, table: &str) -> Result<Option<String>> {
        let path =
            format!("/v3/table/delete/{}/{}", encode_segment(database), encode_segment(table));
        let resp = self.transport().post(&path, None).await?;
        ensure_success(&resp, &format!("Delete table {database}.{table} failed"))?;
        let body: DeleteTableResponse = resp.json()?;
        Ok(body.table_type)
    }

    /// Atomically swap the contents of two tables in the same database.
    pub async fn swap_table(&self, database: &str, table1: &str, table2: &str) -> Result<()> {
        let path = format!(
            "/v3/table/swap/{}/{}/{}",
            encode_segment(database),
            encode_segment(table1),
            encode_segment(table2)
        );
        let resp = self.transport().post(&path, None).await?;
        ensure_success(&resp, &format!("Swap tables {table1} and {table2} failed"))
    }

    /// Replace a table's column schema with a JSON array of
    /// `[name, type]` pairs.
    pub async fn update_schema(
        &self,
        database: &str,
        table: &str,
        schema: &serde_json::Value,
    ) -> Result<()> {
        let path = format!(
            "/v3/table/update-schema/{}/{}",
            encode_segment(database),
            encode_segment(table)
        );
        let params = [("schema", schema.to_string())];
        let resp = self.transport().post(&path, Some(&params)).await?;
        ensure_success(&resp, &format!("Update schema of {database}.{table} failed"))
    }

    /// Fetch the most recent rows of a table as decoded records.
    pub async fn tail(
        &self,
        database: &str,
        table: &str,
        count: u64,
    ) -> Result<Vec<rmpv::Value>> {
        let path = format!("/v3/table/tail/{}/{}", encode_segment(database), encode_segment(table));
        let params = [("count", count.to_string()), ("format", "msgpack".to_string())];
        let resp = self.transport().get(&path, &params).await?;
        ensure_success(&resp, &format!("Tail of {database}.{table} failed"))?;

        // Buffered GET already undid the transfer compression.
        let mut decoder = RecordDecoder::new();
        let mut records = Vec::new();
        decoder.feed(resp.body(), &mut records)?;
        decoder.finish();
        Ok(records)
    }

    /// Upload a pre-packed batch of rows directly into a table.
    ///
    /// `body` must be exactly `size` bytes in the named format (for
    /// example `msgpack.gz`). Goes over the data-plane host via PUT and is
    /// never retried. Returns the server-side ingest time in seconds.
    pub async fn import_data(
        &self,
        database: &str,
        table: &str,
        format: &str,
        body: Bytes,
        size: u64,
    ) -> Result<f64> {
        let path = format!(
            "/v3/table/import/{}/{}/{}",
            encode_segment(database),
            encode_segment(table),
            encode_segment(format)
        );
        let resp = self.transport().put(&path, body, size, None).await?;
        ensure_success(&resp, &format!("Import into {database}.{table} failed"))?;
        let body: ImportResponse = resp.json()?;
        parse_elapsed(&body.elapsed_time)
    }
}

/// The service reports `elapsed_time` as either a JSON number or a
/// numeric string, depending on revision.
fn parse_elapsed(value: &serde_json::Value) -> Result<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().ok_or_else(|| {
            ClientError::Decode(format!("elapsed_time out of range: {n}"))
        }),
        serde_json::Value::String(s) => s
            .parse::<f64>()
            .map_err(|e| ClientError::Decode(format!("invalid elapsed_time {s:?}: {e}"))),
        other => Err(ClientError::Decode(format!("unexpected elapsed_time: {other}"))),
    }
}
