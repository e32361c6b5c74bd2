//! Service health endpoint

use serde::Deserialize;
use strata_domain::Result;

use crate::client::Client;

#[derive(Deserialize)]
struct ServerStatusResponse {
    status: String,
}

impl Client {
    /// Current service status line.
    ///
    /// A non-2xx answer is itself a meaningful status here, so it maps to
    /// `"Server is down (<code>)"` rather than an error.
    pub async fn server_status(&self) -> Result<String> {
        let resp = self.transport().get("/v3/system/server_status", &[]).await?;
        if !resp.is_success() {
            return Ok(format!("Server is down ({})", resp.status()));
        }
        let body: ServerStatusResponse = resp.json()?;
        Ok(body.status)
    }
}
